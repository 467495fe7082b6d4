//! Product catalog endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{ClientRepo, Product, ProductRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidUuid;
use crate::http::server::AppState;
use crate::models::{Paginated, Pagination, PaginationParams, ValidationError};

/// Product response
#[derive(Serialize)]
pub struct ProductResponse {
    pub product_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            product_id: p.product_id,
            client_id: p.client_id,
            name: p.name,
            description: p.description,
            price: p.price,
            image_url: p.image_url,
            metadata: p.metadata,
            created_at: p.created_at,
        }
    }
}

/// Create product request
#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// POST /products
async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }
    if !req.price.is_finite() || req.price < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "price",
            reason: "price must be a non-negative number",
        }
        .into());
    }

    let client = ClientRepo::new(&state.pool).ensure(&state.tenant).await?;
    let product = ProductRepo::new(&state.pool)
        .create(
            client.client_id,
            name,
            req.description.as_deref(),
            req.price,
            req.image_url.as_deref(),
            req.metadata.as_ref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /products - the tenant's catalog, newest first
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<ProductResponse>>, ApiError> {
    let client = ClientRepo::new(&state.pool).ensure(&state.tenant).await?;
    let page = Pagination::from(params);
    let products = ProductRepo::new(&state.pool)
        .list_for_client(client.client_id, page)
        .await?;

    Ok(Json(products.map(ProductResponse::from)))
}

/// GET /products/{id}
async fn get_product(
    State(state): State<Arc<AppState>>,
    ValidUuid(product_id): ValidUuid,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = ProductRepo::new(&state.pool).get(product_id).await?;
    Ok(Json(product.into()))
}

/// Product routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route("/products/{id}", get(get_product))
}
