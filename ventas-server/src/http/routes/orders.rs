//! Order endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{ClientRepo, Order, OrderRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidUuid;
use crate::http::server::AppState;
use crate::models::{OrderStatus, ValidationError};

/// Order response
#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub status: OrderStatus,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            order_id: o.order_id,
            client_id: o.client_id,
            user_id: o.user_id,
            product_id: o.product_id,
            quantity: o.quantity,
            status: o.status,
            total: o.total,
            created_at: o.created_at,
        }
    }
}

/// Place order request
#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
}

/// POST /orders
async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    if req.quantity < 1 {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            reason: "quantity must be at least 1",
        }
        .into());
    }

    let client = ClientRepo::new(&state.pool).ensure(&state.tenant).await?;
    let order = OrderRepo::new(&state.pool)
        .place(client.client_id, req.user_id, req.product_id, req.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// Status transition request
#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// PATCH /orders/{id}/status
async fn set_order_status(
    State(state): State<Arc<AppState>>,
    ValidUuid(order_id): ValidUuid,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let status = OrderStatus::parse(&req.status)?;
    let order = OrderRepo::new(&state.pool)
        .set_status(order_id, status)
        .await?;

    Ok(Json(order.into()))
}

/// Order routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(place_order))
        .route("/orders/{id}/status", patch(set_order_status))
}
