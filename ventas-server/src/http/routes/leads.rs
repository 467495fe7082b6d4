//! Lead endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{ClientRepo, Lead, LeadRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidUuid;
use crate::http::server::AppState;
use crate::models::{LeadStatus, Paginated, Pagination, PaginationParams};

/// Lead response
#[derive(Serialize)]
pub struct LeadResponse {
    pub lead_id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Lead> for LeadResponse {
    fn from(l: Lead) -> Self {
        Self {
            lead_id: l.lead_id,
            client_id: l.client_id,
            user_id: l.user_id,
            conversation_id: l.conversation_id,
            status: l.status,
            created_at: l.created_at,
        }
    }
}

/// Create lead request
#[derive(Deserialize)]
pub struct CreateLeadRequest {
    pub user_id: Uuid,
    pub conversation_id: Option<Uuid>,
}

/// POST /leads
async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), ApiError> {
    let client = ClientRepo::new(&state.pool).ensure(&state.tenant).await?;
    let lead = LeadRepo::new(&state.pool)
        .create(client.client_id, req.user_id, req.conversation_id)
        .await?;

    Ok((StatusCode::CREATED, Json(lead.into())))
}

/// Status transition request
#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// PATCH /leads/{id}/status
async fn set_lead_status(
    State(state): State<Arc<AppState>>,
    ValidUuid(lead_id): ValidUuid,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<LeadResponse>, ApiError> {
    let status = LeadStatus::parse(&req.status)?;
    let lead = LeadRepo::new(&state.pool).set_status(lead_id, status).await?;

    Ok(Json(lead.into()))
}

/// GET /leads - the tenant's leads, newest first
async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<LeadResponse>>, ApiError> {
    let client = ClientRepo::new(&state.pool).ensure(&state.tenant).await?;
    let page = Pagination::from(params);
    let leads = LeadRepo::new(&state.pool)
        .list_for_client(client.client_id, page)
        .await?;

    Ok(Json(leads.map(LeadResponse::from)))
}

/// Lead routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/leads", post(create_lead).get(list_leads))
        .route("/leads/{id}/status", patch(set_lead_status))
}
