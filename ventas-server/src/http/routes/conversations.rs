//! Conversation and message endpoints

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

use crate::db::repos::{ClientRepo, Conversation, ConversationRepo, Message, MessageRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidUuid;
use crate::http::server::AppState;
use crate::models::{
    ConversationStatus, MessageDirection, MessageSender, Paginated, Pagination, PaginationParams,
};

/// Conversation response
#[derive(Serialize)]
pub struct ConversationResponse {
    pub conversation_id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub status: ConversationStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            conversation_id: c.conversation_id,
            client_id: c.client_id,
            user_id: c.user_id,
            status: c.status,
            started_at: c.started_at,
            ended_at: c.ended_at,
        }
    }
}

/// Message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    pub sender: MessageSender,
    pub direction: MessageDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            message_id: m.message_id,
            conversation_id: m.conversation_id,
            sender: m.sender,
            direction: m.direction,
            content: m.content,
            content_type: m.content_type,
            timestamp: m.timestamp,
        }
    }
}

/// Create conversation request
#[derive(Deserialize)]
pub struct CreateConversationRequest {
    pub user_id: Uuid,
}

/// POST /conversations
async fn create_conversation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>), ApiError> {
    let client = ClientRepo::new(&state.pool).ensure(&state.tenant).await?;
    let conversation = ConversationRepo::new(&state.pool)
        .create(client.client_id, req.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(conversation.into())))
}

/// Status transition request
#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// PATCH /conversations/{id}/status
async fn set_conversation_status(
    State(state): State<Arc<AppState>>,
    ValidUuid(conversation_id): ValidUuid,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let status = ConversationStatus::parse(&req.status)?;
    let conversation = ConversationRepo::new(&state.pool)
        .set_status(conversation_id, status)
        .await?;

    Ok(Json(conversation.into()))
}

/// Append message request
#[derive(Deserialize)]
pub struct AppendMessageRequest {
    pub sender: String,
    pub direction: String,
    pub content: Option<String>,
    pub content_type: Option<String>,
}

/// POST /conversations/{id}/messages
async fn append_message(
    State(state): State<Arc<AppState>>,
    ValidUuid(conversation_id): ValidUuid,
    Json(req): Json<AppendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let sender = MessageSender::parse(&req.sender)?;
    let direction = MessageDirection::parse(&req.direction)?;

    let message = MessageRepo::new(&state.pool)
        .append(
            conversation_id,
            sender,
            direction,
            req.content,
            req.content_type,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

/// GET /conversations/{id}/messages - oldest first, paginated
async fn list_messages(
    State(state): State<Arc<AppState>>,
    ValidUuid(conversation_id): ValidUuid,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<MessageResponse>>, ApiError> {
    // A listing for an unknown conversation should 404, not return an
    // empty page.
    ConversationRepo::new(&state.pool).get(conversation_id).await?;

    let page = Pagination::from(params);
    let messages = MessageRepo::new(&state.pool)
        .list_for_conversation(conversation_id, page)
        .await?;

    Ok(Json(messages.map(MessageResponse::from)))
}

/// Conversation routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/conversations", post(create_conversation))
        .route("/conversations/{id}/status", patch(set_conversation_status))
        .route(
            "/conversations/{id}/messages",
            post(append_message).get(list_messages),
        )
}
