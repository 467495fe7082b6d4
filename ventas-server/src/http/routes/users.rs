//! User lookup and registration endpoints
//!
//! Both are tenant-implicit: the business client is fixed by deployment
//! configuration, never taken from the request.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{ClientRepo, ClientUser, UserRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{PhoneNumber, ValidationError};

/// Guidance returned when a phone has no user yet; the assistant reads
/// this and asks the customer for a name.
const REGISTER_PROMPT: &str =
    "No user is registered with this phone yet. Ask for their name to register them.";

/// Lookup response
///
/// Absence is a normal result: `exists: false` with guidance, HTTP 200.
#[derive(Serialize)]
pub struct UserLookupResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl UserLookupResponse {
    fn found(user: ClientUser) -> Self {
        Self {
            exists: true,
            user_id: Some(user.user_id),
            client_id: Some(user.client_id),
            name: user.name,
            message: None,
        }
    }

    fn missing() -> Self {
        Self {
            exists: false,
            user_id: None,
            client_id: None,
            name: None,
            message: Some(REGISTER_PROMPT),
        }
    }
}

/// GET /users/by-phone/{phone}
async fn lookup_by_phone(
    State(state): State<Arc<AppState>>,
    Path(phone): Path<String>,
) -> Result<Json<UserLookupResponse>, ApiError> {
    let phone = PhoneNumber::new(&phone)?;

    // No tenant row yet means nobody has registered; same answer as an
    // unknown phone.
    let Some(client) = ClientRepo::new(&state.pool)
        .find_by_name(&state.tenant)
        .await?
    else {
        return Ok(Json(UserLookupResponse::missing()));
    };

    let user = UserRepo::new(&state.pool)
        .find_by_phone(client.client_id, &phone)
        .await?;

    Ok(Json(match user {
        Some(user) => UserLookupResponse::found(user),
        None => UserLookupResponse::missing(),
    }))
}

/// Register user request
#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    /// An earlier revision of the assistant sent `phone_number`
    #[serde(alias = "phone_number")]
    pub phone: String,
}

/// Register user response
#[derive(Serialize)]
pub struct RegisterUserResponse {
    pub message: &'static str,
    pub user_id: Uuid,
    pub client_id: Uuid,
}

/// POST /users/register
async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisterUserResponse>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty { field: "name" }.into());
    }
    let phone = PhoneNumber::new(&req.phone)?;

    let client = ClientRepo::new(&state.pool).ensure(&state.tenant).await?;
    let user = UserRepo::new(&state.pool)
        .register(client.client_id, name, &phone)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterUserResponse {
            message: "User registered successfully",
            user_id: user.user_id,
            client_id: user.client_id,
        }),
    ))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/by-phone/{phone}", get(lookup_by_phone))
        .route("/users/register", post(register_user))
}
