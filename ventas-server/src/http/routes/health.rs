//! Root and health endpoints
//!
//! The health body is a fixed contract the assistant polls before calling
//! anything else; it must answer 200 whether or not the database is up.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Welcome response
#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET /
async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Sales Agent API!",
    })
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Backend reachable by LLM",
    })
}

/// Root and health routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_returns_fixed_body() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.message, "Backend reachable by LLM");
    }

    #[tokio::test]
    async fn root_welcomes() {
        let Json(body) = root().await;
        assert_eq!(body.message, "Welcome to the Sales Agent API!");
    }
}
