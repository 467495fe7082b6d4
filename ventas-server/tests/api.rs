//! End-to-end tests for the HTTP surface
//!
//! Drives the real router over a throwaway on-disk SQLite database, the
//! same code path the zero-config deployment uses.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use ventas_server::db;
use ventas_server::http::server::build_router;
use ventas_server::AppState;

async fn test_app() -> (TempDir, Router) {
    let dir = TempDir::new().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());

    let pool = db::create_pool(&url).await.expect("pool creation failed");
    db::migrations::run(&pool).await.expect("schema bootstrap failed");

    let state = AppState::new(pool, "cafe arenillo");
    (dir, build_router(Arc::new(state)))
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, value)
}

#[tokio::test]
async fn welcome_and_health_are_fixed_contracts() {
    let (_dir, app) = test_app().await;

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Welcome to the Sales Agent API!"}));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "message": "Backend reachable by LLM"})
    );
}

#[tokio::test]
async fn register_then_lookup_round_trip() {
    let (_dir, app) = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/register",
        Some(json!({"name": "Bob", "phone": "987"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    let user_id = body["user_id"].as_str().expect("user_id").to_owned();

    let (status, body) = send(&app, "GET", "/users/by-phone/987", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);
    assert_eq!(body["name"], "Bob");
    assert_eq!(body["user_id"], user_id.as_str());
    assert!(body["client_id"].is_string());
}

#[tokio::test]
async fn unregistered_phone_is_a_normal_miss() {
    let (_dir, app) = test_app().await;

    let (status, body) = send(&app, "GET", "/users/by-phone/000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);
    assert!(body["message"].as_str().expect("guidance").contains("name"));
    assert!(body.get("user_id").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_idempotent() {
    let (_dir, app) = test_app().await;

    let (_, first) = send(
        &app,
        "POST",
        "/users/register",
        Some(json!({"name": "Bob", "phone": "987"})),
    )
    .await;

    // Same phone again, different name; the original row wins
    let (status, second) = send(
        &app,
        "POST",
        "/users/register",
        Some(json!({"name": "Robert", "phone": "987"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["user_id"], first["user_id"]);
    assert_eq!(second["client_id"], first["client_id"]);

    let (_, looked_up) = send(&app, "GET", "/users/by-phone/987", None).await;
    assert_eq!(looked_up["name"], "Bob");
}

#[tokio::test]
async fn register_accepts_phone_number_alias() {
    let (_dir, app) = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/users/register",
        Some(json!({"name": "Bob", "phone_number": "987"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn register_rejects_empty_name_and_bad_phone() {
    let (_dir, app) = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/register",
        Some(json!({"name": "   ", "phone": "987"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(
        &app,
        "POST",
        "/users/register",
        Some(json!({"name": "Bob", "phone": "not-a-phone"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn register_user(app: &Router, name: &str, phone: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/users/register",
        Some(json!({"name": name, "phone": phone})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["user_id"].as_str().expect("user_id").to_owned()
}

#[tokio::test]
async fn conversation_and_message_flow() {
    let (_dir, app) = test_app().await;
    let user_id = register_user(&app, "Bob", "987").await;

    let (status, conversation) = send(
        &app,
        "POST",
        "/conversations",
        Some(json!({"user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(conversation["status"], "open");
    let conversation_id = conversation["conversation_id"].as_str().expect("id").to_owned();

    for (sender, direction, content) in [
        ("user", "incoming", "hola"),
        ("agent", "outgoing", "buenas! que te preparo?"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/conversations/{conversation_id}/messages"),
            Some(json!({"sender": sender, "direction": direction, "content": content})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, listed) = send(
        &app,
        "GET",
        &format!("/conversations/{conversation_id}/messages"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 2);
    assert_eq!(listed["items"][0]["content"], "hola");
    assert_eq!(listed["items"][1]["sender"], "agent");

    let (status, closed) = send(
        &app,
        "PATCH",
        &format!("/conversations/{conversation_id}/status"),
        Some(json!({"status": "closed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed");
    assert!(closed["ended_at"].is_string());
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let (_dir, app) = test_app().await;
    let user_id = register_user(&app, "Bob", "987").await;

    let (_, conversation) = send(
        &app,
        "POST",
        "/conversations",
        Some(json!({"user_id": user_id})),
    )
    .await;
    let conversation_id = conversation["conversation_id"].as_str().expect("id");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/conversations/{conversation_id}/status"),
        Some(json!({"status": "archived"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn messages_for_unknown_conversation_are_404() {
    let (_dir, app) = test_app().await;

    let (status, body) = send(
        &app,
        "GET",
        "/conversations/00000000-0000-0000-0000-000000000000/messages",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn order_total_reflects_catalog_price() {
    let (_dir, app) = test_app().await;
    let user_id = register_user(&app, "Bob", "987").await;

    let (status, product) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "americano", "price": 2.5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["product_id"].as_str().expect("id").to_owned();

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({"user_id": user_id, "product_id": product_id, "quantity": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total"], 7.5);

    let order_id = order["order_id"].as_str().expect("id");
    let (status, shipped) = send(
        &app,
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(json!({"status": "shipped"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shipped["status"], "shipped");
}

#[tokio::test]
async fn zero_quantity_and_negative_price_are_rejected() {
    let (_dir, app) = test_app().await;
    let user_id = register_user(&app, "Bob", "987").await;

    let (status, _) = send(
        &app,
        "POST",
        "/products",
        Some(json!({"name": "americano", "price": -1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "user_id": user_id,
            "product_id": "00000000-0000-0000-0000-000000000000",
            "quantity": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lead_lifecycle() {
    let (_dir, app) = test_app().await;
    let user_id = register_user(&app, "Bob", "987").await;

    let (status, lead) = send(&app, "POST", "/leads", Some(json!({"user_id": user_id}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lead["status"], "new");

    let lead_id = lead["lead_id"].as_str().expect("id");
    let (status, won) = send(
        &app,
        "PATCH",
        &format!("/leads/{lead_id}/status"),
        Some(json!({"status": "won"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(won["status"], "won");

    let (status, listed) = send(&app, "GET", "/leads", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
}
