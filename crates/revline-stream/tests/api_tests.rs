//! Integration tests for the stream server endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic, routing, and
//! the CORS policy without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use revline_signal::RpmCell;
use revline_stream::router::build_router;
use revline_stream::server::ServerConfig;
use revline_stream::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

fn make_router() -> Router {
    let cell = Arc::new(RpmCell::new());
    cell.store(4210);
    let state = Arc::new(AppState::new(cell));
    build_router(state, &ServerConfig::default()).unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health_reports_ok() {
    let router = make_router();

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, serde_json::json!({ "ok": true }));
}

#[tokio::test]
async fn test_health_ignores_generator_state() {
    // A cell that has never been written still yields a healthy probe.
    let state = Arc::new(AppState::new(Arc::new(RpmCell::new())));
    let router = build_router(state, &ServerConfig::default()).unwrap();

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ws_requires_an_upgrade_handshake() {
    let router = make_router();

    // A plain GET without the WebSocket upgrade headers must be
    // rejected rather than served.
    let response = router
        .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cors_preflight_echoes_the_configured_origin() {
    let router = make_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/health")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_does_not_allow_other_origins() {
    let router = make_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/health")
                .header("origin", "http://evil.example")
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let router = make_router();

    let response = router
        .oneshot(Request::get("/api/rpm").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_origin_is_rejected_at_router_build() {
    let state = Arc::new(AppState::new(Arc::new(RpmCell::new())));
    let config = ServerConfig {
        allowed_origin: String::from("not an origin\n"),
        ..ServerConfig::default()
    };

    assert!(build_router(state, &config).is_err());
}
