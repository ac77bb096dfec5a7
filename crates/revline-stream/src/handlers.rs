//! REST endpoint handlers for the stream server.

use axum::Json;
use axum::response::IntoResponse;

/// Serve the liveness probe.
///
/// Always succeeds while the process is up, independent of the
/// generator's state.
///
/// # Route
///
/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}
