//! Axum router construction for the stream server.
//!
//! Assembles the `WebSocket` and liveness routes into a single
//! [`Router`] with CORS middleware for the browser dashboard.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::server::{ServerConfig, StreamError};
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the stream server.
///
/// The router includes:
/// - `GET /health` -- fixed liveness response
/// - `GET /ws` -- `WebSocket` RPM stream
///
/// CORS is restricted to the single configured origin with
/// credentials allowed. Methods and headers mirror the request, the
/// wildcard-equivalent that remains legal alongside credentials.
///
/// # Errors
///
/// Returns [`StreamError::InvalidOrigin`] if the configured origin is
/// not a valid header value.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Result<Router, StreamError> {
    let origin: HeaderValue =
        config
            .allowed_origin
            .parse()
            .map_err(|source| StreamError::InvalidOrigin {
                origin: config.allowed_origin.clone(),
                source,
            })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .route("/ws", get(ws::ws_rpm))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
