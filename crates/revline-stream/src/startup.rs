//! Stream server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_server`] which launches the HTTP + `WebSocket`
//! server on a background Tokio task. The engine binary calls this
//! during startup so the server runs concurrently with the signal
//! generator task, and both shut down through the same
//! [`SignalControl`].

use std::sync::Arc;

use revline_signal::SignalControl;
use tokio::task::JoinHandle;

use crate::server::{ServerConfig, StreamError};
use crate::state::AppState;

/// Errors that can occur when spawning the stream server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to build or start.
    #[error("server start error: {0}")]
    Server(#[from] StreamError),
}

/// Spawn the stream server on a background Tokio task.
///
/// Returns a [`JoinHandle`] so the caller can await the server's
/// clean exit after requesting a stop through the control.
///
/// Obvious misconfigurations (unparsable bind address, invalid CORS
/// origin) are rejected eagerly, before the background task is
/// spawned; the actual bind happens inside
/// [`start_server`](crate::server::start_server).
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configuration is invalid.
pub async fn spawn_server(
    config: ServerConfig,
    state: Arc<AppState>,
    control: Arc<SignalControl>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr_str = format!("{}:{}", config.host, config.port);
    let _: std::net::SocketAddr = addr_str
        .parse()
        .map_err(|e| StartupError::Server(StreamError::Bind(format!(
            "invalid address {addr_str}: {e}"
        ))))?;
    let _: axum::http::HeaderValue =
        config
            .allowed_origin
            .parse()
            .map_err(|source| StartupError::Server(StreamError::InvalidOrigin {
                origin: config.allowed_origin.clone(),
                source,
            }))?;

    let port = config.port;
    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state, control).await {
            tracing::error!(error = %e, "stream server exited with error");
        }
    });

    tracing::info!(port, "stream server spawned on background task");

    Ok(handle)
}
