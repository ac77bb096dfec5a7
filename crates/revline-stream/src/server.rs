//! Stream server configuration and lifecycle management.
//!
//! Provides [`start_server`] which binds to a TCP port and runs the
//! Axum server until the shared [`SignalControl`] requests a stop,
//! at which point in-flight connections are drained gracefully.

use std::net::SocketAddr;
use std::sync::Arc;

use revline_signal::SignalControl;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Configuration for the stream server.
///
/// There is no configuration file; values are defaults overridable
/// through the environment (see [`ServerConfig::from_env`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// The single browser origin allowed by CORS.
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8000,
            allowed_origin: String::from("http://localhost:5173"),
        }
    }
}

impl ServerConfig {
    /// Build the configuration from defaults plus environment
    /// overrides:
    ///
    /// - `REVLINE_HOST` overrides `host`
    /// - `REVLINE_PORT` overrides `port`
    /// - `REVLINE_ALLOWED_ORIGIN` overrides `allowed_origin`
    ///
    /// An unparsable port override is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("REVLINE_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("REVLINE_PORT") {
            match port.parse::<u16>() {
                Ok(parsed) => config.port = parsed,
                Err(e) => warn!(value = %port, error = %e, "ignoring unparsable REVLINE_PORT"),
            }
        }
        if let Ok(origin) = std::env::var("REVLINE_ALLOWED_ORIGIN") {
            config.allowed_origin = origin;
        }
        config
    }
}

/// Errors that can occur when building or running the stream server.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The configured CORS origin is not a valid header value.
    #[error("invalid allowed origin {origin:?}: {source}")]
    InvalidOrigin {
        /// The rejected origin string.
        origin: String,
        /// The underlying header parse error.
        source: axum::http::header::InvalidHeaderValue,
    },

    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Start the stream server.
///
/// Binds to the configured address, builds the router, and serves
/// requests until the control requests a stop. Returns `Ok(())` on
/// clean shutdown, or an error if binding or serving fails.
///
/// # Errors
///
/// Returns an error if the configured origin is invalid, the TCP
/// listener cannot bind, or the server encounters a fatal I/O error.
pub async fn start_server(
    config: &ServerConfig,
    state: Arc<AppState>,
    control: Arc<SignalControl>,
) -> Result<(), StreamError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| StreamError::Bind(format!("invalid address: {e}")))?;

    let router = build_router(state, config)?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| StreamError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "stream server listening");

    let shutdown = async move { control.cancelled().await };
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| StreamError::Serve(format!("serve error: {e}")))?;

    info!("stream server stopped");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_the_dev_setup() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.allowed_origin, "http://localhost:5173");
    }
}
