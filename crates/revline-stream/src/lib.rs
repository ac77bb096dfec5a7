//! Streaming API server for the Revline RPM signal.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) streaming the latest RPM value
//!   to each connected client at a fixed ~20 Hz cadence
//! - **Liveness endpoint** (`/health`) returning a fixed
//!   `{"ok": true}` response
//!
//! # Architecture
//!
//! The server reads from the shared [`RpmCell`] that the signal
//! generator task overwrites on every tick. Each `WebSocket` client
//! gets its own broadcast loop polling the cell on its own interval,
//! so clients are fully independent: one client's disconnection never
//! affects the generator or any other client. CORS is restricted to
//! a single configured development origin with credentials allowed.
//!
//! [`RpmCell`]: revline_signal::RpmCell

pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, StreamError, start_server};
pub use startup::spawn_server;
pub use state::AppState;
