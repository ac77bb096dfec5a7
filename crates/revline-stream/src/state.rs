//! Shared application state for the stream server.
//!
//! [`AppState`] holds the handle to the latest-value cell the signal
//! generator writes. It is wrapped in [`Arc`] and injected into
//! handlers via Axum's `State` extractor. There is no per-client
//! state: every broadcast loop observes the same global signal.

use std::sync::Arc;

use revline_signal::RpmCell;

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Latest-value cell, single-writer (the generator), multi-reader.
    pub rpm: Arc<RpmCell>,
}

impl AppState {
    /// Create application state around an existing cell handle.
    pub const fn new(rpm: Arc<RpmCell>) -> Self {
        Self { rpm }
    }
}
