//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and shutdown.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Pull profile validation failed.
    #[error("profile error: {source}")]
    Profile {
        /// The underlying profile error.
        #[from]
        source: revline_signal::ProfileError,
    },

    /// Stream server failed to start.
    #[error("server error: {source}")]
    Server {
        /// The underlying startup error.
        #[from]
        source: revline_stream::startup::StartupError,
    },

    /// The shutdown signal handler could not be installed.
    #[error("signal handler error: {message}")]
    Signal {
        /// Description of the signal-handler failure.
        message: String,
    },
}
