//! Engine binary for Revline.
//!
//! This is the main entry point that wires together the signal
//! generator task and the stream server. It initializes logging,
//! builds configuration from the environment, spawns both tasks
//! against the shared latest-value cell, and shuts them down
//! deterministically on Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Build server configuration from defaults + environment
//! 3. Validate the pull profile and build the signal machine
//! 4. Create the shared cell and stop control, spawn the generator
//! 5. Spawn the stream server
//! 6. Wait for Ctrl-C, request stop, await both tasks

mod error;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use revline_signal::{PullProfile, RpmCell, SignalControl, SignalMachine, run_generator};
use revline_stream::server::ServerConfig;
use revline_stream::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point for the engine.
///
/// Initializes all subsystems and runs until a shutdown signal is
/// received.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("revline-engine starting");

    // 2. Build configuration.
    let config = ServerConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        allowed_origin = %config.allowed_origin,
        "Configuration loaded"
    );

    // 3. Validate the pull profile and build the signal machine.
    let profile = PullProfile::default();
    let machine = SignalMachine::new(profile).map_err(EngineError::from)?;
    info!(
        idle_rpm = machine.profile().idle_rpm,
        redline = machine.profile().redline,
        "Pull profile validated"
    );

    // 4. Create shared state and spawn the generator task.
    let cell = Arc::new(RpmCell::new());
    let control = Arc::new(SignalControl::new());
    let rng = SmallRng::from_rng(&mut rand::rng());
    let generator_handle = tokio::spawn(run_generator(
        machine,
        Arc::clone(&cell),
        Arc::clone(&control),
        rng,
    ));
    info!("Signal generator spawned");

    // 5. Spawn the stream server.
    let state = Arc::new(AppState::new(Arc::clone(&cell)));
    let server_handle =
        revline_stream::spawn_server(config, state, Arc::clone(&control))
            .await
            .map_err(EngineError::from)?;

    // 6. Wait for Ctrl-C, then stop both tasks.
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| EngineError::Signal {
            message: format!("{e}"),
        })?;
    info!("Shutdown signal received");

    control.request_stop();
    if let Err(e) = generator_handle.await {
        warn!(error = %e, "generator task join failed");
    }
    if let Err(e) = server_handle.await {
        warn!(error = %e, "server task join failed");
    }

    info!("revline-engine shutdown complete");

    Ok(())
}
