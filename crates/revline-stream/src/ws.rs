//! `WebSocket` handler streaming the latest RPM value.
//!
//! Clients connect to `GET /ws` and receive a JSON-encoded
//! [`RpmSample`](revline_signal::RpmSample) text frame every 50 ms
//! for as long as the connection stays open. The loop polls the
//! shared cell on its own interval, independent of the generator's
//! tick cadence; a value may be stale by one generator tick, which is
//! acceptable for a simulation feed.
//!
//! Clients are passive receivers: Close (or a dead socket) ends the
//! loop, Ping is answered with Pong, and payload frames are ignored.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::state::AppState;

/// Cadence of the per-client stream (~20 Hz).
const STREAM_INTERVAL: Duration = Duration::from_millis(50);

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming the latest RPM value.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_rpm(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: read the shared cell on a fixed
/// interval and forward each sample as a text frame.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("stream client connected");

    let mut ticker = tokio::time::interval(STREAM_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Send the latest value on every interval tick.
            _ = ticker.tick() => {
                let sample = state.rpm.sample();
                let json = match serde_json::to_string(&sample) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("failed to serialize rpm sample: {e}");
                        continue;
                    }
                };
                let msg: Message = Message::Text(json.into());
                if socket.send(msg).await.is_err() {
                    debug!("stream client disconnected (send failed)");
                    return;
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("stream client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let pong = Message::Pong(data);
                        if socket.send(pong).await.is_err() {
                            debug!("stream client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("stream socket error: {e}");
                        return;
                    }
                    _ => {
                        // Clients are passive; text and binary frames
                        // are ignored.
                    }
                }
            }
        }
    }
}
