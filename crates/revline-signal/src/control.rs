//! Cooperative stop signal for the generator and server tasks.
//!
//! [`SignalControl`] is shared in an [`Arc`](std::sync::Arc) between
//! the engine binary, the generator run loop, and the HTTP server's
//! graceful-shutdown future. The stop flag is an atomic for lock-free
//! checks on the tick path; the [`Notify`] wakes any task parked at a
//! suspension point so shutdown is deterministic rather than bounded
//! by the longest pacing sleep.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Shared stop control.
#[derive(Debug, Default)]
pub struct SignalControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Notification used to wake tasks parked at suspension points.
    stop_notify: Notify,
}

impl SignalControl {
    /// Create a control with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a clean stop and wake every waiting task.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested.
    ///
    /// Returns immediately if a stop was already requested. The flag
    /// is re-checked around the notification so a stop raced against
    /// registration is never missed.
    pub async fn cancelled(&self) {
        loop {
            if self.is_stop_requested() {
                return;
            }
            let notified = self.stop_notify.notified();
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }
}
