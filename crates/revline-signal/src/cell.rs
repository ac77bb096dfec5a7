//! The shared latest-value cell and the wire record.
//!
//! [`RpmCell`] is the single piece of state shared between the
//! generator task and the per-client broadcast loops: one atomic
//! integer, written by exactly one writer and read by any number of
//! readers without coordination. Staleness of one generator tick is
//! acceptable; this is a simulation feed, not a control system.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// JSON-serializable record pushed to each streaming client.
///
/// Serializes as `{"rpm": <integer>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpmSample {
    /// The latest simulated engine speed.
    pub rpm: u32,
}

/// Process-wide cell holding the latest RPM value.
///
/// Initialized to 0 and overwritten on every generator tick for the
/// lifetime of the process. Wrapped in [`Arc`](std::sync::Arc) and
/// handed to the generator task and each broadcast loop at
/// construction.
#[derive(Debug, Default)]
pub struct RpmCell(AtomicU32);

impl RpmCell {
    /// Create a cell holding 0 (no tick has run yet).
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Publish a new latest value. Generator-only.
    pub fn store(&self, rpm: u32) {
        self.0.store(rpm, Ordering::Release);
    }

    /// Read the latest value.
    pub fn load(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Read the latest value as a wire record.
    pub fn sample(&self) -> RpmSample {
        RpmSample { rpm: self.load() }
    }
}
