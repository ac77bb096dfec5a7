//! Synthetic engine-RPM signal generation for Revline.
//!
//! This crate owns the fabricated RPM trace: a looping three-gear
//! full-throttle pull (idle, ramp, shift drop, ramp, shift drop, ramp
//! to redline, limiter bounce, lift-off) expressed as an explicit
//! state machine rather than straight-line sequential code, so each
//! phase transition can be unit tested without running a real-time
//! loop.
//!
//! # Modules
//!
//! - [`profile`] -- Tuning parameters for the trace (targets, step
//!   ranges, tick counts, pacing) with validation.
//! - [`machine`] -- The [`SignalMachine`] phase state machine and its
//!   per-tick transition function.
//! - [`cell`] -- The shared latest-value cell ([`RpmCell`]) and the
//!   wire record ([`RpmSample`]).
//! - [`control`] -- Cooperative stop signal shared between the
//!   generator task and the server.
//! - [`generator`] -- The background task driving the machine against
//!   real time and publishing into the cell.
//!
//! [`SignalMachine`]: machine::SignalMachine
//! [`RpmCell`]: cell::RpmCell
//! [`RpmSample`]: cell::RpmSample

pub mod cell;
pub mod control;
pub mod generator;
pub mod machine;
pub mod profile;

// Re-export primary types for convenience.
pub use cell::{RpmCell, RpmSample};
pub use control::SignalControl;
pub use generator::run_generator;
pub use machine::{Gear, Phase, SignalError, SignalMachine, Step};
pub use profile::{ProfileError, PullProfile, StepRange};
