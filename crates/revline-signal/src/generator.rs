//! The background task that drives the signal against real time.
//!
//! [`run_generator`] owns a [`SignalMachine`] and loops forever:
//! advance one tick, publish the value into the shared [`RpmCell`],
//! then hold for the step's pacing. Every suspension point races the
//! stop control, so a requested stop is honored immediately instead
//! of after the current pacing sleep.
//!
//! A step fault is logged and answered by restarting the trace from
//! idle; the task itself only exits on a requested stop, so the
//! signal can never silently freeze while the process is up.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::cell::RpmCell;
use crate::control::SignalControl;
use crate::machine::SignalMachine;

/// Run the signal generator until a stop is requested.
///
/// The RNG is injected so tests can drive the loop with a seeded
/// source; production callers pass an OS-seeded
/// [`SmallRng`](rand::rngs::SmallRng).
pub async fn run_generator<R: Rng + Send>(
    mut machine: SignalMachine,
    cell: Arc<RpmCell>,
    control: Arc<SignalControl>,
    mut rng: R,
) {
    info!("signal generator started");

    loop {
        if control.is_stop_requested() {
            break;
        }

        match machine.step(&mut rng) {
            Ok(step) => {
                cell.store(step.rpm);
                tokio::select! {
                    () = tokio::time::sleep(step.hold) => {}
                    () = control.cancelled() => break,
                }
            }
            Err(e) => {
                // Restart-eligible: a frozen signal is worse than a
                // discontinuity in a fabricated trace.
                warn!(error = %e, "signal machine fault, restarting the trace");
                machine.reset();
            }
        }
    }

    debug!(rpm = cell.load(), "last published value");
    info!("signal generator stopped");
}
