//! The RPM signal state machine.
//!
//! [`SignalMachine`] fabricates a plausible engine trace: rest at
//! idle, pull through three gears with a shift drop between each, hit
//! the limiter at redline, then lift off and return to idle, forever.
//! The original behavior is straight-line sequential code; here it is
//! an enumerated [`Phase`] with a per-tick transition function so each
//! phase can be exercised directly with an injected RNG and without
//! waiting on real time.
//!
//! Each call to [`SignalMachine::step`] advances exactly one tick and
//! returns a [`Step`]: the RPM value to publish and how long the
//! caller should hold before the next tick. Pacing is a profile
//! parameter, not a real-time guarantee; only the relative cadence
//! matters for a convincing trace.
//!
//! # Invariants
//!
//! - Every stepped value lies in `[rpm_floor, redline]`.
//! - Idle writes additionally stay inside the idle band.
//! - The second-gear shift point is re-drawn from
//!   `gear2_target_range` on every loop iteration.

use std::time::Duration;

use rand::Rng;

use crate::profile::{ProfileError, PullProfile, StepRange};

/// Gear the pull is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gear {
    /// First gear, shifting at the fixed first-gear target.
    First,
    /// Second gear, shifting at a target re-drawn each loop.
    Second,
    /// Third gear, running out to the redline.
    Third,
}

/// Phase of the trace, with per-phase progress carried in the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Resting near the idle target with per-tick jitter.
    Idle {
        /// Idle ticks left before the pull starts.
        remaining: u32,
    },
    /// Climbing toward the current gear's shift point.
    Ramp {
        /// Gear being pulled.
        gear: Gear,
        /// RPM at which this gear exits.
        target: u32,
    },
    /// Hanging at the shift point for one beat before the drop.
    ShiftPause {
        /// How long the hang lasts.
        hold: Duration,
        /// RPM the following drop falls to.
        floor: u32,
        /// Gear entered once the drop settles.
        next: Gear,
    },
    /// Falling fast to the shift floor.
    ShiftDrop {
        /// RPM the drop bottoms out at.
        floor: u32,
        /// Gear entered once the drop settles.
        next: Gear,
    },
    /// Wobbling around the shift floor before the next pull.
    ShiftSettle {
        /// RPM the settle jitters around.
        anchor: u32,
        /// Settle ticks left.
        remaining: u32,
        /// Gear entered when settling completes.
        next: Gear,
    },
    /// Bouncing off the limiter at redline.
    RedlineBounce {
        /// Bounces left.
        remaining: u32,
    },
    /// Lifting off, falling back to idle.
    Decelerate,
}

/// One advanced tick: the value to publish and the pacing after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The RPM value for this tick.
    pub rpm: u32,
    /// How long to hold before the next tick.
    pub hold: Duration,
}

/// Errors a step can surface.
///
/// Out-of-range values cannot occur by construction (every write is
/// clamped), so any error here marks a fault the run loop answers by
/// restarting the machine rather than freezing the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// A stepped value escaped the valid band.
    #[error("rpm {rpm} escaped the valid band [{floor}, {redline}]")]
    RpmOutOfRange {
        /// The offending value.
        rpm: u32,
        /// Lower bound of the band.
        floor: u32,
        /// Upper bound of the band.
        redline: u32,
    },
}

/// The looping three-gear pull state machine.
#[derive(Debug, Clone)]
pub struct SignalMachine {
    profile: PullProfile,
    phase: Phase,
    rpm: u32,
}

impl SignalMachine {
    /// Create a machine resting at idle.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Invalid`] if the profile fails
    /// validation.
    pub fn new(profile: PullProfile) -> Result<Self, ProfileError> {
        profile.validate()?;
        let phase = Phase::Idle {
            remaining: profile.idle_hold_ticks,
        };
        let rpm = profile.idle_rpm;
        Ok(Self {
            profile,
            phase,
            rpm,
        })
    }

    /// Return the current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Return the most recently stepped RPM value.
    pub const fn rpm(&self) -> u32 {
        self.rpm
    }

    /// Return the profile the machine runs.
    pub const fn profile(&self) -> &PullProfile {
        &self.profile
    }

    /// Restore the machine to its initial idle state.
    ///
    /// Used by the run loop to restart the trace after a fault.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle {
            remaining: self.profile.idle_hold_ticks,
        };
        self.rpm = self.profile.idle_rpm;
    }

    /// Advance one tick.
    ///
    /// Updates the RPM according to the current phase, moves the phase
    /// forward when its exit condition is met, and returns the value
    /// together with the hold before the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::RpmOutOfRange`] if the new value escaped
    /// the valid band. Callers should treat this as restart-eligible.
    pub fn step(&mut self, rng: &mut impl Rng) -> Result<Step, SignalError> {
        let (next_phase, hold) = match self.phase {
            Phase::Idle { remaining } => {
                self.rpm = jitter_around(self.profile.idle_rpm, self.profile.idle_jitter, rng)
                    .clamp(self.profile.rpm_floor, self.profile.idle_band_max);
                let left = remaining.saturating_sub(1);
                let next = if left == 0 {
                    Phase::Ramp {
                        gear: Gear::First,
                        target: self.profile.gear1_target,
                    }
                } else {
                    Phase::Idle { remaining: left }
                };
                (next, self.profile.ramp_hold)
            }
            Phase::Ramp { gear, target } => {
                let boost = self.ramp_step_range(gear).sample(rng);
                self.rpm = self
                    .rpm
                    .saturating_add(boost)
                    .clamp(self.profile.rpm_floor, self.profile.redline);
                let next = if self.rpm >= target {
                    self.shift_exit(gear)
                } else {
                    Phase::Ramp { gear, target }
                };
                (next, self.profile.ramp_hold)
            }
            Phase::ShiftPause { hold, floor, next } => {
                // The value hangs at the shift point for one beat.
                (Phase::ShiftDrop { floor, next }, hold)
            }
            Phase::ShiftDrop { floor, next } => {
                let cut = self.profile.shift_drop_step.sample(rng);
                self.rpm = self.rpm.saturating_sub(cut).max(floor);
                let next_phase = if self.rpm <= floor {
                    Phase::ShiftSettle {
                        anchor: floor,
                        remaining: self.profile.settle_ticks,
                        next,
                    }
                } else {
                    Phase::ShiftDrop { floor, next }
                };
                (next_phase, self.profile.drop_hold)
            }
            Phase::ShiftSettle {
                anchor,
                remaining,
                next,
            } => {
                self.rpm = jitter_around(anchor, self.profile.settle_jitter, rng)
                    .clamp(self.profile.rpm_floor, self.profile.redline);
                let left = remaining.saturating_sub(1);
                let next_phase = if left == 0 {
                    Phase::Ramp {
                        gear: next,
                        target: self.ramp_target(next, rng),
                    }
                } else {
                    Phase::ShiftSettle {
                        anchor,
                        remaining: left,
                        next,
                    }
                };
                (next_phase, self.profile.ramp_hold)
            }
            Phase::RedlineBounce { remaining } => {
                let dip = self.profile.bounce_offset.sample(rng);
                self.rpm = self.profile.redline.saturating_sub(dip);
                let left = remaining.saturating_sub(1);
                let next = if left == 0 {
                    Phase::Decelerate
                } else {
                    Phase::RedlineBounce { remaining: left }
                };
                (next, self.profile.bounce_hold)
            }
            Phase::Decelerate => {
                let cut = self.profile.decel_step.sample(rng);
                self.rpm = self.rpm.saturating_sub(cut).max(self.profile.idle_rpm);
                let next = if self.rpm <= self.profile.idle_rpm {
                    Phase::Idle {
                        remaining: self.profile.idle_hold_ticks,
                    }
                } else {
                    Phase::Decelerate
                };
                (next, self.profile.ramp_hold)
            }
        };

        self.phase = next_phase;

        if self.rpm < self.profile.rpm_floor || self.rpm > self.profile.redline {
            return Err(SignalError::RpmOutOfRange {
                rpm: self.rpm,
                floor: self.profile.rpm_floor,
                redline: self.profile.redline,
            });
        }

        Ok(Step {
            rpm: self.rpm,
            hold,
        })
    }

    /// Phase entered when a gear reaches its shift point.
    const fn shift_exit(&self, gear: Gear) -> Phase {
        match gear {
            Gear::First => Phase::ShiftPause {
                hold: self.profile.first_shift_pause,
                floor: self.profile.first_shift_floor,
                next: Gear::Second,
            },
            Gear::Second => Phase::ShiftPause {
                hold: self.profile.second_shift_pause,
                floor: self.profile.second_shift_floor,
                next: Gear::Third,
            },
            Gear::Third => Phase::RedlineBounce {
                remaining: self.profile.bounce_ticks,
            },
        }
    }

    /// Per-tick gain range for a gear.
    const fn ramp_step_range(&self, gear: Gear) -> StepRange {
        match gear {
            Gear::First => self.profile.gear1_step,
            Gear::Second => self.profile.gear2_step,
            Gear::Third => self.profile.gear3_step,
        }
    }

    /// Shift point for a gear about to be pulled.
    ///
    /// The second-gear target is re-drawn here, which is exactly once
    /// per loop iteration.
    fn ramp_target(&self, gear: Gear, rng: &mut impl Rng) -> u32 {
        match gear {
            Gear::First => self.profile.gear1_target,
            Gear::Second => self.profile.gear2_target_range.sample(rng),
            Gear::Third => self.profile.redline,
        }
    }
}

/// Draw a value uniformly from `center ± jitter` without signed math.
fn jitter_around(center: u32, jitter: u32, rng: &mut impl Rng) -> u32 {
    let span = jitter.saturating_mul(2);
    let offset = rng.random_range(0..=span);
    center.saturating_sub(jitter).saturating_add(offset)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn machine() -> SignalMachine {
        SignalMachine::new(PullProfile::default()).unwrap()
    }

    /// Step until the phase satisfies `pred`, collecting every step.
    ///
    /// Returns `None` if the predicate never matched within `limit`
    /// steps, so tests fail on the unwrap instead of spinning.
    fn drive_until(
        machine: &mut SignalMachine,
        rng: &mut SmallRng,
        pred: impl Fn(Phase) -> bool,
        limit: u32,
    ) -> Option<Vec<Step>> {
        let mut steps = Vec::new();
        for _ in 0..limit {
            steps.push(machine.step(rng).unwrap());
            if pred(machine.phase()) {
                return Some(steps);
            }
        }
        None
    }

    #[test]
    fn machine_starts_resting_at_idle() {
        let machine = machine();
        assert!(matches!(machine.phase(), Phase::Idle { .. }));
        assert_eq!(machine.rpm(), 850);
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let profile = PullProfile {
            gear1_step: StepRange::new(200, 120),
            ..PullProfile::default()
        };
        assert!(SignalMachine::new(profile).is_err());
    }

    #[test]
    fn idle_jitters_inside_the_band_then_starts_the_pull() {
        let mut machine = machine();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..50 {
            let step = machine.step(&mut rng).unwrap();
            assert!((650..=1100).contains(&step.rpm));
            assert!((810..=890).contains(&step.rpm));
            assert_eq!(step.hold, Duration::from_millis(50));
        }

        assert!(matches!(
            machine.phase(),
            Phase::Ramp {
                gear: Gear::First,
                ..
            }
        ));
    }

    #[test]
    fn first_gear_climbs_monotonically_to_the_shift_point() {
        let mut machine = machine();
        let mut rng = SmallRng::seed_from_u64(42);

        drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::Ramp { gear: Gear::First, .. }),
            100,
        )
        .unwrap();

        let mut prev = machine.rpm();
        let steps = drive_until(
            &mut machine,
            &mut rng,
            |p| !matches!(p, Phase::Ramp { .. }),
            100,
        )
        .unwrap();

        for step in &steps {
            assert!(step.rpm >= prev, "ramp must not fall back");
            assert_eq!(step.hold, Duration::from_millis(50));
            prev = step.rpm;
        }
        assert!(machine.rpm() >= 3000);
        assert!(matches!(
            machine.phase(),
            Phase::ShiftPause {
                next: Gear::Second,
                ..
            }
        ));
    }

    #[test]
    fn first_shift_pauses_drops_and_settles() {
        let mut machine = machine();
        let mut rng = SmallRng::seed_from_u64(42);

        drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::ShiftPause { .. }),
            200,
        )
        .unwrap();
        let at_shift_point = machine.rpm();

        // One beat at the shift point, value unchanged.
        let pause = machine.step(&mut rng).unwrap();
        assert_eq!(pause.rpm, at_shift_point);
        assert_eq!(pause.hold, Duration::from_millis(150));
        assert!(matches!(machine.phase(), Phase::ShiftDrop { .. }));

        let drops = drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::ShiftSettle { .. }),
            50,
        )
        .unwrap();
        let mut prev = at_shift_point;
        for step in &drops {
            assert!(step.rpm < prev, "drop must fall every tick");
            assert_eq!(step.hold, Duration::from_millis(30));
            prev = step.rpm;
        }
        assert_eq!(drops.last().unwrap().rpm, 1800);

        let settles = drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::Ramp { gear: Gear::Second, .. }),
            20,
        )
        .unwrap();
        assert_eq!(settles.len(), 8);
        for step in &settles {
            assert!((1740..=1860).contains(&step.rpm));
            assert_eq!(step.hold, Duration::from_millis(50));
        }
    }

    #[test]
    fn second_gear_target_is_drawn_from_one_range_every_loop() {
        let mut machine = machine();
        let mut rng = SmallRng::seed_from_u64(42);

        let second_gear_target = |machine: &mut SignalMachine, rng: &mut SmallRng| {
            drive_until(
                machine,
                rng,
                |p| matches!(p, Phase::Ramp { gear: Gear::Second, .. }),
                500,
            )
            .unwrap();
            match machine.phase() {
                Phase::Ramp {
                    gear: Gear::Second,
                    target,
                } => Some(target),
                _ => None,
            }
            .unwrap()
        };

        let first_loop = second_gear_target(&mut machine, &mut rng);
        assert!((4100..=4500).contains(&first_loop));

        // Run out the rest of the loop and check the re-drawn target.
        drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::Idle { .. }),
            500,
        )
        .unwrap();
        let second_loop = second_gear_target(&mut machine, &mut rng);
        assert!((4100..=4500).contains(&second_loop));
    }

    #[test]
    fn third_gear_reaches_redline_and_bounces_off_the_limiter() {
        let mut machine = machine();
        let mut rng = SmallRng::seed_from_u64(42);

        drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::RedlineBounce { .. }),
            500,
        )
        .unwrap();
        assert_eq!(machine.rpm(), 6000);

        let bounces = drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::Decelerate),
            20,
        )
        .unwrap();
        assert_eq!(bounces.len(), 10);
        for step in &bounces {
            assert!((5880..=6000).contains(&step.rpm));
            assert_eq!(step.hold, Duration::from_millis(40));
        }
    }

    #[test]
    fn lift_off_falls_back_to_the_idle_band() {
        let mut machine = machine();
        let mut rng = SmallRng::seed_from_u64(42);

        drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::Decelerate),
            500,
        )
        .unwrap();

        let mut prev = machine.rpm();
        let steps = drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::Idle { .. }),
            50,
        )
        .unwrap();
        for step in &steps {
            assert!(step.rpm < prev, "lift-off must fall every tick");
            prev = step.rpm;
        }
        assert_eq!(machine.rpm(), 850);

        // The next tick is an idle write inside the band.
        let idle = machine.step(&mut rng).unwrap();
        assert!((810..=890).contains(&idle.rpm));
    }

    #[test]
    fn every_write_stays_inside_the_valid_band() {
        let mut machine = machine();
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..5000 {
            let step = machine.step(&mut rng).unwrap();
            assert!((650..=6000).contains(&step.rpm));
        }
    }

    #[test]
    fn reset_restores_the_initial_idle_state() {
        let mut machine = machine();
        let mut rng = SmallRng::seed_from_u64(42);

        drive_until(
            &mut machine,
            &mut rng,
            |p| matches!(p, Phase::Ramp { gear: Gear::Second, .. }),
            500,
        )
        .unwrap();
        assert_ne!(machine.rpm(), 850);

        machine.reset();
        assert!(matches!(machine.phase(), Phase::Idle { .. }));
        assert_eq!(machine.rpm(), 850);
    }
}
