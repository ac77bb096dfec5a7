//! Tuning parameters for the fabricated RPM trace.
//!
//! A [`PullProfile`] holds every number that shapes the trace: the
//! idle band, per-gear shift targets, randomized step ranges, settle
//! and bounce tick counts, and the pacing between ticks. The defaults
//! reproduce a three-gear pull that shifts at 3000, again above 4000,
//! and runs out to a 6000 RPM redline.
//!
//! Profiles are plain values with defaults; there is no configuration
//! file. [`PullProfile::validate`] rejects inconsistent parameters up
//! front so the state machine never has to reason about inverted
//! ranges or unreachable targets.

use std::time::Duration;

use rand::Rng;

/// Errors produced when a profile fails validation.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The profile parameters are inconsistent.
    #[error("invalid pull profile: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the profile.
        reason: String,
    },
}

/// An inclusive range a randomized step is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    /// Smallest step the range can produce.
    pub lo: u32,
    /// Largest step the range can produce.
    pub hi: u32,
}

impl StepRange {
    /// Create a new inclusive step range.
    pub const fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    /// Draw one step from the range.
    ///
    /// Requires `lo <= hi`; [`PullProfile::validate`] guarantees this
    /// for every range the machine samples.
    pub fn sample(&self, rng: &mut impl Rng) -> u32 {
        rng.random_range(self.lo..=self.hi)
    }
}

/// Tuning parameters for one looping three-gear pull.
///
/// All RPM values are absolute engine speeds; all tick counts are in
/// machine steps; all holds are the real-time pacing between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullProfile {
    /// Hard lower bound of the signal.
    pub rpm_floor: u32,
    /// Hard upper bound of the signal (the redline).
    pub redline: u32,

    /// Resting RPM the idle phase hovers around.
    pub idle_rpm: u32,
    /// Maximum jitter applied around the idle target, per tick.
    pub idle_jitter: u32,
    /// Upper bound of the idle band (idle writes never exceed this).
    pub idle_band_max: u32,
    /// Number of ticks the trace rests at idle before a pull.
    pub idle_hold_ticks: u32,

    /// RPM at which first gear shifts.
    pub gear1_target: u32,
    /// Per-tick RPM gain range in first gear.
    pub gear1_step: StepRange,
    /// Range the second-gear shift point is drawn from, once per loop.
    pub gear2_target_range: StepRange,
    /// Per-tick RPM gain range in second gear.
    pub gear2_step: StepRange,
    /// Per-tick RPM gain range in third gear.
    pub gear3_step: StepRange,

    /// Per-tick RPM loss range while a shift drop is falling.
    pub shift_drop_step: StepRange,
    /// RPM the first-to-second shift drops to.
    pub first_shift_floor: u32,
    /// RPM the second-to-third shift drops to.
    pub second_shift_floor: u32,
    /// Maximum jitter applied while settling after a drop.
    pub settle_jitter: u32,
    /// Number of ticks the trace settles after each drop.
    pub settle_ticks: u32,

    /// Number of limiter bounces at the redline.
    pub bounce_ticks: u32,
    /// Range the limiter pulls the signal below the redline, per bounce.
    pub bounce_offset: StepRange,

    /// Per-tick RPM loss range during lift-off.
    pub decel_step: StepRange,

    /// Pacing for idle, ramp, settle, and deceleration ticks.
    pub ramp_hold: Duration,
    /// Pacing for shift-drop ticks (drops fall faster than ramps climb).
    pub drop_hold: Duration,
    /// Pacing for limiter-bounce ticks.
    pub bounce_hold: Duration,
    /// Hang at the first shift point before the drop.
    pub first_shift_pause: Duration,
    /// Hang at the second shift point before the drop.
    pub second_shift_pause: Duration,
}

impl Default for PullProfile {
    fn default() -> Self {
        Self {
            rpm_floor: 650,
            redline: 6000,
            idle_rpm: 850,
            idle_jitter: 40,
            idle_band_max: 1100,
            idle_hold_ticks: 50,
            gear1_target: 3000,
            gear1_step: StepRange::new(120, 200),
            gear2_target_range: StepRange::new(4100, 4500),
            gear2_step: StepRange::new(90, 160),
            gear3_step: StepRange::new(70, 140),
            shift_drop_step: StepRange::new(220, 360),
            first_shift_floor: 1800,
            second_shift_floor: 2400,
            settle_jitter: 60,
            settle_ticks: 8,
            bounce_ticks: 10,
            bounce_offset: StepRange::new(0, 120),
            decel_step: StepRange::new(180, 300),
            ramp_hold: Duration::from_millis(50),
            drop_hold: Duration::from_millis(30),
            bounce_hold: Duration::from_millis(40),
            first_shift_pause: Duration::from_millis(150),
            second_shift_pause: Duration::from_millis(120),
        }
    }
}

impl PullProfile {
    /// Validate the profile.
    ///
    /// Checks that every step range is non-empty, that the idle band
    /// and shift targets are ordered inside `[rpm_floor, redline]`,
    /// and that every counted phase runs for at least one tick.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Invalid`] naming the first parameter
    /// that fails.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let ranges = [
            ("gear1_step", &self.gear1_step),
            ("gear2_target_range", &self.gear2_target_range),
            ("gear2_step", &self.gear2_step),
            ("gear3_step", &self.gear3_step),
            ("shift_drop_step", &self.shift_drop_step),
            ("bounce_offset", &self.bounce_offset),
            ("decel_step", &self.decel_step),
        ];
        for (name, range) in ranges {
            if range.lo > range.hi {
                return Err(ProfileError::Invalid {
                    reason: format!("{name} is empty: lo {} > hi {}", range.lo, range.hi),
                });
            }
        }

        if self.rpm_floor >= self.redline {
            return Err(ProfileError::Invalid {
                reason: format!(
                    "rpm_floor {} must be below redline {}",
                    self.rpm_floor, self.redline
                ),
            });
        }
        if self.idle_rpm < self.rpm_floor || self.idle_rpm > self.idle_band_max {
            return Err(ProfileError::Invalid {
                reason: format!(
                    "idle_rpm {} must lie in [{}, {}]",
                    self.idle_rpm, self.rpm_floor, self.idle_band_max
                ),
            });
        }
        if self.idle_band_max > self.redline {
            return Err(ProfileError::Invalid {
                reason: format!(
                    "idle_band_max {} exceeds redline {}",
                    self.idle_band_max, self.redline
                ),
            });
        }

        if self.gear1_target <= self.first_shift_floor || self.gear1_target > self.redline {
            return Err(ProfileError::Invalid {
                reason: format!(
                    "gear1_target {} must lie in ({}, {}]",
                    self.gear1_target, self.first_shift_floor, self.redline
                ),
            });
        }
        if self.gear2_target_range.lo <= self.second_shift_floor
            || self.gear2_target_range.hi > self.redline
        {
            return Err(ProfileError::Invalid {
                reason: format!(
                    "gear2_target_range [{}, {}] must lie in ({}, {}]",
                    self.gear2_target_range.lo,
                    self.gear2_target_range.hi,
                    self.second_shift_floor,
                    self.redline
                ),
            });
        }
        for (name, floor) in [
            ("first_shift_floor", self.first_shift_floor),
            ("second_shift_floor", self.second_shift_floor),
        ] {
            if floor <= self.rpm_floor || floor >= self.redline {
                return Err(ProfileError::Invalid {
                    reason: format!(
                        "{name} {} must lie in ({}, {})",
                        floor, self.rpm_floor, self.redline
                    ),
                });
            }
        }
        if self.redline.saturating_sub(self.bounce_offset.hi) < self.rpm_floor {
            return Err(ProfileError::Invalid {
                reason: format!(
                    "bounce_offset hi {} pulls the signal below rpm_floor {}",
                    self.bounce_offset.hi, self.rpm_floor
                ),
            });
        }

        for (name, ticks) in [
            ("idle_hold_ticks", self.idle_hold_ticks),
            ("settle_ticks", self.settle_ticks),
            ("bounce_ticks", self.bounce_ticks),
        ] {
            if ticks == 0 {
                return Err(ProfileError::Invalid {
                    reason: format!("{name} must be at least 1"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn default_profile_is_valid() {
        assert!(PullProfile::default().validate().is_ok());
    }

    #[test]
    fn sample_stays_inside_range() {
        let range = StepRange::new(120, 200);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..500 {
            let step = range.sample(&mut rng);
            assert!((120..=200).contains(&step));
        }
    }

    #[test]
    fn empty_step_range_is_rejected() {
        let profile = PullProfile {
            gear1_step: StepRange::new(200, 120),
            ..PullProfile::default()
        };
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("gear1_step"));
    }

    #[test]
    fn floor_above_redline_is_rejected() {
        let profile = PullProfile {
            rpm_floor: 7000,
            ..PullProfile::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn idle_outside_band_is_rejected() {
        let profile = PullProfile {
            idle_rpm: 1200,
            ..PullProfile::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn gear2_range_below_shift_floor_is_rejected() {
        let profile = PullProfile {
            gear2_target_range: StepRange::new(2000, 4500),
            ..PullProfile::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn zero_tick_phase_is_rejected() {
        let profile = PullProfile {
            settle_ticks: 0,
            ..PullProfile::default()
        };
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("settle_ticks"));
    }
}
