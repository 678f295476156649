//! Scenario clock with time compression.
//!
//! The clock converts wall-clock seconds supplied by the external driver into
//! simulated seconds and keeps the current time inside the scenario bounds.
//! Advancing is split in two so a tick can compute everything first and only
//! then mutate:
//!
//! 1. [`Clock::advance`] computes a [`ClockStep`] without touching the clock.
//! 2. [`Clock::commit`] applies the step.
//!
//! # Example
//!
//! ```
//! use sortie_core::clock::Clock;
//!
//! let mut clock = Clock::new(0.0, 0.0, 100.0, 2.0).unwrap();
//! let step = clock.advance(10.0).unwrap();
//! assert_eq!(step.delta, 20.0);
//!
//! clock.commit(&step);
//! assert_eq!(clock.current_time(), 20.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};

/// Outcome of [`Clock::advance`]: the simulated delta to apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockStep {
    /// Simulated seconds, already clamped to the scenario end.
    pub delta: f64,
    /// Current time after the step is committed.
    pub new_time: f64,
    /// This step takes the clock onto the scenario end for the first time
    /// since the bound was last crossed.
    pub reaches_end: bool,
}

/// Simulation clock owned by a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    start_time: f64,
    current_time: f64,
    duration: f64,
    compression: f64,
    paused: bool,
    /// Latched once the end bound has been reported.
    ended: bool,
}

impl Clock {
    /// Creates a clock.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidArgument`] if any value is non-finite,
    /// `duration <= 0`, `compression <= 0`, or `current_time` lies outside
    /// `[start_time, start_time + duration]`.
    pub fn new(start_time: f64, current_time: f64, duration: f64, compression: f64) -> Result<Self> {
        if !start_time.is_finite() || !current_time.is_finite() {
            return Err(ScenarioError::InvalidArgument(
                "start and current time must be finite".into(),
            ));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(ScenarioError::InvalidArgument(format!(
                "duration {duration} s must be > 0"
            )));
        }
        validate_compression(compression)?;
        let end_time = start_time + duration;
        if !(start_time..=end_time).contains(&current_time) {
            return Err(ScenarioError::InvalidArgument(format!(
                "current time {current_time} is outside [{start_time}, {end_time}]"
            )));
        }
        Ok(Self {
            start_time,
            current_time,
            duration,
            compression,
            paused: false,
            ended: current_time >= end_time,
        })
    }

    /// Computes the step for `wall_seconds` of elapsed real time.
    ///
    /// A paused or already-ended clock yields a zero delta.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidArgument`] if `wall_seconds` is negative or
    /// non-finite.
    pub fn advance(&self, wall_seconds: f64) -> Result<ClockStep> {
        if !(wall_seconds.is_finite() && wall_seconds >= 0.0) {
            return Err(ScenarioError::InvalidArgument(format!(
                "wall time {wall_seconds} s must be finite and >= 0"
            )));
        }
        let end_time = self.end_time();
        let requested = if self.paused {
            0.0
        } else {
            wall_seconds * self.compression
        };
        let new_time = (self.current_time + requested).min(end_time);
        Ok(ClockStep {
            delta: new_time - self.current_time,
            new_time,
            reaches_end: !self.ended && new_time >= end_time,
        })
    }

    /// Applies a step produced by [`Clock::advance`].
    pub fn commit(&mut self, step: &ClockStep) {
        // Never move backward, never past the end.
        self.current_time = step.new_time.clamp(self.current_time, self.end_time());
        if step.reaches_end {
            self.ended = true;
        }
    }

    /// Changes the time compression factor.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidArgument`] if `factor` is not a positive finite
    /// number; the clock is left unchanged.
    pub fn set_compression(&mut self, factor: f64) -> Result<()> {
        validate_compression(factor)?;
        self.compression = factor;
        Ok(())
    }

    /// Stops time; subsequent steps have a zero delta.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restarts time after [`Clock::pause`].
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Returns `true` while paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns `true` once the current time has reached the scenario end.
    #[must_use]
    pub const fn has_ended(&self) -> bool {
        self.ended
    }

    /// Scenario start, epoch seconds.
    #[must_use]
    pub const fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Current simulated time, epoch seconds.
    #[must_use]
    pub const fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Scenario length in seconds.
    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Scenario end, epoch seconds.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Simulated seconds per wall second.
    #[must_use]
    pub const fn compression(&self) -> f64 {
        self.compression
    }

    /// Seconds elapsed since the start.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.current_time - self.start_time
    }
}

fn validate_compression(factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(ScenarioError::InvalidArgument(format!(
            "time compression {factor} must be > 0"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(compression: f64) -> Clock {
        Clock::new(1000.0, 1000.0, 100.0, compression).unwrap()
    }

    fn tick(clock: &mut Clock, wall: f64) -> ClockStep {
        let step = clock.advance(wall).unwrap();
        clock.commit(&step);
        step
    }

    mod creation_tests {
        use super::*;

        #[test]
        fn starts_at_current_time() {
            let clock = clock(1.0);
            assert_eq!(clock.current_time(), clock.start_time());
            assert_eq!(clock.end_time(), 1100.0);
            assert!(!clock.has_ended());
            assert!(!clock.is_paused());
        }

        #[test]
        fn rejects_non_positive_duration() {
            assert!(Clock::new(0.0, 0.0, 0.0, 1.0).is_err());
            assert!(Clock::new(0.0, 0.0, -5.0, 1.0).is_err());
        }

        #[test]
        fn rejects_non_positive_compression() {
            assert!(Clock::new(0.0, 0.0, 10.0, 0.0).is_err());
            assert!(Clock::new(0.0, 0.0, 10.0, -1.0).is_err());
            assert!(Clock::new(0.0, 0.0, 10.0, f64::NAN).is_err());
        }

        #[test]
        fn rejects_current_time_out_of_bounds() {
            assert!(Clock::new(0.0, -1.0, 10.0, 1.0).is_err());
            assert!(Clock::new(0.0, 11.0, 10.0, 1.0).is_err());
        }

        #[test]
        fn created_at_end_is_already_ended() {
            let clock = Clock::new(0.0, 10.0, 10.0, 1.0).unwrap();
            assert!(clock.has_ended());
            assert!(!clock.advance(5.0).unwrap().reaches_end);
        }
    }

    mod advance_tests {
        use super::*;

        #[test]
        fn compression_scales_delta() {
            let mut clock = clock(2.0);
            let step = tick(&mut clock, 10.0);
            assert_eq!(step.delta, 20.0);
            assert_eq!(clock.current_time(), 1020.0);
        }

        #[test]
        fn advance_does_not_mutate() {
            let clock = clock(1.0);
            let _ = clock.advance(10.0).unwrap();
            assert_eq!(clock.current_time(), 1000.0);
        }

        #[test]
        fn zero_wall_time_is_zero_delta() {
            let mut clock = clock(3.0);
            let step = tick(&mut clock, 0.0);
            assert_eq!(step.delta, 0.0);
            assert_eq!(clock.current_time(), 1000.0);
        }

        #[test]
        fn rejects_negative_and_nan_wall_time() {
            let clock = clock(1.0);
            assert!(clock.advance(-1.0).is_err());
            assert!(clock.advance(f64::NAN).is_err());
            assert!(clock.advance(f64::INFINITY).is_err());
        }

        #[test]
        fn clamps_at_end_and_reports_once() {
            let mut clock = clock(1.0);
            assert!(!tick(&mut clock, 60.0).reaches_end);

            let crossing = tick(&mut clock, 60.0);
            assert!(crossing.reaches_end);
            assert_eq!(crossing.delta, 40.0);
            assert_eq!(clock.current_time(), 1100.0);
            assert!(clock.has_ended());

            let after = tick(&mut clock, 60.0);
            assert!(!after.reaches_end);
            assert_eq!(after.delta, 0.0);
            assert_eq!(clock.current_time(), 1100.0);
        }

        #[test]
        fn landing_exactly_on_end_reports() {
            let mut clock = clock(1.0);
            assert!(tick(&mut clock, 100.0).reaches_end);
        }

        #[test]
        fn paused_clock_does_not_advance() {
            let mut clock = clock(1.0);
            clock.pause();
            assert_eq!(tick(&mut clock, 50.0).delta, 0.0);
            clock.resume();
            assert_eq!(tick(&mut clock, 50.0).delta, 50.0);
        }
    }

    mod compression_tests {
        use super::*;

        #[test]
        fn set_compression_applies() {
            let mut clock = clock(1.0);
            clock.set_compression(4.0).unwrap();
            assert_eq!(clock.compression(), 4.0);
            assert_eq!(clock.advance(1.0).unwrap().delta, 4.0);
        }

        #[test]
        fn invalid_compression_leaves_clock_unchanged() {
            let mut clock = clock(2.0);
            assert!(matches!(
                clock.set_compression(0.0),
                Err(ScenarioError::InvalidArgument(_))
            ));
            assert!(clock.set_compression(-3.0).is_err());
            assert_eq!(clock.compression(), 2.0);
        }
    }
}
