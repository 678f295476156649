//! Scenario construction parameters and simulation settings.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};

/// Construction parameters of a scenario.
///
/// All fields are required. `id`, `name`, `start_time` and `duration_seconds`
/// are fixed for the lifetime of the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    /// Scenario identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Start timestamp, epoch seconds.
    pub start_time: f64,
    /// Current timestamp, epoch seconds. Must lie within the scenario bounds.
    pub current_time: f64,
    /// Scenario length in seconds, `> 0`.
    pub duration_seconds: f64,
    /// Simulated seconds per wall-clock second, `> 0`.
    pub time_compression: f64,
}

impl ScenarioConfig {
    /// Creates a config starting at `start_time` with compression 1.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_time: f64,
        duration_seconds: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_time,
            current_time: start_time,
            duration_seconds,
            time_compression: 1.0,
        }
    }

    /// Sets the time compression factor.
    #[must_use]
    pub fn with_time_compression(mut self, time_compression: f64) -> Self {
        self.time_compression = time_compression;
        self
    }
}

/// What happens to an aircraft whose tank runs dry away from a base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "policy")]
pub enum FuelExhaustionPolicy {
    /// The aircraft is removed from the scenario at the end of the tick.
    #[default]
    Remove,
    /// The aircraft stops where it is.
    Freeze,
    /// The aircraft keeps its heading while its speed decays to zero.
    #[serde(rename_all = "camelCase")]
    Coast {
        /// Speed lost per simulated second, knots.
        deceleration_knots_per_second: f64,
    },
}

/// Tunables of the kinematics and logistics update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationSettings {
    /// Behaviour on fuel exhaustion.
    pub fuel_exhaustion: FuelExhaustionPolicy,
    /// Radius around a destination that counts as arrival, metres.
    pub arrival_tolerance_m: f64,
    /// Entity count from which the per-entity pass runs on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            fuel_exhaustion: FuelExhaustionPolicy::Remove,
            arrival_tolerance_m: 500.0,
            parallel_threshold: 64,
        }
    }
}

impl SimulationSettings {
    /// Sets the fuel exhaustion policy.
    #[must_use]
    pub fn with_fuel_exhaustion(mut self, policy: FuelExhaustionPolicy) -> Self {
        self.fuel_exhaustion = policy;
        self
    }

    /// Sets the arrival tolerance in metres.
    #[must_use]
    pub fn with_arrival_tolerance(mut self, metres: f64) -> Self {
        self.arrival_tolerance_m = metres;
        self
    }

    /// Sets the entity count from which ticks run in parallel.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::InvalidArgument`] for a negative or non-finite
    /// tolerance or a non-positive coasting deceleration.
    pub fn validate(&self) -> Result<()> {
        if !(self.arrival_tolerance_m.is_finite() && self.arrival_tolerance_m >= 0.0) {
            return Err(ScenarioError::InvalidArgument(format!(
                "arrival tolerance {} m must be >= 0",
                self.arrival_tolerance_m
            )));
        }
        if let FuelExhaustionPolicy::Coast {
            deceleration_knots_per_second,
        } = self.fuel_exhaustion
        {
            if !(deceleration_knots_per_second.is_finite() && deceleration_knots_per_second > 0.0)
            {
                return Err(ScenarioError::InvalidArgument(format!(
                    "coast deceleration {deceleration_knots_per_second} kt/s must be > 0"
                )));
            }
        }
        Ok(())
    }
}
