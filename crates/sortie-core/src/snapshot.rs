//! Serializable image of a whole scenario.
//!
//! A [`ScenarioSnapshot`] carries every field of the scenario, its sides and
//! its entities, so `Scenario::from_snapshot(scenario.snapshot(), settings)`
//! reproduces the scenario exactly. Simulation settings are not part of the
//! snapshot; they belong to whoever runs it.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::store::Side;

/// One side and its entities, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSnapshot {
    /// The side record.
    #[serde(flatten)]
    pub side: Side,
    /// Entities of the side.
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// Full scenario state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSnapshot {
    /// Scenario identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Start timestamp, epoch seconds.
    pub start_time: f64,
    /// Current timestamp, epoch seconds.
    pub current_time: f64,
    /// Scenario length in seconds.
    pub duration_seconds: f64,
    /// Simulated seconds per wall second.
    pub time_compression: f64,
    /// Clock paused.
    #[serde(default)]
    pub paused: bool,
    /// Sides in creation order.
    #[serde(default)]
    pub sides: Vec<SideSnapshot>,
}

impl ScenarioSnapshot {
    /// Total number of entities across all sides.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.sides.iter().map(|side| side.entities.len()).sum()
    }
}
