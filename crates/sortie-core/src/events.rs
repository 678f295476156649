//! Tick events and the per-tick summary.
//!
//! Everything notable that happens inside a tick is reported as a
//! [`TickEvent`] rather than as an error. Events are collected in store
//! iteration order, so two runs with identical inputs produce identical
//! summaries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityKey};

/// A cross-entity reference that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "id")]
pub enum Reference {
    /// Home base id on the owner's side.
    HomeBase(EntityId),
    /// Pursuit target.
    Target(EntityKey),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HomeBase(id) => write!(f, "home base {id}"),
            Self::Target(key) => write!(f, "target {key}"),
        }
    }
}

/// Why an entity left the scenario.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RemovalReason {
    /// Ran out of fuel under [`FuelExhaustionPolicy::Remove`](crate::config::FuelExhaustionPolicy::Remove).
    FuelExhausted,
    /// Removed by an explicit call.
    Deleted,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum TickEvent {
    /// Fuel reached zero away from a base.
    FuelExhausted {
        /// The aircraft.
        key: EntityKey,
    },
    /// A return-to-base was completed.
    ArrivedAtBase {
        /// The aircraft.
        key: EntityKey,
        /// The base it arrived at.
        base: EntityId,
    },
    /// Pure pursuit closed on the target.
    TargetReached {
        /// The pursuing aircraft.
        key: EntityKey,
        /// The target.
        target: EntityKey,
    },
    /// A route waypoint was reached.
    WaypointReached {
        /// The aircraft.
        key: EntityKey,
        /// Waypoints still to fly.
        remaining: usize,
    },
    /// Return-to-base was active but no home base was set.
    NoHomeBase {
        /// The aircraft whose directive was cancelled.
        key: EntityKey,
    },
    /// A stored reference no longer resolves; it was cleared and the directive
    /// depending on it cancelled.
    DanglingReference {
        /// The entity holding the reference.
        owner: EntityKey,
        /// The reference that was cleared.
        reference: Reference,
    },
    /// An entity left the scenario.
    EntityRemoved {
        /// The removed entity.
        key: EntityKey,
        /// Why.
        reason: RemovalReason,
    },
    /// The clock reached the scenario end during this tick.
    ScenarioEnded {
        /// The end timestamp, epoch seconds.
        at: f64,
    },
}

/// Result of one [`Scenario::tick`](crate::Scenario::tick).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSummary {
    /// Simulated seconds that elapsed.
    pub simulated_seconds: f64,
    /// Current time after the tick, epoch seconds.
    pub current_time: f64,
    /// Events in deterministic order.
    pub events: Vec<TickEvent>,
}

impl TickSummary {
    /// Returns `true` if this tick crossed the scenario end.
    #[must_use]
    pub fn scenario_ended(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, TickEvent::ScenarioEnded { .. }))
    }

    /// Keys of entities removed during the tick.
    pub fn removed(&self) -> impl Iterator<Item = &EntityKey> + '_ {
        self.events.iter().filter_map(|event| match event {
            TickEvent::EntityRemoved { key, .. } => Some(key),
            _ => None,
        })
    }
}
