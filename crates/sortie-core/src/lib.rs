//! # Sortie Core
//!
//! Scenario simulation core for Sortie.
//!
//! This crate holds the authoritative state of an air-operations scenario and
//! advances it in discrete, externally driven ticks.
//!
//! ## Architecture
//!
//! - **Clock**: current time, duration bound and time compression
//! - **Entity store**: aircraft, airbases and ships partitioned by side
//! - **Kinematics**: pure per-entity update for fuel, navigation and movement
//! - **Scenario**: owns the above and runs the tick phases
//!
//! ## Usage
//!
//! ```
//! use sortie_core::{Aircraft, Scenario, ScenarioConfig};
//!
//! let mut scenario = Scenario::new(ScenarioConfig::new("s1", "Strait", 0.0, 3600.0))?;
//! scenario.add_aircraft(Aircraft::new("viper-1", "blue", 24.5, 121.0).with_motion(90.0, 450.0))?;
//!
//! let summary = scenario.tick(1.0)?;
//! assert_eq!(summary.simulated_seconds, 1.0);
//! # Ok::<(), sortie_core::ScenarioError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod geo;
pub mod kinematics;
pub mod scenario;
pub mod snapshot;
pub mod store;

pub use clock::{Clock, ClockStep};
pub use config::{FuelExhaustionPolicy, ScenarioConfig, SimulationSettings};
pub use entity::{
    Aircraft, AircraftStatus, Airbase, Entity, EntityId, EntityKey, EntityTag, GeoPosition, Ship,
    ShipStatus, SideId, Waypoint,
};
pub use error::{Result, ScenarioError};
pub use events::{Reference, RemovalReason, TickEvent, TickSummary};
pub use scenario::Scenario;
pub use snapshot::{ScenarioSnapshot, SideSnapshot};
pub use store::{EntityStore, Side, Visit};

#[cfg(test)]
mod tests;
