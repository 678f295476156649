//! The scenario aggregate and its tick loop.
//!
//! A [`Scenario`] owns the clock, the entity store and the simulation
//! settings. Every mutation goes through `&mut Scenario`, either in an explicit
//! order or in [`Scenario::tick`].
//!
//! # Tick phases
//!
//! 1. **CLOCK**: compute the simulated delta without committing it
//! 2. **UPDATE**: compute every entity's next state from the frozen store,
//!    on the rayon pool once the entity count reaches the parallel threshold
//! 3. **COMMIT**: write the next states back in store order, drop removed
//!    entities and clear references to them
//! 4. **ADVANCE**: commit the clock step
//!
//! Nothing is mutated before phase 3, so a tick that fails validation leaves
//! the scenario untouched. A zero delta (zero wall time, paused or ended clock)
//! skips phases 2 and 3 entirely.
//!
//! # Example
//!
//! ```
//! use sortie_core::{Aircraft, Airbase, Scenario, ScenarioConfig};
//!
//! let mut scenario = Scenario::new(ScenarioConfig::new("s1", "Strait", 0.0, 3600.0)).unwrap();
//! scenario.add_airbase(Airbase::new("home", "blue", 0.0, 1.0)).unwrap();
//! scenario
//!     .add_aircraft(
//!         Aircraft::new("viper-1", "blue", 0.0, 0.0)
//!             .with_motion(90.0, 600.0)
//!             .with_home_base("home", true),
//!     )
//!     .unwrap();
//!
//! for _ in 0..20 {
//!     scenario.tick(60.0).unwrap();
//! }
//!
//! let viper = scenario.get_aircraft_by_id_and_side_id("blue", "viper-1").unwrap();
//! assert!(viper.is_at_base());
//! assert!(!viper.return_to_base);
//! ```

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{ScenarioConfig, SimulationSettings};
use crate::entity::{Aircraft, AircraftStatus, Airbase, Entity, EntityKey, Ship, Waypoint};
use crate::error::{Result, ScenarioError};
use crate::events::{RemovalReason, TickEvent, TickSummary};
use crate::geo;
use crate::kinematics::{update_entity, EntityUpdate, UpdateContext};
use crate::snapshot::{ScenarioSnapshot, SideSnapshot};
use crate::store::{EntityStore, Side, Visit};

/// A running scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    id: String,
    name: String,
    clock: Clock,
    store: EntityStore,
    settings: SimulationSettings,
}

impl Scenario {
    /// Creates an empty scenario with default settings.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidArgument`] if the clock parameters are invalid.
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        Self::with_settings(config, SimulationSettings::default())
    }

    /// Creates an empty scenario.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidArgument`] if the clock parameters or the
    /// settings are invalid.
    pub fn with_settings(config: ScenarioConfig, settings: SimulationSettings) -> Result<Self> {
        settings.validate()?;
        let clock = Clock::new(
            config.start_time,
            config.current_time,
            config.duration_seconds,
            config.time_compression,
        )?;
        info!(
            scenario = %config.id,
            start = config.start_time,
            duration = config.duration_seconds,
            "scenario created"
        );
        Ok(Self {
            id: config.id,
            name: config.name,
            clock,
            store: EntityStore::new(),
            settings,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Scenario identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The clock.
    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Current simulated time, epoch seconds.
    #[must_use]
    pub const fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// The entity store.
    #[must_use]
    pub const fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Simulation settings.
    #[must_use]
    pub const fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    // =========================================================================
    // Population
    // =========================================================================

    /// Registers a side explicitly.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::DuplicateSide`] if the id is taken.
    pub fn add_side(&mut self, side: Side) -> Result<()> {
        self.store.add_side(side)
    }

    /// Validates and inserts an aircraft, returning its key.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidEntity`] when a field is out of range,
    /// [`ScenarioError::DuplicateEntity`] when `(side, id)` is taken.
    pub fn add_aircraft(&mut self, aircraft: Aircraft) -> Result<EntityKey> {
        self.add_entity(Entity::Aircraft(aircraft))
    }

    /// Validates and inserts an airbase, returning its key.
    ///
    /// # Errors
    ///
    /// Same as [`Scenario::add_aircraft`].
    pub fn add_airbase(&mut self, airbase: Airbase) -> Result<EntityKey> {
        self.add_entity(Entity::Airbase(airbase))
    }

    /// Validates and inserts a ship, returning its key.
    ///
    /// # Errors
    ///
    /// Same as [`Scenario::add_aircraft`].
    pub fn add_ship(&mut self, ship: Ship) -> Result<EntityKey> {
        self.add_entity(Entity::Ship(ship))
    }

    /// Validates and inserts any entity, returning its key.
    ///
    /// # Errors
    ///
    /// Same as [`Scenario::add_aircraft`].
    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityKey> {
        let key = entity.key();
        entity
            .validate()
            .map_err(|reason| ScenarioError::InvalidEntity {
                key: key.clone(),
                reason,
            })?;
        self.store.add(entity)?;
        debug!(entity = %key, "entity added");
        Ok(key)
    }

    /// Looks up an aircraft. Unknown keys and non-aircraft entities yield
    /// `None`.
    #[must_use]
    pub fn get_aircraft_by_id_and_side_id(&self, side_id: &str, id: &str) -> Option<&Aircraft> {
        self.store.get(side_id, id).and_then(Entity::as_aircraft)
    }

    /// Looks up a ship. Unknown keys and non-ship entities yield `None`.
    #[must_use]
    pub fn get_ship_by_id_and_side_id(&self, side_id: &str, id: &str) -> Option<&Ship> {
        self.store.get(side_id, id).and_then(Entity::as_ship)
    }

    /// Looks up an entity of any kind.
    #[must_use]
    pub fn get_entity(&self, side_id: &str, id: &str) -> Option<&Entity> {
        self.store.get(side_id, id)
    }

    /// Removes an entity and clears every reference to it.
    ///
    /// Aircraft targeting the removed entity lose their target; aircraft whose
    /// home base it was lose the home base and their return-to-base order.
    /// Returns `None` if nothing was removed.
    pub fn remove_entity(&mut self, side_id: &str, id: &str) -> Option<Entity> {
        let removed = self.store.remove(side_id, id)?;
        let key = removed.key();
        let cleared = clear_references_to(&mut self.store, &key);
        info!(entity = %key, reason = ?RemovalReason::Deleted, cleared, "entity removed");
        Some(removed)
    }

    // =========================================================================
    // Clock control
    // =========================================================================

    /// Changes the time compression factor.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidArgument`] if `factor` is not positive and
    /// finite.
    pub fn set_time_compression(&mut self, factor: f64) -> Result<()> {
        self.clock.set_compression(factor)
    }

    /// Pauses the clock; ticks advance nothing until [`Scenario::resume`].
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Resumes the clock.
    pub fn resume(&mut self) {
        self.clock.resume();
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Toggles the return-to-base directive and returns the new state.
    ///
    /// Enabling it on an aircraft without a resolvable home base assigns the
    /// closest airbase of its own side. Cancelling it also drops the route,
    /// so the aircraft holds its heading instead of resuming an old leg.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::NotFound`] for an unknown aircraft,
    /// [`ScenarioError::NoBaseAvailable`] when enabling and its side has no
    /// airbase.
    pub fn order_return_to_base(&mut self, side_id: &str, id: &str) -> Result<bool> {
        let aircraft = self.aircraft(side_id, id)?;
        if aircraft.return_to_base {
            let aircraft = self.aircraft_mut(side_id, id)?;
            aircraft.return_to_base = false;
            aircraft.route.clear();
            return Ok(false);
        }

        let home_resolves = aircraft
            .home_base_id
            .as_ref()
            .is_some_and(|base| self.store.contains(side_id, base.as_str()));
        let home = if home_resolves {
            aircraft.home_base_id.clone()
        } else {
            let position = aircraft.position();
            let closest = self
                .store
                .iter_side(side_id)
                .filter_map(Entity::as_airbase)
                .min_by(|a, b| {
                    geo::distance_m(&position, &a.position())
                        .total_cmp(&geo::distance_m(&position, &b.position()))
                })
                .map(|base| base.id.clone());
            if closest.is_none() {
                return Err(ScenarioError::NoBaseAvailable(EntityKey::new(side_id, id)));
            }
            closest
        };

        let aircraft = self.aircraft_mut(side_id, id)?;
        aircraft.home_base_id = home;
        aircraft.return_to_base = true;
        aircraft.status.remove(AircraftStatus::AT_BASE);
        Ok(true)
    }

    /// Orders pure pursuit of `target`.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::NotFound`] if the aircraft or the target is unknown,
    /// [`ScenarioError::InvalidArgument`] if the target is the aircraft itself
    /// or on its side.
    pub fn order_pursuit(&mut self, side_id: &str, id: &str, target: EntityKey) -> Result<()> {
        self.aircraft(side_id, id)?;
        if !self.store.contains(target.side_id.as_str(), target.id.as_str()) {
            return Err(ScenarioError::NotFound(target));
        }
        if target.side_id.as_str() == side_id {
            return Err(ScenarioError::InvalidArgument(format!(
                "{side_id}/{id} cannot pursue {target} on its own side"
            )));
        }
        let aircraft = self.aircraft_mut(side_id, id)?;
        aircraft.target_id = Some(target);
        aircraft.status.remove(AircraftStatus::AT_BASE);
        Ok(())
    }

    /// Drops the pursuit target.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::NotFound`] for an unknown aircraft.
    pub fn clear_target(&mut self, side_id: &str, id: &str) -> Result<()> {
        self.aircraft_mut(side_id, id)?.target_id = None;
        Ok(())
    }

    /// Replaces the route of an aircraft or a ship. An empty route clears it.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::NotFound`] unless `(side_id, id)` is an aircraft or a
    /// ship, [`ScenarioError::InvalidArgument`] for an out-of-range waypoint.
    pub fn order_route(&mut self, side_id: &str, id: &str, route: Vec<Waypoint>) -> Result<()> {
        if let Some(bad) = route.iter().find(|waypoint| !waypoint.is_valid()) {
            return Err(ScenarioError::InvalidArgument(format!(
                "waypoint ({}, {}) is out of range",
                bad.latitude, bad.longitude
            )));
        }
        match self.store.get_mut(side_id, id) {
            Some(Entity::Aircraft(aircraft)) => {
                if !route.is_empty() {
                    aircraft.status.remove(AircraftStatus::AT_BASE);
                }
                aircraft.route = route;
            }
            Some(Entity::Ship(ship)) => ship.route = route,
            Some(Entity::Airbase(_)) | None => {
                return Err(ScenarioError::NotFound(EntityKey::new(side_id, id)));
            }
        }
        Ok(())
    }

    /// Sets the speed of an aircraft or a ship in knots.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::NotFound`] unless `(side_id, id)` is an aircraft or a
    /// ship,
    /// [`ScenarioError::InvalidArgument`] for a negative or non-finite speed.
    pub fn set_speed(&mut self, side_id: &str, id: &str, speed_knots: f64) -> Result<()> {
        if !(speed_knots.is_finite() && speed_knots >= 0.0) {
            return Err(ScenarioError::InvalidArgument(format!(
                "speed {speed_knots} kt must be >= 0"
            )));
        }
        match self.store.get_mut(side_id, id) {
            Some(Entity::Aircraft(aircraft)) => {
                aircraft.speed_knots = speed_knots;
                if speed_knots > 0.0 {
                    aircraft.status.remove(AircraftStatus::AT_BASE);
                }
            }
            Some(Entity::Ship(ship)) => ship.speed_knots = speed_knots,
            Some(Entity::Airbase(_)) | None => {
                return Err(ScenarioError::NotFound(EntityKey::new(side_id, id)));
            }
        }
        Ok(())
    }

    fn aircraft(&self, side_id: &str, id: &str) -> Result<&Aircraft> {
        self.get_aircraft_by_id_and_side_id(side_id, id)
            .ok_or_else(|| ScenarioError::NotFound(EntityKey::new(side_id, id)))
    }

    fn aircraft_mut(&mut self, side_id: &str, id: &str) -> Result<&mut Aircraft> {
        self.store
            .get_mut(side_id, id)
            .and_then(Entity::as_aircraft_mut)
            .ok_or_else(|| ScenarioError::NotFound(EntityKey::new(side_id, id)))
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the scenario by `wall_seconds` of real time.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::InvalidArgument`] for a negative or non-finite
    /// `wall_seconds`; the scenario is left unchanged.
    pub fn tick(&mut self, wall_seconds: f64) -> Result<TickSummary> {
        // PHASE 1: CLOCK
        let step = self.clock.advance(wall_seconds)?;
        let mut events = Vec::new();

        if step.delta > 0.0 {
            // PHASE 2: UPDATE
            let updates = self.compute_updates(step.delta);
            // PHASE 3: COMMIT
            self.commit_updates(updates, &mut events);
        }

        // PHASE 4: ADVANCE
        self.clock.commit(&step);
        if step.reaches_end {
            info!(scenario = %self.id, at = self.clock.end_time(), "scenario ended");
            events.push(TickEvent::ScenarioEnded {
                at: self.clock.end_time(),
            });
        }

        debug!(
            scenario = %self.id,
            delta = step.delta,
            entities = self.store.len(),
            events = events.len(),
            "tick"
        );
        Ok(TickSummary {
            simulated_seconds: step.delta,
            current_time: self.clock.current_time(),
            events,
        })
    }

    /// Computes every entity's next state against the current store.
    ///
    /// Results come back in store order whichever path runs.
    fn compute_updates(&self, dt: f64) -> Vec<EntityUpdate> {
        let ctx = UpdateContext {
            dt,
            world: &self.store,
            settings: &self.settings,
        };
        let entities: Vec<&Entity> = self.store.iter().collect();
        if entities.len() >= self.settings.parallel_threshold {
            entities
                .par_iter()
                .map(|entity| update_entity(entity, &ctx))
                .collect()
        } else {
            entities
                .iter()
                .map(|entity| update_entity(entity, &ctx))
                .collect()
        }
    }

    fn commit_updates(&mut self, updates: Vec<EntityUpdate>, events: &mut Vec<TickEvent>) {
        let mut updates = updates.into_iter();
        let mut removals = Vec::new();

        self.store.for_each_entity_mut(|entity| {
            let Some(update) = updates.next() else {
                return Visit::Keep;
            };
            for event in &update.events {
                if let TickEvent::DanglingReference { owner, reference } = event {
                    warn!(entity = %owner, %reference, "reference no longer resolves; cleared");
                }
            }
            events.extend(update.events);
            *entity = update.entity;
            match update.removal {
                Some(reason) => {
                    removals.push((entity.key(), reason));
                    Visit::Remove
                }
                None => Visit::Keep,
            }
        });

        self.store.flush_removals();
        for (key, reason) in removals {
            let cleared = clear_references_to(&mut self.store, &key);
            info!(entity = %key, ?reason, cleared, "entity removed");
            events.push(TickEvent::EntityRemoved { key, reason });
        }
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Captures the full scenario state.
    #[must_use]
    pub fn snapshot(&self) -> ScenarioSnapshot {
        let sides = self
            .store
            .sides()
            .iter()
            .map(|side| SideSnapshot {
                side: side.clone(),
                entities: self.store.iter_side(side.id.as_str()).cloned().collect(),
            })
            .collect();
        ScenarioSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            start_time: self.clock.start_time(),
            current_time: self.clock.current_time(),
            duration_seconds: self.clock.duration(),
            time_compression: self.clock.compression(),
            paused: self.clock.is_paused(),
            sides,
        }
    }

    /// Rebuilds a scenario from a snapshot.
    ///
    /// # Errors
    ///
    /// Any error [`Scenario::with_settings`], [`Scenario::add_side`] or
    /// [`Scenario::add_entity`] would raise, plus
    /// [`ScenarioError::InvalidEntity`] for an entity listed under a side other
    /// than its own.
    pub fn from_snapshot(snapshot: ScenarioSnapshot, settings: SimulationSettings) -> Result<Self> {
        let config = ScenarioConfig {
            id: snapshot.id,
            name: snapshot.name,
            start_time: snapshot.start_time,
            current_time: snapshot.current_time,
            duration_seconds: snapshot.duration_seconds,
            time_compression: snapshot.time_compression,
        };
        let mut scenario = Self::with_settings(config, settings)?;
        if snapshot.paused {
            scenario.pause();
        }
        for SideSnapshot { side, entities } in snapshot.sides {
            let side_id = side.id.clone();
            scenario.add_side(side)?;
            for entity in entities {
                if entity.side_id() != &side_id {
                    return Err(ScenarioError::InvalidEntity {
                        key: entity.key(),
                        reason: format!("listed under side {side_id}"),
                    });
                }
                scenario.add_entity(entity)?;
            }
        }
        Ok(scenario)
    }
}

/// Clears every aircraft reference to `removed`. Returns how many aircraft
/// were touched.
fn clear_references_to(store: &mut EntityStore, removed: &EntityKey) -> usize {
    let mut cleared = 0;
    store.for_each_entity_mut(|entity| {
        let Some(aircraft) = entity.as_aircraft_mut() else {
            return Visit::Keep;
        };
        let mut touched = false;
        if aircraft.target_id.as_ref() == Some(removed) {
            aircraft.target_id = None;
            touched = true;
        }
        if aircraft.side_id == removed.side_id && aircraft.home_base_id.as_ref() == Some(&removed.id)
        {
            aircraft.home_base_id = None;
            aircraft.return_to_base = false;
            touched = true;
        }
        cleared += usize::from(touched);
        Visit::Keep
    });
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        Scenario::new(ScenarioConfig::new("s1", "Test", 0.0, 3600.0)).unwrap()
    }

    mod creation_tests {
        use super::*;

        #[test]
        fn new_scenario_is_empty_at_start() {
            let scenario = scenario();
            assert_eq!(scenario.current_time(), scenario.clock().start_time());
            assert!(scenario.store().is_empty());
            assert_eq!(scenario.id(), "s1");
            assert_eq!(scenario.name(), "Test");
        }

        #[test]
        fn invalid_clock_is_rejected() {
            let config = ScenarioConfig::new("s", "s", 0.0, 0.0);
            assert!(matches!(
                Scenario::new(config),
                Err(ScenarioError::InvalidArgument(_))
            ));
        }

        #[test]
        fn invalid_settings_are_rejected() {
            let settings = SimulationSettings::default().with_arrival_tolerance(f64::NAN);
            let config = ScenarioConfig::new("s", "s", 0.0, 10.0);
            assert!(Scenario::with_settings(config, settings).is_err());
        }
    }

    mod population_tests {
        use super::*;

        #[test]
        fn add_then_get_returns_equal_record() {
            let mut scenario = scenario();
            let aircraft = Aircraft::new("a", "blue", 10.0, 20.0)
                .with_names("Viper 1", "F-16C")
                .with_motion(45.0, 350.0);
            let key = scenario.add_aircraft(aircraft.clone()).unwrap();
            assert_eq!(key, EntityKey::new("blue", "a"));
            assert_eq!(scenario.get_aircraft_by_id_and_side_id("blue", "a"), Some(&aircraft));
        }

        #[test]
        fn invalid_aircraft_is_rejected_without_side_effects() {
            let mut scenario = scenario();
            let aircraft = Aircraft::new("a", "blue", 0.0, 0.0).with_fuel(2000.0, 1000.0, 0.0);
            assert!(matches!(
                scenario.add_aircraft(aircraft),
                Err(ScenarioError::InvalidEntity { .. })
            ));
            assert!(scenario.store().sides().is_empty());
        }

        #[test]
        fn duplicate_keeps_first() {
            let mut scenario = scenario();
            scenario.add_aircraft(Aircraft::new("a", "blue", 1.0, 1.0)).unwrap();
            let result = scenario.add_aircraft(Aircraft::new("a", "blue", 2.0, 2.0));
            assert_eq!(
                result,
                Err(ScenarioError::DuplicateEntity(EntityKey::new("blue", "a")))
            );
            assert_eq!(
                scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap().latitude,
                1.0
            );
        }

        #[test]
        fn ships_are_added_and_looked_up() {
            let mut scenario = scenario();
            let ship = Ship::new("ddg-1", "blue", 24.0, 122.0).with_motion(90.0, 18.0);
            let key = scenario.add_ship(ship.clone()).unwrap();
            assert_eq!(key, EntityKey::new("blue", "ddg-1"));
            assert_eq!(scenario.get_ship_by_id_and_side_id("blue", "ddg-1"), Some(&ship));
            assert!(scenario.get_aircraft_by_id_and_side_id("blue", "ddg-1").is_none());
            assert!(matches!(
                scenario.add_ship(Ship::new("ddg-2", "blue", 95.0, 0.0)),
                Err(ScenarioError::InvalidEntity { .. })
            ));
        }

        #[test]
        fn lookup_of_airbase_as_aircraft_is_none() {
            let mut scenario = scenario();
            scenario.add_airbase(Airbase::new("home", "blue", 0.0, 0.0)).unwrap();
            assert!(scenario.get_aircraft_by_id_and_side_id("blue", "home").is_none());
            assert!(scenario.get_entity("blue", "home").is_some());
        }

        #[test]
        fn removal_clears_references() {
            let mut scenario = scenario();
            scenario.add_airbase(Airbase::new("home", "blue", 0.0, 1.0)).unwrap();
            scenario.add_aircraft(Aircraft::new("bandit", "red", 1.0, 1.0)).unwrap();
            scenario
                .add_aircraft(
                    Aircraft::new("a", "blue", 0.0, 0.0)
                        .with_home_base("home", true)
                        .with_target(EntityKey::new("red", "bandit")),
                )
                .unwrap();

            assert!(scenario.remove_entity("red", "bandit").is_some());
            assert!(scenario.remove_entity("blue", "home").is_some());
            let aircraft = scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap();
            assert_eq!(aircraft.target_id, None);
            assert_eq!(aircraft.home_base_id, None);
            assert!(!aircraft.return_to_base);
        }

        #[test]
        fn removing_unknown_is_none() {
            let mut scenario = scenario();
            assert!(scenario.remove_entity("blue", "ghost").is_none());
        }
    }

    mod order_tests {
        use super::*;

        fn with_fleet() -> Scenario {
            let mut scenario = scenario();
            scenario.add_airbase(Airbase::new("far", "blue", 0.0, 5.0)).unwrap();
            scenario.add_airbase(Airbase::new("near", "blue", 0.0, 1.0)).unwrap();
            scenario.add_airbase(Airbase::new("enemy", "red", 0.0, 0.1)).unwrap();
            scenario.add_aircraft(Aircraft::new("a", "blue", 0.0, 0.0)).unwrap();
            scenario.add_aircraft(Aircraft::new("bandit", "red", 1.0, 0.0)).unwrap();
            scenario
        }

        #[test]
        fn return_to_base_picks_closest_own_base() {
            let mut scenario = with_fleet();
            assert!(scenario.order_return_to_base("blue", "a").unwrap());
            let aircraft = scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap();
            assert!(aircraft.return_to_base);
            assert_eq!(aircraft.home_base_id.as_ref().map(|id| id.as_str()), Some("near"));
        }

        #[test]
        fn return_to_base_keeps_existing_home() {
            let mut scenario = with_fleet();
            scenario.remove_entity("blue", "a");
            scenario
                .add_aircraft(Aircraft::new("a", "blue", 0.0, 0.0).with_home_base("far", false))
                .unwrap();
            scenario.order_return_to_base("blue", "a").unwrap();
            let aircraft = scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap();
            assert_eq!(aircraft.home_base_id.as_ref().map(|id| id.as_str()), Some("far"));
        }

        #[test]
        fn return_to_base_toggles() {
            let mut scenario = with_fleet();
            assert!(scenario.order_return_to_base("blue", "a").unwrap());
            assert!(!scenario.order_return_to_base("blue", "a").unwrap());
        }

        #[test]
        fn cancelling_return_to_base_drops_route() {
            let mut scenario = with_fleet();
            scenario
                .order_route("blue", "a", vec![Waypoint::new(1.0, 1.0), Waypoint::new(2.0, 2.0)])
                .unwrap();
            assert!(scenario.order_return_to_base("blue", "a").unwrap());
            assert!(!scenario.order_return_to_base("blue", "a").unwrap());
            let aircraft = scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap();
            assert!(!aircraft.return_to_base);
            assert!(aircraft.route.is_empty());
            assert_eq!(aircraft.home_base_id.as_ref().map(|id| id.as_str()), Some("near"));
        }

        #[test]
        fn return_to_base_without_bases_fails() {
            let mut scenario = with_fleet();
            assert_eq!(
                scenario.order_return_to_base("red", "bandit").map(|_| ()),
                Ok(())
            );
            // Losing the base cancels the directive.
            scenario.remove_entity("red", "enemy");
            assert!(!scenario.get_aircraft_by_id_and_side_id("red", "bandit").unwrap().return_to_base);
            assert_eq!(
                scenario.order_return_to_base("red", "bandit"),
                Err(ScenarioError::NoBaseAvailable(EntityKey::new("red", "bandit")))
            );
        }

        #[test]
        fn orders_to_unknown_aircraft_fail() {
            let mut scenario = with_fleet();
            let missing = Err(ScenarioError::NotFound(EntityKey::new("blue", "ghost")));
            assert_eq!(scenario.order_return_to_base("blue", "ghost"), missing.clone().map(|()| true));
            assert_eq!(scenario.set_speed("blue", "ghost", 100.0), missing.clone());
            assert_eq!(scenario.clear_target("blue", "ghost"), missing.clone());
            assert_eq!(scenario.order_route("blue", "ghost", vec![]), missing);
            // Airbases take no orders.
            assert!(scenario.set_speed("blue", "near", 100.0).is_err());
        }

        #[test]
        fn pursuit_validation() {
            let mut scenario = with_fleet();
            assert!(scenario
                .order_pursuit("blue", "a", EntityKey::new("red", "bandit"))
                .is_ok());
            assert_eq!(
                scenario.order_pursuit("blue", "a", EntityKey::new("red", "ghost")),
                Err(ScenarioError::NotFound(EntityKey::new("red", "ghost")))
            );
            assert!(matches!(
                scenario.order_pursuit("blue", "a", EntityKey::new("blue", "a")),
                Err(ScenarioError::InvalidArgument(_))
            ));
            assert!(matches!(
                scenario.order_pursuit("blue", "a", EntityKey::new("blue", "near")),
                Err(ScenarioError::InvalidArgument(_))
            ));
            scenario.clear_target("blue", "a").unwrap();
            assert_eq!(
                scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap().target_id,
                None
            );
        }

        #[test]
        fn route_and_speed_validation() {
            let mut scenario = with_fleet();
            assert!(scenario
                .order_route("blue", "a", vec![Waypoint::new(95.0, 0.0)])
                .is_err());
            assert!(scenario.set_speed("blue", "a", -1.0).is_err());
            scenario
                .order_route("blue", "a", vec![Waypoint::new(1.0, 1.0)])
                .unwrap();
            scenario.set_speed("blue", "a", 420.0).unwrap();
            let aircraft = scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap();
            assert_eq!(aircraft.route.len(), 1);
            assert_eq!(aircraft.speed_knots, 420.0);
        }

        #[test]
        fn ships_take_route_and_speed_orders() {
            let mut scenario = with_fleet();
            scenario.add_ship(Ship::new("ddg-1", "blue", 0.0, 2.0)).unwrap();
            scenario
                .order_route("blue", "ddg-1", vec![Waypoint::new(0.5, 2.0)])
                .unwrap();
            scenario.set_speed("blue", "ddg-1", 25.0).unwrap();
            let ship = scenario.get_ship_by_id_and_side_id("blue", "ddg-1").unwrap();
            assert_eq!(ship.route, vec![Waypoint::new(0.5, 2.0)]);
            assert_eq!(ship.speed_knots, 25.0);

            // Aircraft-only orders do not apply to ships.
            assert!(scenario.order_return_to_base("blue", "ddg-1").is_err());
            assert!(scenario.order_route("blue", "near", vec![]).is_err());
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn negative_wall_time_fails_without_mutation() {
            let mut scenario = scenario();
            scenario
                .add_aircraft(Aircraft::new("a", "blue", 0.0, 0.0).with_motion(90.0, 400.0))
                .unwrap();
            let before = scenario.snapshot();
            assert!(scenario.tick(-1.0).is_err());
            assert_eq!(scenario.snapshot(), before);
        }

        #[test]
        fn paused_tick_changes_nothing() {
            let mut scenario = scenario();
            scenario
                .add_aircraft(Aircraft::new("a", "blue", 0.0, 0.0).with_motion(90.0, 400.0))
                .unwrap();
            scenario.pause();
            let before = scenario.snapshot();
            let summary = scenario.tick(60.0).unwrap();
            assert_eq!(summary.simulated_seconds, 0.0);
            assert!(summary.events.is_empty());
            assert_eq!(scenario.snapshot(), before);
            scenario.resume();
            assert_eq!(scenario.tick(60.0).unwrap().simulated_seconds, 60.0);
        }

        #[test]
        fn exhausted_aircraft_is_removed_and_references_cleared() {
            let mut scenario = scenario();
            scenario
                .add_aircraft(
                    Aircraft::new("bandit", "red", 1.0, 0.0)
                        .with_motion(0.0, 300.0)
                        .with_fuel(1.0, 1000.0, 3600.0),
                )
                .unwrap();
            scenario
                .add_aircraft(
                    Aircraft::new("a", "blue", 0.0, 0.0)
                        .with_motion(0.0, 300.0)
                        .with_target(EntityKey::new("red", "bandit")),
                )
                .unwrap();

            let summary = scenario.tick(10.0).unwrap();
            let removed: Vec<_> = summary.removed().cloned().collect();
            assert_eq!(removed, vec![EntityKey::new("red", "bandit")]);
            assert!(scenario.get_entity("red", "bandit").is_none());
            assert_eq!(
                scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap().target_id,
                None
            );
            // The side survives its last entity.
            assert!(scenario.store().side("red").is_some());
        }

        #[test]
        fn parked_empty_aircraft_survives_default_settings() {
            let mut scenario = scenario();
            scenario
                .add_aircraft(Aircraft::new("a", "blue", 0.0, 0.0).with_fuel(0.0, 1000.0, 0.0))
                .unwrap();
            let summary = scenario.tick(1.0).unwrap();
            assert!(summary.events.is_empty());
            let aircraft = scenario.get_aircraft_by_id_and_side_id("blue", "a").unwrap();
            assert_eq!(aircraft.current_fuel_lbs, 0.0);
            assert!(!aircraft.is_fuel_exhausted());
        }

        #[test]
        fn flagged_aircraft_leaves_under_default_settings() {
            let mut scenario = scenario();
            let mut aircraft = Aircraft::new("a", "blue", 0.0, 0.0).with_fuel(0.0, 1000.0, 3600.0);
            aircraft.status.insert(AircraftStatus::FUEL_EXHAUSTED);
            scenario.add_aircraft(aircraft).unwrap();
            let summary = scenario.tick(1.0).unwrap();
            let removed: Vec<_> = summary.removed().cloned().collect();
            assert_eq!(removed, vec![EntityKey::new("blue", "a")]);
            assert!(scenario.get_entity("blue", "a").is_none());
        }
    }
}
