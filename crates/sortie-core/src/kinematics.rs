//! Per-entity kinematics and logistics update.
//!
//! [`update_entity`] is a pure function: it reads the entity and the pre-tick
//! world, and returns the entity's next state plus the events it produced.
//! Nothing here mutates the store, which is what lets the scenario run the
//! pass on the rayon pool without changing the result.
//!
//! # Aircraft update order
//!
//! 1. Fuel burn, then fuel-exhaustion handling
//! 2. Return-to-base: steer for the home base
//! 3. Otherwise pursuit: steer for the target's pre-tick position
//! 4. Otherwise route: steer for the first waypoint
//! 5. Great-circle integration of `speed * dt` along the heading, clamped to
//!    the distance left to the destination
//! 6. Arrival: snap onto the destination and end the directive
//!
//! Fuel exhaustion fires only when a burn empties the tank. An empty tank
//! with nothing burning is a parked airframe, not an exhausted one.
//!
//! # Ship update order
//!
//! Ships burn fuel under the same exhaustion policy, then steam toward the
//! first waypoint of their route. A ship with no route holds position.
//!
//! Airbases are static and come back unchanged.

use tracing::debug;

use crate::config::{FuelExhaustionPolicy, SimulationSettings};
use crate::entity::{
    Aircraft, AircraftStatus, Entity, EntityId, EntityKey, GeoPosition, Ship, ShipStatus,
};
use crate::events::{Reference, RemovalReason, TickEvent};
use crate::geo;
use crate::store::EntityStore;

/// Seconds per hour, for the lbs/hour burn rate.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Read-only inputs shared by every entity update in a tick.
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    /// Simulated seconds elapsed this tick.
    pub dt: f64,
    /// World state at the start of the tick.
    pub world: &'a EntityStore,
    /// Simulation tunables.
    pub settings: &'a SimulationSettings,
}

/// Next state of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate {
    /// The entity after the tick.
    pub entity: Entity,
    /// Events produced, in order.
    pub events: Vec<TickEvent>,
    /// Set when the entity must leave the scenario at the end of the tick.
    pub removal: Option<RemovalReason>,
}

impl EntityUpdate {
    fn unchanged(entity: &Entity) -> Self {
        Self {
            entity: entity.clone(),
            events: Vec::new(),
            removal: None,
        }
    }
}

/// Where the active directive is taking the aircraft.
#[derive(Debug, Clone)]
enum Destination {
    HomeBase(EntityId),
    Target(EntityKey),
    Waypoint,
}

/// Computes the next state of `entity` after `ctx.dt` seconds.
#[must_use]
pub fn update_entity(entity: &Entity, ctx: &UpdateContext<'_>) -> EntityUpdate {
    match entity {
        Entity::Aircraft(aircraft) => update_aircraft(aircraft, ctx),
        Entity::Ship(ship) => update_ship(ship, ctx),
        Entity::Airbase(_) => EntityUpdate::unchanged(entity),
    }
}

fn update_aircraft(current: &Aircraft, ctx: &UpdateContext<'_>) -> EntityUpdate {
    let key = current.key();
    let mut next = current.clone();
    let mut events = Vec::new();

    // 1. Fuel
    let ran_dry = burn_fuel(
        &mut next.current_fuel_lbs,
        next.fuel_rate_lbs_per_hour,
        ctx.dt,
    );
    if ran_dry && !next.is_at_base() && !next.is_fuel_exhausted() {
        next.status.insert(AircraftStatus::FUEL_EXHAUSTED);
        debug!(aircraft = %key, "fuel exhausted");
        events.push(TickEvent::FuelExhausted { key: key.clone() });
    }
    if next.is_fuel_exhausted() {
        if ctx.settings.fuel_exhaustion == FuelExhaustionPolicy::Remove {
            return EntityUpdate {
                entity: Entity::Aircraft(next),
                events,
                removal: Some(RemovalReason::FuelExhausted),
            };
        }
        degrade(&mut next, ctx);
    }

    // 2-4. Directive
    let destination = resolve_destination(&mut next, &key, ctx.world, &mut events);
    if let Some((_, position)) = &destination {
        if geo::distance_m(&next.position(), position) > 0.0 {
            next.heading = geo::bearing_deg(&next.position(), position);
        }
    }

    // 5. Integration
    let mut step_m = next.speed_knots * geo::KNOTS_TO_METERS_PER_SECOND * ctx.dt;
    if let Some((_, position)) = &destination {
        step_m = step_m.min(geo::distance_m(&next.position(), position));
    }
    let moved = geo::destination(&next.position(), next.heading, step_m);
    next.latitude = moved.latitude;
    next.longitude = moved.longitude;
    next.heading = geo::normalize_heading(next.heading);

    // 6. Arrival
    if let Some((kind, position)) = destination {
        if geo::distance_m(&next.position(), &position) <= ctx.settings.arrival_tolerance_m {
            next.latitude = position.latitude;
            next.longitude = position.longitude;
            arrive(&mut next, &key, kind, &mut events);
        }
    }

    EntityUpdate {
        entity: Entity::Aircraft(next),
        events,
        removal: None,
    }
}

fn update_ship(current: &Ship, ctx: &UpdateContext<'_>) -> EntityUpdate {
    let key = current.key();
    let mut next = current.clone();
    let mut events = Vec::new();

    let ran_dry = burn_fuel(
        &mut next.current_fuel_lbs,
        next.fuel_rate_lbs_per_hour,
        ctx.dt,
    );
    if ran_dry && !next.is_fuel_exhausted() {
        next.status.insert(ShipStatus::FUEL_EXHAUSTED);
        debug!(ship = %key, "fuel exhausted");
        events.push(TickEvent::FuelExhausted { key: key.clone() });
    }
    if next.is_fuel_exhausted() {
        if ctx.settings.fuel_exhaustion == FuelExhaustionPolicy::Remove {
            return EntityUpdate {
                entity: Entity::Ship(next),
                events,
                removal: Some(RemovalReason::FuelExhausted),
            };
        }
        next.speed_knots = exhausted_speed(next.speed_knots, ctx);
    }

    let Some(waypoint) = next.route.first().copied() else {
        return EntityUpdate {
            entity: Entity::Ship(next),
            events,
            removal: None,
        };
    };
    let destination = GeoPosition::new(waypoint.latitude, waypoint.longitude, next.altitude);
    let distance_m = geo::distance_m(&next.position(), &destination);
    if distance_m > 0.0 {
        next.heading = geo::bearing_deg(&next.position(), &destination);
    }

    let step_m = (next.speed_knots * geo::KNOTS_TO_METERS_PER_SECOND * ctx.dt).min(distance_m);
    let moved = geo::destination(&next.position(), next.heading, step_m);
    next.latitude = moved.latitude;
    next.longitude = moved.longitude;
    next.heading = geo::normalize_heading(next.heading);

    if geo::distance_m(&next.position(), &destination) <= ctx.settings.arrival_tolerance_m {
        next.latitude = destination.latitude;
        next.longitude = destination.longitude;
        next.route.remove(0);
        events.push(TickEvent::WaypointReached {
            key,
            remaining: next.route.len(),
        });
    }

    EntityUpdate {
        entity: Entity::Ship(next),
        events,
        removal: None,
    }
}

/// Burns `dt` seconds of fuel. Returns `true` if this burn left the tank
/// empty; nothing burned means nothing ran dry.
fn burn_fuel(current_lbs: &mut f64, rate_lbs_per_hour: f64, dt: f64) -> bool {
    let burned = rate_lbs_per_hour * dt / SECONDS_PER_HOUR;
    if burned <= 0.0 {
        return false;
    }
    *current_lbs = (*current_lbs - burned).max(0.0);
    *current_lbs <= 0.0
}

/// Speed after `ctx.dt` seconds without fuel, for the non-removing policies.
fn exhausted_speed(speed_knots: f64, ctx: &UpdateContext<'_>) -> f64 {
    match ctx.settings.fuel_exhaustion {
        FuelExhaustionPolicy::Remove | FuelExhaustionPolicy::Freeze => 0.0,
        FuelExhaustionPolicy::Coast {
            deceleration_knots_per_second,
        } => (speed_knots - deceleration_knots_per_second * ctx.dt).max(0.0),
    }
}

/// A dry aircraft can reach nothing: drop its directives and bleed speed.
fn degrade(aircraft: &mut Aircraft, ctx: &UpdateContext<'_>) {
    aircraft.return_to_base = false;
    aircraft.target_id = None;
    aircraft.route.clear();
    aircraft.speed_knots = exhausted_speed(aircraft.speed_knots, ctx);
}

fn resolve_destination(
    aircraft: &mut Aircraft,
    key: &EntityKey,
    world: &EntityStore,
    events: &mut Vec<TickEvent>,
) -> Option<(Destination, GeoPosition)> {
    if aircraft.return_to_base {
        match aircraft.home_base_id.clone() {
            Some(base_id) => {
                let base = world
                    .get(aircraft.side_id.as_str(), base_id.as_str())
                    .filter(|base| base.id() != &aircraft.id);
                if let Some(base) = base {
                    return Some((Destination::HomeBase(base_id), base.position()));
                }
                aircraft.return_to_base = false;
                aircraft.home_base_id = None;
                events.push(TickEvent::DanglingReference {
                    owner: key.clone(),
                    reference: Reference::HomeBase(base_id),
                });
            }
            None => {
                aircraft.return_to_base = false;
                events.push(TickEvent::NoHomeBase { key: key.clone() });
            }
        }
    }

    if let Some(target_key) = aircraft.target_id.clone() {
        let target = world.get_by_key(&target_key).filter(|_| &target_key != key);
        if let Some(target) = target {
            return Some((Destination::Target(target_key), target.position()));
        }
        aircraft.target_id = None;
        events.push(TickEvent::DanglingReference {
            owner: key.clone(),
            reference: Reference::Target(target_key),
        });
    }

    aircraft.route.first().map(|waypoint| {
        (
            Destination::Waypoint,
            GeoPosition::new(waypoint.latitude, waypoint.longitude, aircraft.altitude),
        )
    })
}

fn arrive(
    aircraft: &mut Aircraft,
    key: &EntityKey,
    destination: Destination,
    events: &mut Vec<TickEvent>,
) {
    match destination {
        Destination::HomeBase(base) => {
            aircraft.return_to_base = false;
            aircraft.route.clear();
            aircraft.speed_knots = 0.0;
            aircraft.status.insert(AircraftStatus::AT_BASE);
            debug!(aircraft = %key, base = %base, "arrived at base");
            events.push(TickEvent::ArrivedAtBase {
                key: key.clone(),
                base,
            });
        }
        Destination::Target(target) => {
            aircraft.target_id = None;
            aircraft.speed_knots = 0.0;
            debug!(aircraft = %key, target = %target, "closed on target");
            events.push(TickEvent::TargetReached {
                key: key.clone(),
                target,
            });
        }
        Destination::Waypoint => {
            aircraft.route.remove(0);
            if aircraft.route.is_empty() {
                aircraft.speed_knots = 0.0;
            }
            events.push(TickEvent::WaypointReached {
                key: key.clone(),
                remaining: aircraft.route.len(),
            });
        }
    }
}
