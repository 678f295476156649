//! State records for each entity kind.
//!
//! The records are plain data: every field is public so the presentation layer
//! can read a snapshot directly, and the serde representation (camelCase) is the
//! scenario file format.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{EntityId, EntityKey, SideId};

/// Geodetic position on the spherical earth model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
    /// Altitude in feet.
    pub altitude: f64,
}

impl GeoPosition {
    /// Creates a position.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Returns `true` if latitude and longitude are finite and in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.altitude.is_finite()
    }
}

/// A route point an aircraft flies to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Waypoint {
    /// Creates a waypoint.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if the coordinates are finite and in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

bitflags! {
    /// Degradation and location flags maintained by the kinematics update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AircraftStatus: u8 {
        /// Fuel ran out away from a base; the aircraft can no longer reach
        /// a base or a target.
        const FUEL_EXHAUSTED = 1 << 0;
        /// Parked on its home base after a completed return-to-base.
        const AT_BASE = 1 << 1;
    }
}

/// Full state of an aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aircraft {
    /// Identifier, unique within the side.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Type descriptor (airframe template).
    pub class_name: String,
    /// Owning side.
    pub side_id: SideId,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in feet.
    pub altitude: f64,
    /// UI selection flag; carried but never read by the simulation.
    pub selected: bool,
    /// True heading in degrees, `[0, 360)`.
    pub heading: f64,
    /// Ground speed in knots.
    pub speed_knots: f64,
    /// Fuel on board in pounds.
    pub current_fuel_lbs: f64,
    /// Fuel capacity in pounds.
    pub max_fuel_lbs: f64,
    /// Burn rate in pounds per hour.
    pub fuel_rate_lbs_per_hour: f64,
    /// Home base id on the aircraft's own side.
    pub home_base_id: Option<EntityId>,
    /// Return-to-base directive.
    pub return_to_base: bool,
    /// Pursuit target.
    pub target_id: Option<EntityKey>,
    /// Remaining waypoints, flown in order.
    #[serde(default)]
    pub route: Vec<Waypoint>,
    /// Flags maintained by the kinematics update.
    #[serde(default)]
    pub status: AircraftStatus,
}

impl Aircraft {
    /// Creates an aircraft at the given position.
    ///
    /// The aircraft starts stationary, heading north, with a full 10 000 lb
    /// tank that is not being burned. Use the `with_*` builders to fill in
    /// the rest.
    #[must_use]
    pub fn new(
        id: impl Into<EntityId>,
        side_id: impl Into<SideId>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            class_name: String::new(),
            side_id: side_id.into(),
            latitude,
            longitude,
            altitude: 0.0,
            selected: false,
            heading: 0.0,
            speed_knots: 0.0,
            current_fuel_lbs: 10_000.0,
            max_fuel_lbs: 10_000.0,
            fuel_rate_lbs_per_hour: 0.0,
            home_base_id: None,
            return_to_base: false,
            target_id: None,
            route: Vec::new(),
            status: AircraftStatus::empty(),
        }
    }

    /// Sets the display and class names.
    #[must_use]
    pub fn with_names(mut self, name: impl Into<String>, class_name: impl Into<String>) -> Self {
        self.name = name.into();
        self.class_name = class_name.into();
        self
    }

    /// Sets altitude in feet.
    #[must_use]
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    /// Sets heading (degrees) and ground speed (knots).
    #[must_use]
    pub fn with_motion(mut self, heading: f64, speed_knots: f64) -> Self {
        self.heading = heading;
        self.speed_knots = speed_knots;
        self
    }

    /// Sets current fuel, capacity and burn rate.
    #[must_use]
    pub fn with_fuel(mut self, current_lbs: f64, max_lbs: f64, rate_lbs_per_hour: f64) -> Self {
        self.current_fuel_lbs = current_lbs;
        self.max_fuel_lbs = max_lbs;
        self.fuel_rate_lbs_per_hour = rate_lbs_per_hour;
        self
    }

    /// Sets the home base and the return-to-base directive.
    #[must_use]
    pub fn with_home_base(mut self, base: impl Into<EntityId>, return_to_base: bool) -> Self {
        self.home_base_id = Some(base.into());
        self.return_to_base = return_to_base;
        self
    }

    /// Sets the pursuit target.
    #[must_use]
    pub fn with_target(mut self, target: EntityKey) -> Self {
        self.target_id = Some(target);
        self
    }

    /// Sets the route.
    #[must_use]
    pub fn with_route(mut self, route: Vec<Waypoint>) -> Self {
        self.route = route;
        self
    }

    /// Returns the composite key of this aircraft.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            side_id: self.side_id.clone(),
            id: self.id.clone(),
        }
    }

    /// Returns the current position.
    #[must_use]
    pub const fn position(&self) -> GeoPosition {
        GeoPosition::new(self.latitude, self.longitude, self.altitude)
    }

    /// Returns `true` if the aircraft has run dry away from a base.
    #[must_use]
    pub const fn is_fuel_exhausted(&self) -> bool {
        self.status.contains(AircraftStatus::FUEL_EXHAUSTED)
    }

    /// Returns `true` if the aircraft is parked on its home base.
    #[must_use]
    pub const fn is_at_base(&self) -> bool {
        self.status.contains(AircraftStatus::AT_BASE)
    }

    /// Checks the insertion invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a readable message.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("id must not be empty".into());
        }
        if self.side_id.is_empty() {
            return Err("side id must not be empty".into());
        }
        if !self.position().is_valid() {
            return Err(format!(
                "position ({}, {}, {}) is out of range",
                self.latitude, self.longitude, self.altitude
            ));
        }
        if !(0.0..360.0).contains(&self.heading) {
            return Err(format!("heading {} is outside [0, 360)", self.heading));
        }
        if !(self.speed_knots.is_finite() && self.speed_knots >= 0.0) {
            return Err(format!("speed {} kt must be >= 0", self.speed_knots));
        }
        check_fuel(
            self.current_fuel_lbs,
            self.max_fuel_lbs,
            self.fuel_rate_lbs_per_hour,
        )?;
        check_route(&self.route)
    }
}

fn check_fuel(current_lbs: f64, max_lbs: f64, rate_lbs_per_hour: f64) -> Result<(), String> {
    if !(max_lbs.is_finite() && max_lbs > 0.0) {
        return Err(format!("max fuel {max_lbs} lbs must be > 0"));
    }
    if !(0.0..=max_lbs).contains(&current_lbs) {
        return Err(format!("fuel {current_lbs} lbs is outside [0, {max_lbs}]"));
    }
    if !(rate_lbs_per_hour.is_finite() && rate_lbs_per_hour >= 0.0) {
        return Err(format!("fuel rate {rate_lbs_per_hour} lbs/h must be >= 0"));
    }
    Ok(())
}

fn check_route(route: &[Waypoint]) -> Result<(), String> {
    match route.iter().find(|w| !w.is_valid()) {
        Some(waypoint) => Err(format!(
            "waypoint ({}, {}) is out of range",
            waypoint.latitude, waypoint.longitude
        )),
        None => Ok(()),
    }
}

bitflags! {
    /// Flags maintained by the ship update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ShipStatus: u8 {
        /// Bunkers ran dry; the ship can no longer make way on its own.
        const FUEL_EXHAUSTED = 1 << 0;
    }
}

/// Full state of a surface ship.
///
/// Ships have no home base and no pursuit target: they steam along their
/// route and hold position once it is used up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    /// Identifier, unique within the side.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Type descriptor (hull template).
    pub class_name: String,
    /// Owning side.
    pub side_id: SideId,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in feet, normally zero.
    pub altitude: f64,
    /// UI selection flag; carried but never read by the simulation.
    pub selected: bool,
    /// True heading in degrees, `[0, 360)`.
    pub heading: f64,
    /// Speed made good in knots while under way.
    pub speed_knots: f64,
    /// Fuel on board in pounds.
    pub current_fuel_lbs: f64,
    /// Fuel capacity in pounds.
    pub max_fuel_lbs: f64,
    /// Burn rate in pounds per hour.
    pub fuel_rate_lbs_per_hour: f64,
    /// Remaining waypoints, steamed in order.
    #[serde(default)]
    pub route: Vec<Waypoint>,
    /// Flags maintained by the ship update.
    #[serde(default)]
    pub status: ShipStatus,
}

impl Ship {
    /// Creates a ship at the given position.
    ///
    /// Same defaults as [`Aircraft::new`]: stationary, heading north, full
    /// 10 000 lb bunkers and no burn.
    #[must_use]
    pub fn new(
        id: impl Into<EntityId>,
        side_id: impl Into<SideId>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            class_name: String::new(),
            side_id: side_id.into(),
            latitude,
            longitude,
            altitude: 0.0,
            selected: false,
            heading: 0.0,
            speed_knots: 0.0,
            current_fuel_lbs: 10_000.0,
            max_fuel_lbs: 10_000.0,
            fuel_rate_lbs_per_hour: 0.0,
            route: Vec::new(),
            status: ShipStatus::empty(),
        }
    }

    /// Sets the display and class names.
    #[must_use]
    pub fn with_names(mut self, name: impl Into<String>, class_name: impl Into<String>) -> Self {
        self.name = name.into();
        self.class_name = class_name.into();
        self
    }

    /// Sets heading (degrees) and speed (knots).
    #[must_use]
    pub fn with_motion(mut self, heading: f64, speed_knots: f64) -> Self {
        self.heading = heading;
        self.speed_knots = speed_knots;
        self
    }

    /// Sets current fuel, capacity and burn rate.
    #[must_use]
    pub fn with_fuel(mut self, current_lbs: f64, max_lbs: f64, rate_lbs_per_hour: f64) -> Self {
        self.current_fuel_lbs = current_lbs;
        self.max_fuel_lbs = max_lbs;
        self.fuel_rate_lbs_per_hour = rate_lbs_per_hour;
        self
    }

    /// Sets the route.
    #[must_use]
    pub fn with_route(mut self, route: Vec<Waypoint>) -> Self {
        self.route = route;
        self
    }

    /// Returns the composite key of this ship.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            side_id: self.side_id.clone(),
            id: self.id.clone(),
        }
    }

    /// Returns the current position.
    #[must_use]
    pub const fn position(&self) -> GeoPosition {
        GeoPosition::new(self.latitude, self.longitude, self.altitude)
    }

    /// Returns `true` if the ship has run dry.
    #[must_use]
    pub const fn is_fuel_exhausted(&self) -> bool {
        self.status.contains(ShipStatus::FUEL_EXHAUSTED)
    }

    /// Checks the insertion invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a readable message.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("id must not be empty".into());
        }
        if self.side_id.is_empty() {
            return Err("side id must not be empty".into());
        }
        if !self.position().is_valid() {
            return Err(format!(
                "position ({}, {}, {}) is out of range",
                self.latitude, self.longitude, self.altitude
            ));
        }
        if !(0.0..360.0).contains(&self.heading) {
            return Err(format!("heading {} is outside [0, 360)", self.heading));
        }
        if !(self.speed_knots.is_finite() && self.speed_knots >= 0.0) {
            return Err(format!("speed {} kt must be >= 0", self.speed_knots));
        }
        check_fuel(
            self.current_fuel_lbs,
            self.max_fuel_lbs,
            self.fuel_rate_lbs_per_hour,
        )?;
        check_route(&self.route)
    }
}

/// Fixed installation aircraft can be based at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airbase {
    /// Identifier, unique within the side.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Type descriptor.
    pub class_name: String,
    /// Owning side.
    pub side_id: SideId,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Field elevation in feet.
    pub altitude: f64,
}

impl Airbase {
    /// Creates an airbase at the given coordinates, named after its id.
    #[must_use]
    pub fn new(
        id: impl Into<EntityId>,
        side_id: impl Into<SideId>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            class_name: String::new(),
            side_id: side_id.into(),
            latitude,
            longitude,
            altitude: 0.0,
        }
    }

    /// Returns the composite key of this airbase.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            side_id: self.side_id.clone(),
            id: self.id.clone(),
        }
    }

    /// Returns the airbase position.
    #[must_use]
    pub const fn position(&self) -> GeoPosition {
        GeoPosition::new(self.latitude, self.longitude, self.altitude)
    }

    /// Checks the insertion invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a readable message.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("id must not be empty".into());
        }
        if self.side_id.is_empty() {
            return Err("side id must not be empty".into());
        }
        if !self.position().is_valid() {
            return Err(format!(
                "position ({}, {}, {}) is out of range",
                self.latitude, self.longitude, self.altitude
            ));
        }
        Ok(())
    }
}
