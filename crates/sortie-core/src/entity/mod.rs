//! Entity module for the scenario simulation.
//!
//! This module provides the identity and storage types for everything that
//! lives in a scenario:
//! - [`SideId`] / [`EntityId`]: String identifiers for sides and entities
//! - [`EntityKey`]: The `(side, id)` pair that uniquely names an entity
//! - [`EntityTag`]: Kind classification used for behaviour dispatch
//! - [`Entity`]: The tagged entity container (aircraft, airbase or ship)
//!
//! # Identity
//!
//! Bare entity ids are only unique within a side. Two sides may both field an
//! aircraft called `"viper-1"`, so every lookup and every cross-entity
//! reference uses the full [`EntityKey`].
//!
//! # Example
//!
//! ```
//! use sortie_core::entity::{Airbase, Entity, EntityTag};
//!
//! let base = Entity::Airbase(Airbase::new("kadena", "blue", 26.35, 127.77));
//!
//! assert_eq!(base.tag(), EntityTag::Airbase);
//! assert_eq!(base.key().to_string(), "blue/kadena");
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub use components::{
    Aircraft, AircraftStatus, Airbase, GeoPosition, Ship, ShipStatus, Waypoint,
};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if the identifier is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        // Lets hash maps keyed by the id be queried with a plain `&str`.
        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Identifier of a side (faction).
    SideId
}

string_id! {
    /// Identifier of an entity, unique within its side.
    EntityId
}

/// Composite key naming exactly one entity in a scenario.
///
/// `EntityKey` is what cross-entity references store (for instance an
/// aircraft's pursuit target). It is resolved against the store on demand, so
/// a key whose entity has been removed simply fails to resolve.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityKey {
    /// Side the entity belongs to.
    pub side_id: SideId,
    /// Entity id within that side.
    pub id: EntityId,
}

impl EntityKey {
    /// Creates a key from a side id and an entity id.
    #[must_use]
    pub fn new(side_id: impl Into<SideId>, id: impl Into<EntityId>) -> Self {
        Self {
            side_id: side_id.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.side_id, self.id)
    }
}

/// Entity kind tag.
///
/// Mirrors the [`Entity`] variant and is what behaviour dispatch and
/// filtering code matches on when it does not need the payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// Mobile, fuel-limited air unit.
    Aircraft,
    /// Fixed installation that aircraft return to.
    Airbase,
    /// Surface vessel that follows a route.
    Ship,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aircraft => write!(f, "Aircraft"),
            Self::Airbase => write!(f, "Airbase"),
            Self::Ship => write!(f, "Ship"),
        }
    }
}

/// A complete entity in the scenario.
///
/// Each variant carries the full state record for its kind. The side and id
/// live inside the record so a snapshot of a single entity is self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Entity {
    /// An aircraft.
    Aircraft(Aircraft),
    /// An airbase.
    Airbase(Airbase),
    /// A ship.
    Ship(Ship),
}

impl Entity {
    /// Returns the entity's kind tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Aircraft(_) => EntityTag::Aircraft,
            Self::Airbase(_) => EntityTag::Airbase,
            Self::Ship(_) => EntityTag::Ship,
        }
    }

    /// Returns the entity id (unique within its side).
    #[must_use]
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Aircraft(aircraft) => &aircraft.id,
            Self::Airbase(airbase) => &airbase.id,
            Self::Ship(ship) => &ship.id,
        }
    }

    /// Returns the id of the side the entity belongs to.
    #[must_use]
    pub fn side_id(&self) -> &SideId {
        match self {
            Self::Aircraft(aircraft) => &aircraft.side_id,
            Self::Airbase(airbase) => &airbase.side_id,
            Self::Ship(ship) => &ship.side_id,
        }
    }

    /// Returns the entity's composite key.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey {
            side_id: self.side_id().clone(),
            id: self.id().clone(),
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Aircraft(aircraft) => &aircraft.name,
            Self::Airbase(airbase) => &airbase.name,
            Self::Ship(ship) => &ship.name,
        }
    }

    /// Returns the entity's current geodetic position.
    #[must_use]
    pub fn position(&self) -> GeoPosition {
        match self {
            Self::Aircraft(aircraft) => aircraft.position(),
            Self::Airbase(airbase) => airbase.position(),
            Self::Ship(ship) => ship.position(),
        }
    }

    /// Checks the entity's invariants, returning the reason on failure.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Aircraft(aircraft) => aircraft.validate(),
            Self::Airbase(airbase) => airbase.validate(),
            Self::Ship(ship) => ship.validate(),
        }
    }

    /// Returns `true` if this entity is an aircraft.
    #[must_use]
    pub const fn is_aircraft(&self) -> bool {
        matches!(self, Self::Aircraft(_))
    }

    /// Returns `true` if this entity is an airbase.
    #[must_use]
    pub const fn is_airbase(&self) -> bool {
        matches!(self, Self::Airbase(_))
    }

    /// Returns `true` if this entity is a ship.
    #[must_use]
    pub const fn is_ship(&self) -> bool {
        matches!(self, Self::Ship(_))
    }

    /// Returns the aircraft record if this is an aircraft, `None` otherwise.
    #[must_use]
    pub const fn as_aircraft(&self) -> Option<&Aircraft> {
        match self {
            Self::Aircraft(aircraft) => Some(aircraft),
            Self::Airbase(_) | Self::Ship(_) => None,
        }
    }

    /// Returns the mutable aircraft record if this is an aircraft.
    #[must_use]
    pub fn as_aircraft_mut(&mut self) -> Option<&mut Aircraft> {
        match self {
            Self::Aircraft(aircraft) => Some(aircraft),
            Self::Airbase(_) | Self::Ship(_) => None,
        }
    }

    /// Returns the airbase record if this is an airbase, `None` otherwise.
    #[must_use]
    pub const fn as_airbase(&self) -> Option<&Airbase> {
        match self {
            Self::Airbase(airbase) => Some(airbase),
            Self::Aircraft(_) | Self::Ship(_) => None,
        }
    }

    /// Returns the ship record if this is a ship, `None` otherwise.
    #[must_use]
    pub const fn as_ship(&self) -> Option<&Ship> {
        match self {
            Self::Ship(ship) => Some(ship),
            Self::Aircraft(_) | Self::Airbase(_) => None,
        }
    }

    /// Returns the mutable ship record if this is a ship.
    #[must_use]
    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match self {
            Self::Ship(ship) => Some(ship),
            Self::Aircraft(_) | Self::Airbase(_) => None,
        }
    }
}

impl From<Aircraft> for Entity {
    fn from(aircraft: Aircraft) -> Self {
        Self::Aircraft(aircraft)
    }
}

impl From<Airbase> for Entity {
    fn from(airbase: Airbase) -> Self {
        Self::Airbase(airbase)
    }
}

impl From<Ship> for Entity {
    fn from(ship: Ship) -> Self {
        Self::Ship(ship)
    }
}
