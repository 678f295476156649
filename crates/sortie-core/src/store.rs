//! Entity store partitioned by side.
//!
//! The store is the container for all entities in a scenario. It provides:
//! - O(1) expected lookup by `(side, id)` through a hash map per side
//! - Deterministic iteration: sides in creation order, entities in insertion
//!   order within each side
//! - Deferred removal, so an entity can be marked for deletion while the store
//!   is being walked and is only dropped by [`EntityStore::flush_removals`]
//!
//! # Sides
//!
//! Sides are registered explicitly with [`EntityStore::add_side`] or created
//! implicitly the first time an entity references them. An implicit side uses
//! its id as display name and has no color. Sides are never removed, even when
//! their last entity is.
//!
//! # Example
//!
//! ```
//! use sortie_core::entity::{Aircraft, Entity};
//! use sortie_core::store::EntityStore;
//!
//! let mut store = EntityStore::new();
//! store.add(Entity::Aircraft(Aircraft::new("1", "blue", 0.0, 0.0))).unwrap();
//! store.add(Entity::Aircraft(Aircraft::new("1", "red", 1.0, 1.0))).unwrap();
//!
//! // Same bare id, different sides: two distinct entities.
//! assert_eq!(store.len(), 2);
//! assert!(store.get("red", "1").is_some());
//! assert!(store.get("green", "1").is_none());
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityKey, SideId};
use crate::error::{Result, ScenarioError};

/// A faction. Only its identity matters to the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Side {
    /// Side identifier.
    pub id: SideId,
    /// Display name.
    pub name: String,
    /// Display color, free-form (e.g. `"#3366ff"`).
    #[serde(default)]
    pub color: String,
}

impl Side {
    /// Creates a side.
    #[must_use]
    pub fn new(id: impl Into<SideId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// The side created when an entity references an unknown side id.
    #[must_use]
    pub fn implicit(id: SideId) -> Self {
        Self {
            name: id.to_string(),
            id,
            color: String::new(),
        }
    }
}

/// What a [`EntityStore::for_each_entity_mut`] visitor wants done with the
/// entity it just visited.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visit {
    /// Keep the entity.
    Keep,
    /// Schedule the entity for removal at the next flush.
    Remove,
}

/// Entities of one side.
#[derive(Debug, Clone, Default)]
struct Roster {
    entities: HashMap<EntityId, Entity>,
    /// Insertion order of `entities`.
    order: Vec<EntityId>,
}

/// Container of every entity in a scenario.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    /// Sides in creation order.
    sides: Vec<Side>,
    /// Rosters, parallel to `sides`.
    rosters: Vec<Roster>,
    side_index: HashMap<SideId, usize>,
    /// Keys scheduled for removal, in scheduling order.
    pending_removals: Vec<EntityKey>,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a side.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::DuplicateSide`] if the side id is taken (including by
    /// an implicitly created side); [`ScenarioError::InvalidArgument`] for an
    /// empty id.
    pub fn add_side(&mut self, side: Side) -> Result<()> {
        if side.id.is_empty() {
            return Err(ScenarioError::InvalidArgument(
                "side id must not be empty".into(),
            ));
        }
        if self.side_index.contains_key(&side.id) {
            return Err(ScenarioError::DuplicateSide(side.id));
        }
        self.insert_side(side);
        Ok(())
    }

    fn insert_side(&mut self, side: Side) -> usize {
        let index = self.sides.len();
        self.side_index.insert(side.id.clone(), index);
        self.sides.push(side);
        self.rosters.push(Roster::default());
        index
    }

    fn ensure_side(&mut self, id: &SideId) -> usize {
        match self.side_index.get(id) {
            Some(&index) => index,
            None => self.insert_side(Side::implicit(id.clone())),
        }
    }

    /// Returns the side with the given id.
    #[must_use]
    pub fn side(&self, id: &str) -> Option<&Side> {
        self.side_index.get(id).map(|&index| &self.sides[index])
    }

    /// Returns all sides in creation order.
    #[must_use]
    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    /// Inserts an entity, creating its side if needed.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::DuplicateEntity`] if `(side, id)` is already present;
    /// the existing entity is kept and no side is created.
    pub fn add(&mut self, entity: Entity) -> Result<()> {
        if self.contains(entity.side_id().as_str(), entity.id().as_str()) {
            return Err(ScenarioError::DuplicateEntity(entity.key()));
        }
        let index = self.ensure_side(entity.side_id());
        let roster = &mut self.rosters[index];
        roster.order.push(entity.id().clone());
        roster.entities.insert(entity.id().clone(), entity);
        Ok(())
    }

    /// Returns `true` if `(side, id)` is present.
    #[must_use]
    pub fn contains(&self, side: &str, id: &str) -> bool {
        self.get(side, id).is_some()
    }

    /// Looks up an entity. Absent entities yield `None`.
    #[must_use]
    pub fn get(&self, side: &str, id: &str) -> Option<&Entity> {
        let &index = self.side_index.get(side)?;
        self.rosters[index].entities.get(id)
    }

    /// Looks up an entity by key.
    #[must_use]
    pub fn get_by_key(&self, key: &EntityKey) -> Option<&Entity> {
        self.get(key.side_id.as_str(), key.id.as_str())
    }

    /// Looks up an entity for mutation.
    #[must_use]
    pub fn get_mut(&mut self, side: &str, id: &str) -> Option<&mut Entity> {
        let &index = self.side_index.get(side)?;
        self.rosters[index].entities.get_mut(id)
    }

    /// Removes an entity immediately, returning it. Absent entities yield
    /// `None`.
    ///
    /// Do not call this while walking the store; use
    /// [`EntityStore::schedule_removal`] instead.
    pub fn remove(&mut self, side: &str, id: &str) -> Option<Entity> {
        let &index = self.side_index.get(side)?;
        let roster = &mut self.rosters[index];
        let entity = roster.entities.remove(id)?;
        roster.order.retain(|existing| existing.as_str() != id);
        self.pending_removals
            .retain(|key| !(key.side_id.as_str() == side && key.id.as_str() == id));
        Some(entity)
    }

    /// Marks an entity for removal at the next [`EntityStore::flush_removals`].
    ///
    /// The entity stays readable until then. Returns `false` if the entity is
    /// absent or already scheduled.
    pub fn schedule_removal(&mut self, side: &str, id: &str) -> bool {
        if !self.contains(side, id) || self.is_pending_removal(side, id) {
            return false;
        }
        self.pending_removals.push(EntityKey::new(side, id));
        true
    }

    /// Returns `true` if the entity is scheduled for removal.
    #[must_use]
    pub fn is_pending_removal(&self, side: &str, id: &str) -> bool {
        self.pending_removals
            .iter()
            .any(|key| key.side_id.as_str() == side && key.id.as_str() == id)
    }

    /// Keys scheduled for removal, in scheduling order.
    #[must_use]
    pub fn pending_removals(&self) -> &[EntityKey] {
        &self.pending_removals
    }

    /// Removes every scheduled entity and returns them in scheduling order.
    pub fn flush_removals(&mut self) -> Vec<Entity> {
        let pending = std::mem::take(&mut self.pending_removals);
        pending
            .iter()
            .filter_map(|key| self.remove(key.side_id.as_str(), key.id.as_str()))
            .collect()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rosters.iter().map(|roster| roster.entities.len()).sum()
    }

    /// Returns `true` if the store holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rosters.iter().all(|roster| roster.entities.is_empty())
    }

    /// Number of entities on one side (0 for an unknown side).
    #[must_use]
    pub fn side_len(&self, side: &str) -> usize {
        self.side_index
            .get(side)
            .map_or(0, |&index| self.rosters[index].entities.len())
    }

    /// Iterates one side's entities in insertion order.
    pub fn iter_side<'a>(&'a self, side: &str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.side_index
            .get(side)
            .map(|&index| &self.rosters[index])
            .into_iter()
            .flat_map(Roster::iter)
    }

    /// Iterates all entities: sides in creation order, then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.rosters.iter().flat_map(Roster::iter)
    }

    /// Keys of all entities in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.iter().map(Entity::key)
    }

    /// Calls `f` for each entity of one side, in insertion order.
    pub fn for_each_in_side(&self, side: &str, f: impl FnMut(&Entity)) {
        self.iter_side(side).for_each(f);
    }

    /// Calls `f` for each entity, in iteration order.
    pub fn for_each_entity(&self, f: impl FnMut(&Entity)) {
        self.iter().for_each(f);
    }

    /// Visits each entity mutably, in iteration order.
    ///
    /// Returning [`Visit::Remove`] schedules the visited entity for removal;
    /// it is not dropped until [`EntityStore::flush_removals`], so the walk is
    /// never disturbed.
    pub fn for_each_entity_mut(&mut self, mut f: impl FnMut(&mut Entity) -> Visit) {
        let mut scheduled = Vec::new();
        for roster in &mut self.rosters {
            for id in &roster.order {
                if let Some(entity) = roster.entities.get_mut(id) {
                    if f(entity) == Visit::Remove {
                        scheduled.push(entity.key());
                    }
                }
            }
        }
        for key in scheduled {
            self.schedule_removal(key.side_id.as_str(), key.id.as_str());
        }
    }
}

impl Roster {
    fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }
}
