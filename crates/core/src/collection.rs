//! Identity-keyed entity collections.

use std::collections::HashMap;
use std::collections::hash_map;

use crate::entity::{Entity, EventKind};

/// Mapping from entity id to entity.
///
/// Adding an entity whose id is already present replaces the stored one (last
/// write wins); removing an absent entity is a no-op. Iteration order is
/// unspecified.
#[derive(Debug, Clone)]
pub struct Entities<E: Entity> {
    map: HashMap<E::Id, E>,
}

impl<E: Entity> Default for Entities<E> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<E: Entity> Entities<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id.
    pub fn add(&mut self, entity: E) {
        self.map.insert(entity.id().clone(), entity);
    }

    /// Remove by id, if present.
    pub fn remove(&mut self, entity: &E) -> Option<E> {
        self.map.remove(entity.id())
    }

    pub fn remove_id(&mut self, id: &E::Id) -> Option<E> {
        self.map.remove(id)
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.map.get(id)
    }

    pub fn get_mut(&mut self, id: &E::Id) -> Option<&mut E> {
        self.map.get_mut(id)
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> hash_map::Values<'_, E::Id, E> {
        self.map.values()
    }

    pub fn iter_mut(&mut self) -> hash_map::ValuesMut<'_, E::Id, E> {
        self.map.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &E::Id> + '_ {
        self.map.keys()
    }

    /// Entities whose log contains at least one event of `kind`.
    pub fn with_event(&self, kind: EventKind) -> Entities<E> {
        self.matching(|e| e.has_event(kind))
    }

    /// Entities whose log contains no event of `kind`.
    pub fn without_event(&self, kind: EventKind) -> Entities<E> {
        self.matching(|e| !e.has_event(kind))
    }

    pub fn matching(&self, predicate: impl Fn(&E) -> bool) -> Entities<E> {
        self.iter().filter(|&e| predicate(e)).cloned().collect()
    }

    pub fn into_vec(self) -> Vec<E> {
        self.map.into_values().collect()
    }
}

impl<E: Entity + PartialEq> PartialEq for Entities<E> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<E: Entity + Eq> Eq for Entities<E> {}

impl<E: Entity> FromIterator<E> for Entities<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut entities = Self::new();
        entities.extend(iter);
        entities
    }
}

impl<E: Entity> Extend<E> for Entities<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for entity in iter {
            self.add(entity);
        }
    }
}

impl<'a, E: Entity> IntoIterator for &'a Entities<E> {
    type Item = &'a E;
    type IntoIter = hash_map::Values<'a, E::Id, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.values()
    }
}

impl<E: Entity> IntoIterator for Entities<E> {
    type Item = E;
    type IntoIter = hash_map::IntoValues<E::Id, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_values()
    }
}
