//! Per-type view over the entities tracked by an [`Effect`](crate::Effect).

use crate::collection::Entities;
use crate::entity::{Entity, EntityEvent, EventKind};

/// Snapshot of the tracked entities of one type, with the standard
/// persistence partitions.
///
/// Partitions may overlap: an entity created and then mutated in the same
/// unit of work is both new and dirty.
#[derive(Debug, Clone)]
pub struct Index<E: Entity> {
    entities: Entities<E>,
}

impl<E: Entity> Index<E> {
    pub(crate) fn new(entities: Entities<E>) -> Self {
        Self { entities }
    }

    /// Every tracked entity of this type.
    pub fn entities(&self) -> &Entities<E> {
        &self.entities
    }

    /// Entities with a `Created` event.
    pub fn new_entities(&self) -> Entities<E> {
        self.entities_with_event(EventKind::Created)
    }

    /// Entities with a `Mutated` event.
    pub fn dirty_entities(&self) -> Entities<E> {
        self.entities_with_event(EventKind::Mutated)
    }

    /// Entities with a `Deleted` event.
    pub fn deleted_entities(&self) -> Entities<E> {
        self.entities_with_event(EventKind::Deleted)
    }

    pub fn entities_with_event(&self, kind: EventKind) -> Entities<E> {
        self.entities.with_event(kind)
    }

    pub fn entities_without_event(&self, kind: EventKind) -> Entities<E> {
        self.entities.without_event(kind)
    }

    /// Entities whose log holds at least one event satisfying `predicate`.
    pub fn entities_matching(&self, predicate: impl Fn(&E::Event) -> bool) -> Entities<E> {
        self.entities
            .matching(|entity| entity.events().iter().any(&predicate))
    }

    /// Entities with an event of the given name.
    pub fn entities_named(&self, name: &str) -> Entities<E> {
        self.entities_matching(|event| event.name() == name)
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn into_entities(self) -> Entities<E> {
        self.entities
    }
}
