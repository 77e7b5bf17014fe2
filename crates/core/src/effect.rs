//! Per-use-case accumulator of tracked entity changes.
//!
//! Domain operations call [`Effect::consider`] every time they record an event
//! on an entity. At the end of the use case the output pipeline reads the
//! effect through per-type [`Index`] views and replays the changes into
//! persistence exactly once.
//!
//! An effect is a plain value: every bounded context creates its own per use
//! case invocation, and nothing is shared process-wide.

use core::any::{Any, TypeId};

use crate::collection::Entities;
use crate::entity::Entity;
use crate::index::Index;

/// Type-erased view over one tracked `Entities<E>`.
trait TrackedSet: Send + Sync {
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Entity> TrackedSet for Entities<E> {
    fn len(&self) -> usize {
        Entities::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Slot {
    ty: TrackedType,
    set: Box<dyn TrackedSet>,
}

/// Identity of an entity type tracked by an [`Effect`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TrackedType {
    id: TypeId,
    name: &'static str,
}

impl TrackedType {
    pub fn of<E: Entity>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: core::any::type_name::<E>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Tracked entities across all types plus a one-way `cancelled` flag.
///
/// Types are kept in order of first consideration.
#[derive(Default)]
pub struct Effect {
    slots: Vec<Slot>,
    cancelled: bool,
}

impl Effect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `entity`, replacing a previously tracked instance with the same id.
    ///
    /// The effect keeps a copy, so call this again after recording further
    /// events to capture the latest log.
    pub fn consider<E: Entity>(&mut self, entity: &E) {
        self.set_mut::<E>().add(entity.clone());
    }

    pub fn consider_all<'a, E: Entity>(&mut self, entities: impl IntoIterator<Item = &'a E>) {
        let set = self.set_mut::<E>();
        for entity in entities {
            set.add(entity.clone());
        }
    }

    /// Stop tracking `entity`; a later [`Effect::consider`] re-adds it.
    pub fn ignore<E: Entity>(&mut self, entity: &E) {
        if let Some(set) = self.set_of_mut::<E>() {
            set.remove(entity);
        }
    }

    pub fn ignore_all<'a, E: Entity>(&mut self, entities: impl IntoIterator<Item = &'a E>) {
        if let Some(set) = self.set_of_mut::<E>() {
            for entity in entities {
                set.remove(entity);
            }
        }
    }

    /// Void the effect.
    ///
    /// Irreversible. Later `consider`/`ignore` calls are accepted, but the
    /// output pipeline treats a cancelled effect as empty.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Live view of the tracked entities of type `E`.
    ///
    /// Computed from the current state on every call.
    pub fn entities_that<E: Entity>(&self) -> Index<E> {
        let entities = self.set_of::<E>().cloned().unwrap_or_default();
        Index::new(entities)
    }

    /// Types with at least one tracked entity, in order of first consideration.
    pub fn tracked_types(&self) -> impl Iterator<Item = TrackedType> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.set.len() > 0)
            .map(|slot| slot.ty)
    }

    /// Names of the tracked types, in order of first consideration.
    pub fn entity_types(&self) -> Vec<&'static str> {
        self.tracked_types().map(|ty| ty.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked_types().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().map(|slot| slot.set.len()).sum()
    }

    fn set_of<E: Entity>(&self) -> Option<&Entities<E>> {
        self.slots
            .iter()
            .find_map(|slot| slot.set.as_any().downcast_ref::<Entities<E>>())
    }

    fn set_of_mut<E: Entity>(&mut self) -> Option<&mut Entities<E>> {
        self.slots
            .iter_mut()
            .find_map(|slot| slot.set.as_any_mut().downcast_mut::<Entities<E>>())
    }

    fn set_mut<E: Entity>(&mut self) -> &mut Entities<E> {
        let ty = TrackedType::of::<E>();
        let position = match self.slots.iter().position(|slot| slot.ty == ty) {
            Some(position) => position,
            None => {
                self.slots.push(Slot {
                    ty,
                    set: Box::new(Entities::<E>::new()),
                });
                self.slots.len() - 1
            }
        };

        // `ty` identifies the boxed set, so the downcast always succeeds.
        match self.slots[position]
            .set
            .as_any_mut()
            .downcast_mut::<Entities<E>>()
        {
            Some(set) => set,
            None => unreachable!("slot for {} holds a different entity type", ty.name),
        }
    }
}

impl core::fmt::Debug for Effect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for slot in &self.slots {
            map.entry(&slot.ty.name, &slot.set.len());
        }
        map.finish()?;
        if self.cancelled {
            f.write_str(" (cancelled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EventKind;
    use crate::entity::fixtures::{Note, NoteEvent, Tag};

    #[test]
    fn consider_twice_keeps_latest_version() {
        let mut effect = Effect::new();
        effect.consider(&Note::new(1, "draft", vec![NoteEvent::Created]));
        effect.consider(&Note::new(
            1,
            "final",
            vec![NoteEvent::Created, NoteEvent::Edited],
        ));

        let index = effect.entities_that::<Note>();
        assert_eq!(index.len(), 1);
        let note = index.get(&1).unwrap();
        assert_eq!(note.text, "final");
        assert_eq!(note.events().len(), 2);
        assert_eq!(index.dirty_entities().len(), 1);
    }

    #[test]
    fn ignore_removes_and_consider_readds() {
        let mut effect = Effect::new();
        let note = Note::new(1, "x", vec![NoteEvent::Edited]);

        effect.consider(&note);
        effect.ignore(&note);
        assert!(effect.entities_that::<Note>().is_empty());

        effect.consider(&note);
        assert_eq!(effect.entities_that::<Note>().len(), 1);
    }

    #[test]
    fn ignore_of_untracked_type_is_noop() {
        let mut effect = Effect::new();
        effect.ignore(&Tag::created(1));
        assert!(effect.is_empty());
    }

    #[test]
    fn types_are_partitioned_and_ordered_by_first_consideration() {
        let mut effect = Effect::new();
        effect.consider(&Tag::created(10));
        effect.consider(&Note::new(10, "same id, other type", vec![NoteEvent::Created]));

        let names: Vec<_> = effect.tracked_types().map(|t| t.name()).collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("Tag"));
        assert!(names[1].ends_with("Note"));
        assert_eq!(effect.entities_that::<Tag>().len(), 1);
        assert_eq!(effect.entities_that::<Note>().len(), 1);
        assert_eq!(effect.len(), 2);
    }

    #[test]
    fn index_is_live_not_cached() {
        let mut effect = Effect::new();
        let before = effect.entities_that::<Note>();

        effect.consider(&Note::new(1, "x", vec![NoteEvent::Created]));

        assert!(before.is_empty());
        assert_eq!(effect.entities_that::<Note>().new_entities().len(), 1);
    }

    #[test]
    fn cancel_is_one_way() {
        let mut effect = Effect::new();
        effect.cancel();
        effect.consider(&Note::new(1, "x", vec![NoteEvent::Created]));
        effect.ignore(&Note::new(2, "y", vec![]));

        assert!(effect.is_cancelled());
        // The tracked set still reflects calls; consumers decide to skip it.
        assert_eq!(
            effect
                .entities_that::<Note>()
                .entities_with_event(EventKind::Created)
                .len(),
            1
        );
    }

    #[test]
    fn consider_all_and_ignore_all_work_in_bulk() {
        let notes = vec![
            Note::new(1, "a", vec![NoteEvent::Created]),
            Note::new(2, "b", vec![NoteEvent::Created]),
            Note::new(3, "c", vec![NoteEvent::Created]),
        ];
        let mut effect = Effect::new();
        effect.consider_all(&notes);
        effect.ignore_all(&notes[..2]);

        let index = effect.entities_that::<Note>();
        assert_eq!(index.len(), 1);
        assert!(index.get(&3).is_some());
    }
}
