//! Entity trait: identity + an append-only log of what happened during the
//! current unit of work.

use core::fmt::Debug;
use core::hash::Hash;

use crate::effect::Effect;

/// Classification used to partition entities by the events in their log.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The entity came into existence during this unit of work.
    Created,
    /// Persisted fields of the entity changed.
    Mutated,
    /// The entity was removed.
    Deleted,
    /// Informational only; no persisted change.
    Commenting,
    /// An aggregate-specific event, matched by [`EntityEvent::name`].
    Named(&'static str),
}

/// An immutable fact about one entity.
///
/// Every event has a base [`EventKind`] (what it means for persistence) and a
/// stable name (what it means for the aggregate). A `record.cancelled` event
/// is `Mutated` for dispatch and `Named("record.cancelled")` for audit logging.
pub trait EntityEvent: Clone + Debug + Send + Sync + 'static {
    /// Base kind of this event.
    fn kind(&self) -> EventKind;

    /// Stable event name (e.g. "tracking.record.cancelled").
    fn name(&self) -> &'static str;

    /// Whether this event matches `kind`, either by base kind or by name.
    fn is(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Named(name) => self.name() == name,
            base => self.kind() == base,
        }
    }
}

/// Ordered, append-only sequence of events for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog<Ev> {
    events: Vec<Ev>,
}

impl<Ev> Default for EventLog<Ev> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<Ev: EntityEvent> EventLog<Ev> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&mut self, event: Ev) {
        self.events.push(event);
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Ev> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[Ev] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether at least one event matches `kind`.
    pub fn contains(&self, kind: EventKind) -> bool {
        self.events.iter().any(|e| e.is(kind))
    }

    pub fn with_kind(&self, kind: EventKind) -> impl Iterator<Item = &Ev> + '_ {
        self.events.iter().filter(move |e| e.is(kind))
    }

    pub fn last_with_kind(&self, kind: EventKind) -> Option<&Ev> {
        self.events.iter().rev().find(|e| e.is(kind))
    }

    /// Drop every recorded event (start of a new unit of work).
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<'a, Ev> IntoIterator for &'a EventLog<Ev> {
    type Item = &'a Ev;
    type IntoIter = core::slice::Iter<'a, Ev>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Identity-bearing domain object with an event log.
///
/// Two entities with the same id are the same logical row regardless of field
/// values or log contents; implement equality with
/// [`impl_identity_eq!`](crate::impl_identity_eq) rather than deriving it.
/// The id is assigned at creation and must never change, so implementors
/// expose it only through [`Entity::id`].
pub trait Entity: Clone + Send + Sync + 'static {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Events this entity can record.
    type Event: EntityEvent;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    fn events(&self) -> &EventLog<Self::Event>;

    fn events_mut(&mut self) -> &mut EventLog<Self::Event>;

    fn has_event(&self, kind: EventKind) -> bool {
        self.events().contains(kind)
    }

    fn is_new(&self) -> bool {
        self.has_event(EventKind::Created)
    }

    fn is_dirty(&self) -> bool {
        self.has_event(EventKind::Mutated)
    }

    fn is_deleted(&self) -> bool {
        self.has_event(EventKind::Deleted)
    }

    /// Same logical row as `other`.
    fn is_same_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Forget recorded events and stop tracking this entity in `effect`.
    fn reset_events(&mut self, effect: &mut Effect)
    where
        Self: Sized,
    {
        self.events_mut().clear();
        effect.ignore(self);
    }
}

/// Implements `PartialEq`, `Eq` and `Hash` for entities by id alone.
#[macro_export]
macro_rules! impl_identity_eq {
    ($($t:ty),+ $(,)?) => {
        $(
            impl PartialEq for $t {
                fn eq(&self, other: &Self) -> bool {
                    $crate::Entity::id(self) == $crate::Entity::id(other)
                }
            }

            impl Eq for $t {}

            impl core::hash::Hash for $t {
                fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                    core::hash::Hash::hash($crate::Entity::id(self), state);
                }
            }
        )+
    };
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small entities shared by the core unit tests.

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum NoteEvent {
        Created,
        Edited,
        Deleted,
        Pinned,
    }

    impl EntityEvent for NoteEvent {
        fn kind(&self) -> EventKind {
            match self {
                NoteEvent::Created => EventKind::Created,
                NoteEvent::Edited => EventKind::Mutated,
                NoteEvent::Deleted => EventKind::Deleted,
                NoteEvent::Pinned => EventKind::Mutated,
            }
        }

        fn name(&self) -> &'static str {
            match self {
                NoteEvent::Created => "note.created",
                NoteEvent::Edited => "note.edited",
                NoteEvent::Deleted => "note.deleted",
                NoteEvent::Pinned => "note.pinned",
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Note {
        id: u32,
        pub text: String,
        events: EventLog<NoteEvent>,
    }

    impl Note {
        pub fn new(id: u32, text: &str, events: Vec<NoteEvent>) -> Self {
            let mut log = EventLog::new();
            for e in events {
                log.record(e);
            }
            Self {
                id,
                text: text.to_string(),
                events: log,
            }
        }
    }

    impl Entity for Note {
        type Id = u32;
        type Event = NoteEvent;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn events(&self) -> &EventLog<NoteEvent> {
            &self.events
        }

        fn events_mut(&mut self) -> &mut EventLog<NoteEvent> {
            &mut self.events
        }
    }

    crate::impl_identity_eq!(Note);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TagEvent {
        Created,
    }

    impl EntityEvent for TagEvent {
        fn kind(&self) -> EventKind {
            EventKind::Created
        }

        fn name(&self) -> &'static str {
            "tag.created"
        }
    }

    #[derive(Debug, Clone)]
    pub struct Tag {
        id: u32,
        events: EventLog<TagEvent>,
    }

    impl Tag {
        pub fn created(id: u32) -> Self {
            let mut events = EventLog::new();
            events.record(TagEvent::Created);
            Self { id, events }
        }
    }

    impl Entity for Tag {
        type Id = u32;
        type Event = TagEvent;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn events(&self) -> &EventLog<TagEvent> {
            &self.events
        }

        fn events_mut(&mut self) -> &mut EventLog<TagEvent> {
            &mut self.events
        }
    }

    crate::impl_identity_eq!(Tag);
}
