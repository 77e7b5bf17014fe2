//! `aqua-core`: change-tracking building blocks shared by every bounded context.
//!
//! This crate contains **pure** primitives (no IO, no async): entity identity,
//! per-unit-of-work event logs, the effect that accumulates tracked entities,
//! per-type indexes over it, and the safe-value construction guard.

pub mod collection;
pub mod effect;
pub mod entity;
pub mod error;
pub mod id;
pub mod index;
pub mod value_object;

pub use collection::Entities;
pub use effect::{Effect, TrackedType};
pub use entity::{Entity, EntityEvent, EventKind, EventLog};
pub use error::{IdError, UnsafeValueError};
pub use index::Index;
pub use value_object::{SafeValue, Validated, ValueObject};

#[doc(hidden)]
pub use uuid::Uuid;
