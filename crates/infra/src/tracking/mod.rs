//! In-memory persistence of the tracking context.
//!
//! Intended for tests/dev. Rows live in a [`TransactionalStorage`], so every
//! use case can run inside a [`StorageTransaction`](crate::storage::StorageTransaction).

pub mod mappers;
pub mod rows;
pub mod users;

pub use mappers::{InMemoryMapper, InMemoryMapperFactory};
pub use rows::{DayRow, RecordRow, TrackingState, UserRow};
pub use users::InMemoryUsers;
