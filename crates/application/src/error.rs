//! Fatal framework errors.
//!
//! Every variant signals a wiring bug or an infrastructure failure. Use cases
//! propagate them unchanged; none of them is retried.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// `commit` or `rollback` without a matching `begin`.
    #[error("no transaction is open")]
    NoTransaction,

    /// `begin` on a session that is already inside a transaction.
    #[error("a transaction is already open on this session")]
    NestedTransaction,

    /// A thread panicked while holding the storage lock.
    #[error("storage lock poisoned")]
    Poisoned,

    /// The underlying session reported a failure.
    #[error("session failure: {0}")]
    Session(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapperError {
    /// Update or delete of a row that does not exist.
    #[error("{entity_type} {id} is not persisted")]
    Missing { entity_type: &'static str, id: String },

    #[error("storage failure: {0}")]
    Storage(String),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl MapperError {
    pub fn missing(entity_type: &'static str, id: impl ToString) -> Self {
        Self::Missing {
            entity_type,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OutputError {
    /// The effect tracks a type that no mapper was registered for.
    #[error("no mapper registered for {0}")]
    NoMapper(&'static str),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}
