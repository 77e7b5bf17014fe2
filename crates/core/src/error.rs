//! Core error model.
//!
//! Only programming-contract violations live here. Domain validation failures
//! are ordinary `Result` errors owned by the value objects that produce them.

use thiserror::Error;

/// An identifier failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {id_type}: {reason}")]
pub struct IdError {
    id_type: &'static str,
    reason: String,
}

impl IdError {
    pub fn new(id_type: &'static str, reason: impl Into<String>) -> Self {
        Self {
            id_type,
            reason: reason.into(),
        }
    }

    pub fn id_type(&self) -> &'static str {
        self.id_type
    }
}

/// A safe value was built through the trusted path without being marked valid.
///
/// This is a caller bug: retrying cannot fix it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsafe construction of {value_type}: value was not marked as validated")]
pub struct UnsafeValueError {
    value_type: &'static str,
}

impl UnsafeValueError {
    pub fn new(value_type: &'static str) -> Self {
        Self { value_type }
    }

    pub fn value_type(&self) -> &'static str {
        self.value_type
    }
}
