//! Domain failures of the tracking context.
//!
//! These are expected outcomes of user input, returned as values and
//! recoverable by the caller.

use thiserror::Error;

use crate::ids::{DayId, RecordId};

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[error("water amount cannot be negative")]
pub struct NegativeWaterAmount;

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[error("weight cannot be negative")]
pub struct NegativeWeightAmount;

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[error("time must be in UTC")]
pub struct NotUtc;

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[error("weight is outside 30..=150 kg; no suitable water balance")]
pub struct ExtremeWeightForSuitableWaterBalance;

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[error("record is already cancelled")]
pub struct CancelledRecordToCancel;

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error(transparent)]
    ExtremeWeight(#[from] ExtremeWeightForSuitableWaterBalance),

    #[error("neither a target nor a weight to derive one from")]
    NoWeightForSuitableWaterBalance,
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum CancellationError {
    #[error("no record {record_id} to cancel")]
    NoRecordToCancel { record_id: RecordId },

    #[error("record {record_id} has no day")]
    NoRecordDayToCancel { record_id: RecordId },

    #[error("record {record_id} of day {day_id} is already cancelled")]
    CancelledRecordToCancel { record_id: RecordId, day_id: DayId },

    #[error("cancelling record {record_id} would take day {day_id} below zero")]
    DayBalanceBelowZero { record_id: RecordId, day_id: DayId },
}
