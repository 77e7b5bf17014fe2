//! Water-intake tracking bounded context.
//!
//! Domain rules live in [`values`], [`record`], [`day`] and [`user`] and are
//! deterministic (no IO). [`ports`] declares what the context needs from the
//! outside, and [`cases`] wires the use cases through the transaction and
//! output machinery of `aqua-application`.

pub mod cases;
pub mod day;
pub mod error;
pub mod ids;
pub mod ports;
pub mod record;
pub mod user;
pub mod values;

pub use cases::{Cancelled, Reading, Tracking, TrackingError, TrackingMappers, Written};
pub use day::{Day, DayEvent};
pub use error::{
    CancelledRecordToCancel, CancellationError, ExtremeWeightForSuitableWaterBalance,
    NegativeWaterAmount, NegativeWeightAmount, NotUtc, RegistrationError,
};
pub use ids::{DayId, RecordId, UserId};
pub use ports::{TrackingEffectLog, TrackingLogger, Users, UsersError};
pub use record::{Record, RecordEvent};
pub use user::{CancellationOutput, User, UserEvent, WritingOutput};
pub use values::{DayResult, Glass, Target, Time, Water, WaterBalance, Weight};
