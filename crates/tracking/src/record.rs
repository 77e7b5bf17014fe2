//! A single act of drinking.

use aqua_core::{Effect, Entity, EntityEvent, EventKind, EventLog};

use crate::error::CancelledRecordToCancel;
use crate::ids::{RecordId, UserId};
use crate::values::{Time, Water, WaterBalance};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEvent {
    Created,
    Cancelled,
}

impl RecordEvent {
    pub const CANCELLED: &'static str = "tracking.record.cancelled";
}

impl EntityEvent for RecordEvent {
    fn kind(&self) -> EventKind {
        match self {
            RecordEvent::Created => EventKind::Created,
            RecordEvent::Cancelled => EventKind::Mutated,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            RecordEvent::Created => "tracking.record.created",
            RecordEvent::Cancelled => Self::CANCELLED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    id: RecordId,
    user_id: UserId,
    drunk_water: Water,
    recording_time: Time,
    is_cancelled: bool,
    events: EventLog<RecordEvent>,
}

impl Record {
    /// Record `drunk_water` at `now` and track it in `effect`.
    pub fn create(user_id: UserId, drunk_water: Water, now: Time, effect: &mut Effect) -> Self {
        let mut record = Self::restore(RecordId::new(), user_id, drunk_water, now, false);
        record.events.record(RecordEvent::Created);
        effect.consider(&record);
        record
    }

    /// Rebuild a persisted record with an empty event log.
    pub fn restore(
        id: RecordId,
        user_id: UserId,
        drunk_water: Water,
        recording_time: Time,
        is_cancelled: bool,
    ) -> Self {
        Self {
            id,
            user_id,
            drunk_water,
            recording_time,
            is_cancelled,
            events: EventLog::new(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn drunk_water(&self) -> Water {
        self.drunk_water
    }

    pub fn recording_time(&self) -> Time {
        self.recording_time
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled
    }

    pub fn cancel(&mut self, effect: &mut Effect) -> Result<(), CancelledRecordToCancel> {
        if self.is_cancelled {
            return Err(CancelledRecordToCancel);
        }

        self.is_cancelled = true;
        self.events.record(RecordEvent::Cancelled);
        effect.consider(self);
        Ok(())
    }
}

impl Entity for Record {
    type Id = RecordId;
    type Event = RecordEvent;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn events(&self) -> &EventLog<RecordEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventLog<RecordEvent> {
        &mut self.events
    }
}

aqua_core::impl_identity_eq!(Record);

/// Balance made of the water of `records`.
pub fn water_balance_from<'a>(records: impl IntoIterator<Item = &'a Record>) -> WaterBalance {
    let water = records
        .into_iter()
        .map(Record::drunk_water)
        .fold(Water::ZERO, |sum, water| sum + water);
    WaterBalance::new(water)
}
