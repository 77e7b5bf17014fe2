//! User aggregate root: owns its days and records.

use aqua_core::{Effect, Entities, Entity, EntityEvent, EventKind, EventLog};
use chrono::NaiveDate;

use crate::day::Day;
use crate::error::{CancellationError, RegistrationError};
use crate::ids::{RecordId, UserId};
use crate::record::Record;
use crate::values::{Glass, Target, Time, Water, WaterBalance, Weight};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Registered,
}

impl EntityEvent for UserEvent {
    fn kind(&self) -> EventKind {
        EventKind::Created
    }

    fn name(&self) -> &'static str {
        "tracking.user.registered"
    }
}

/// What a write produced.
#[derive(Debug, Clone)]
pub struct WritingOutput {
    pub new_record: Record,
    /// Records of the same day written before `new_record`.
    pub previous_records: Vec<Record>,
    pub day: Day,
}

#[derive(Debug, Clone)]
pub struct CancellationOutput {
    pub day: Day,
    pub cancelled_record: Record,
}

#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    weight: Option<Weight>,
    glass: Glass,
    target: Target,
    days: Entities<Day>,
    records: Entities<Record>,
    events: EventLog<UserEvent>,
}

impl User {
    /// Register a user of the tracking context.
    ///
    /// Without an explicit `target` one is derived from `weight`; without
    /// `glass` the default one is used.
    pub fn register(
        id: UserId,
        weight: Option<Weight>,
        glass: Option<Glass>,
        target: Option<Target>,
        effect: &mut Effect,
    ) -> Result<Self, RegistrationError> {
        let target = match (target, weight) {
            (Some(target), _) => target,
            (None, Some(weight)) => Target::new(WaterBalance::suitable_when(weight)?),
            (None, None) => return Err(RegistrationError::NoWeightForSuitableWaterBalance),
        };

        let mut user = Self::restore(
            id,
            weight,
            glass.unwrap_or_default(),
            target,
            Entities::new(),
            Entities::new(),
        );
        user.events.record(UserEvent::Registered);
        effect.consider(&user);
        Ok(user)
    }

    /// Rebuild a persisted user with an empty event log.
    pub fn restore(
        id: UserId,
        weight: Option<Weight>,
        glass: Glass,
        target: Target,
        days: Entities<Day>,
        records: Entities<Record>,
    ) -> Self {
        Self {
            id,
            weight,
            glass,
            target,
            days,
            records,
            events: EventLog::new(),
        }
    }

    pub fn weight(&self) -> Option<Weight> {
        self.weight
    }

    pub fn glass(&self) -> Glass {
        self.glass
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn days(&self) -> &Entities<Day> {
        &self.days
    }

    pub fn records(&self) -> &Entities<Record> {
        &self.records
    }

    /// Suitable balance for the current weight.
    pub fn suitable_water_balance(&self) -> Result<WaterBalance, RegistrationError> {
        let weight = self
            .weight
            .ok_or(RegistrationError::NoWeightForSuitableWaterBalance)?;
        Ok(WaterBalance::suitable_when(weight)?)
    }

    pub fn day_on(&self, date: NaiveDate) -> Option<&Day> {
        self.days.iter().find(|day| day.date() == date)
    }

    /// Records written on `date`, oldest first.
    pub fn records_on(&self, date: NaiveDate) -> Vec<Record> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .filter(|record| record.recording_time().date() == date)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.recording_time());
        records
    }

    /// Drink `water` (a glass when `None`) at `now`.
    ///
    /// Opens the day on its first write.
    pub fn write_water(
        &mut self,
        water: Option<Water>,
        now: Time,
        effect: &mut Effect,
    ) -> WritingOutput {
        let water = water.unwrap_or_else(|| self.glass.capacity());

        let mut day = match self.day_on(now.date()) {
            Some(day) => day.clone(),
            None => Day::create(self.id, now, self.target, effect),
        };

        let previous_records = self.records_on(day.date());
        let new_record = Record::create(self.id, water, now, effect);
        day.take_into_consideration(&new_record, effect);

        self.records.add(new_record.clone());
        self.days.add(day.clone());

        WritingOutput {
            new_record,
            previous_records,
            day,
        }
    }

    /// Cancel a record and take its water out of its day.
    ///
    /// The aggregate is left untouched when this fails.
    pub fn cancel_record(
        &mut self,
        record_id: RecordId,
        effect: &mut Effect,
    ) -> Result<CancellationOutput, CancellationError> {
        let mut record = self
            .records
            .get(&record_id)
            .cloned()
            .ok_or(CancellationError::NoRecordToCancel { record_id })?;

        let mut day = self
            .day_on(record.recording_time().date())
            .cloned()
            .ok_or(CancellationError::NoRecordDayToCancel { record_id })?;
        let day_id = *day.id();

        record
            .cancel(effect)
            .map_err(|_| CancellationError::CancelledRecordToCancel { record_id, day_id })?;
        day.ignore(&record, effect)
            .map_err(|_| CancellationError::DayBalanceBelowZero { record_id, day_id })?;

        self.records.add(record.clone());
        self.days.add(day.clone());

        Ok(CancellationOutput {
            day,
            cancelled_record: record,
        })
    }
}

impl Entity for User {
    type Id = UserId;
    type Event = UserEvent;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn events(&self) -> &EventLog<UserEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventLog<UserEvent> {
        &mut self.events
    }
}

aqua_core::impl_identity_eq!(User);
