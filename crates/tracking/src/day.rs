//! One calendar day of a user's drinking.

use aqua_core::{Effect, Entity, EntityEvent, EventKind, EventLog};
use chrono::NaiveDate;

use crate::error::NegativeWaterAmount;
use crate::ids::{DayId, UserId};
use crate::record::Record;
use crate::values::{DayResult, Target, Time, WaterBalance};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayEvent {
    Created,
    NewWaterBalance(WaterBalance),
}

impl EntityEvent for DayEvent {
    fn kind(&self) -> EventKind {
        match self {
            DayEvent::Created => EventKind::Created,
            DayEvent::NewWaterBalance(_) => EventKind::Mutated,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DayEvent::Created => "tracking.day.created",
            DayEvent::NewWaterBalance(_) => "tracking.day.new_water_balance",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Day {
    id: DayId,
    user_id: UserId,
    date: NaiveDate,
    target: Target,
    water_balance: WaterBalance,
    pinned_result: Option<DayResult>,
    events: EventLog<DayEvent>,
}

impl Day {
    /// Open the day containing `now` with an empty balance.
    pub fn create(user_id: UserId, now: Time, target: Target, effect: &mut Effect) -> Self {
        let mut day = Self::restore(
            DayId::new(),
            user_id,
            now.date(),
            target,
            WaterBalance::default(),
            None,
        );
        day.events.record(DayEvent::Created);
        effect.consider(&day);
        day
    }

    /// Rebuild a persisted day with an empty event log.
    pub fn restore(
        id: DayId,
        user_id: UserId,
        date: NaiveDate,
        target: Target,
        water_balance: WaterBalance,
        pinned_result: Option<DayResult>,
    ) -> Self {
        Self {
            id,
            user_id,
            date,
            target,
            water_balance,
            pinned_result,
            events: EventLog::new(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn water_balance(&self) -> WaterBalance {
        self.water_balance
    }

    pub fn pinned_result(&self) -> Option<DayResult> {
        self.pinned_result
    }

    pub fn is_result_pinned(&self) -> bool {
        self.pinned_result.is_some()
    }

    /// Result computed from the target and the current balance.
    pub fn correct_result(&self) -> DayResult {
        self.target.result_for(self.water_balance)
    }

    pub fn result(&self) -> DayResult {
        self.pinned_result.unwrap_or_else(|| self.correct_result())
    }

    /// Add the water of `record` to the balance.
    ///
    /// Records nothing when the balance does not change.
    pub fn take_into_consideration(&mut self, record: &Record, effect: &mut Effect) {
        let balance = WaterBalance::new(self.water_balance.water() + record.drunk_water());
        if balance == self.water_balance {
            return;
        }
        self.change_balance(balance, effect);
    }

    /// Remove the water of `record` from the balance.
    pub fn ignore(
        &mut self,
        record: &Record,
        effect: &mut Effect,
    ) -> Result<(), NegativeWaterAmount> {
        let water = (self.water_balance.water() - record.drunk_water())?;
        self.change_balance(WaterBalance::new(water), effect);
        Ok(())
    }

    fn change_balance(&mut self, balance: WaterBalance, effect: &mut Effect) {
        self.water_balance = balance;
        self.events.record(DayEvent::NewWaterBalance(balance));
        effect.consider(self);
    }
}

impl Entity for Day {
    type Id = DayId;
    type Event = DayEvent;

    fn id(&self) -> &DayId {
        &self.id
    }

    fn events(&self) -> &EventLog<DayEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventLog<DayEvent> {
        &mut self.events
    }
}

aqua_core::impl_identity_eq!(Day);
