//! What the tracking context needs from the outside.

use std::sync::Arc;

use aqua_application::{EffectLog, TransactionError};
use aqua_core::Effect;
use thiserror::Error;

use crate::day::Day;
use crate::ids::UserId;
use crate::record::{Record, RecordEvent};
use crate::user::User;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsersError {
    #[error("storage failure: {0}")]
    Storage(String),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Repository of user aggregates.
///
/// Returned aggregates are copies: changing them does not touch storage.
#[async_trait::async_trait]
pub trait Users: Send + Sync {
    async fn user_with_id(&self, user_id: UserId) -> Result<Option<User>, UsersError>;

    async fn contains_with_id(&self, user_id: UserId) -> Result<bool, UsersError> {
        Ok(self.user_with_id(user_id).await?.is_some())
    }
}

#[async_trait::async_trait]
impl<U> Users for Arc<U>
where
    U: Users + ?Sized,
{
    async fn user_with_id(&self, user_id: UserId) -> Result<Option<User>, UsersError> {
        (**self).user_with_id(user_id).await
    }

    async fn contains_with_id(&self, user_id: UserId) -> Result<bool, UsersError> {
        (**self).contains_with_id(user_id).await
    }
}

/// Audit log of the tracking context, one method per significant event.
#[async_trait::async_trait]
pub trait TrackingLogger: Send + Sync {
    async fn log_registered_user(&self, user: &User);

    /// A user tried to register again.
    async fn log_registered_user_registration(&self, user: &User);

    async fn log_new_day(&self, day: &Day);

    async fn log_new_day_state(&self, day: &Day);

    async fn log_new_record(&self, record: &Record);

    async fn log_record_cancellation(&self, record: &Record);
}

#[async_trait::async_trait]
impl<L> TrackingLogger for Arc<L>
where
    L: TrackingLogger + ?Sized,
{
    async fn log_registered_user(&self, user: &User) {
        (**self).log_registered_user(user).await
    }

    async fn log_registered_user_registration(&self, user: &User) {
        (**self).log_registered_user_registration(user).await
    }

    async fn log_new_day(&self, day: &Day) {
        (**self).log_new_day(day).await
    }

    async fn log_new_day_state(&self, day: &Day) {
        (**self).log_new_day_state(day).await
    }

    async fn log_new_record(&self, record: &Record) {
        (**self).log_new_record(record).await
    }

    async fn log_record_cancellation(&self, record: &Record) {
        (**self).log_record_cancellation(record).await
    }
}

#[async_trait::async_trait]
impl<'a, L> TrackingLogger for &'a L
where
    L: TrackingLogger + ?Sized,
{
    async fn log_registered_user(&self, user: &User) {
        (**self).log_registered_user(user).await
    }

    async fn log_registered_user_registration(&self, user: &User) {
        (**self).log_registered_user_registration(user).await
    }

    async fn log_new_day(&self, day: &Day) {
        (**self).log_new_day(day).await
    }

    async fn log_new_day_state(&self, day: &Day) {
        (**self).log_new_day_state(day).await
    }

    async fn log_new_record(&self, record: &Record) {
        (**self).log_new_record(record).await
    }

    async fn log_record_cancellation(&self, record: &Record) {
        (**self).log_record_cancellation(record).await
    }
}

/// Picks the loggable changes out of a tracking effect.
///
/// Registered users, created days, days with a new balance, created records
/// and cancelled records, in that order.
pub struct TrackingEffectLog<L> {
    logger: L,
}

impl<L: TrackingLogger> TrackingEffectLog<L> {
    pub fn new(logger: L) -> Self {
        Self { logger }
    }
}

#[async_trait::async_trait]
impl<L: TrackingLogger> EffectLog for TrackingEffectLog<L> {
    async fn log_effect(&self, effect: &Effect) {
        let users = effect.entities_that::<User>();
        let days = effect.entities_that::<Day>();
        let records = effect.entities_that::<Record>();

        for user in &users.new_entities() {
            self.logger.log_registered_user(user).await;
        }
        for day in &days.new_entities() {
            self.logger.log_new_day(day).await;
        }
        for day in &days.dirty_entities() {
            self.logger.log_new_day_state(day).await;
        }
        for record in &records.new_entities() {
            self.logger.log_new_record(record).await;
        }
        for record in &records.entities_named(RecordEvent::CANCELLED) {
            self.logger.log_record_cancellation(record).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use aqua_core::{Entity, SafeValue};
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::values::{Target, Time, Water, WaterBalance};

    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    impl Calls {
        fn push(&self, call: String) {
            self.0.lock().unwrap().push(call);
        }

        fn taken(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    #[async_trait::async_trait]
    impl TrackingLogger for Calls {
        async fn log_registered_user(&self, user: &User) {
            self.push(format!("registered {}", user.id()));
        }

        async fn log_registered_user_registration(&self, user: &User) {
            self.push(format!("again {}", user.id()));
        }

        async fn log_new_day(&self, day: &Day) {
            self.push(format!("day {}", day.water_balance().water().milliliters()));
        }

        async fn log_new_day_state(&self, day: &Day) {
            self.push(format!("balance {}", day.water_balance().water().milliliters()));
        }

        async fn log_new_record(&self, record: &Record) {
            self.push(format!("record {}", record.drunk_water().milliliters()));
        }

        async fn log_record_cancellation(&self, record: &Record) {
            self.push(format!("cancelled {}", record.drunk_water().milliliters()));
        }
    }

    fn noon() -> Time {
        Time::from(Utc.with_ymd_and_hms(2024, 5, 4, 12, 0, 0).unwrap())
    }

    fn registered(effect: &mut Effect) -> User {
        let target = Target::new(WaterBalance::new(Water::try_new(2000).unwrap()));
        User::register(UserId::new(), None, None, Some(target), effect).unwrap()
    }

    #[tokio::test]
    async fn logs_registration_then_new_day_then_record() {
        let calls = Calls::default();
        let mut effect = Effect::new();
        let mut user = registered(&mut effect);
        user.write_water(Some(Water::try_new(250).unwrap()), noon(), &mut effect);

        TrackingEffectLog::new(&calls).log_effect(&effect).await;

        assert_eq!(
            calls.taken(),
            vec![
                format!("registered {}", user.id()),
                "day 250".to_string(),
                "balance 250".to_string(),
                "record 250".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn cancellation_is_logged_as_state_change_and_cancellation() {
        let calls = Calls::default();
        let mut setup = Effect::new();
        let mut user = registered(&mut setup);
        let written = user.write_water(Some(Water::try_new(300).unwrap()), noon(), &mut setup);
        let mut user = User::restore(
            *user.id(),
            None,
            user.glass(),
            user.target(),
            [written.day.clone()].into_iter().map(reset).collect(),
            [written.new_record.clone()].into_iter().map(reset).collect(),
        );

        let mut effect = Effect::new();
        user.cancel_record(*written.new_record.id(), &mut effect).unwrap();
        TrackingEffectLog::new(&calls).log_effect(&effect).await;

        assert_eq!(
            calls.taken(),
            vec!["balance 0".to_string(), "cancelled 300".to_string()]
        );
    }

    fn reset<E: Entity>(mut entity: E) -> E {
        entity.events_mut().clear();
        entity
    }
}
