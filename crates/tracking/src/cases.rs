//! Use cases of the tracking context.
//!
//! Every mutating case follows the same shape:
//!
//! ```text
//! validate input ─> enter transaction ─> load user ─> domain operation on a fresh Effect
//!                                                  ─> Output (log + mappers) ─> exit (commit / rollback)
//! ```

use aqua_application::{
    MapperFactory, Mappers, Output, OutputError, TransactionError, TransactionFactory,
    transactionally,
};
use aqua_core::{Effect, SafeValue};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::day::Day;
use crate::error::{CancellationError, NegativeWaterAmount, RegistrationError};
use crate::ids::{RecordId, UserId};
use crate::ports::{TrackingEffectLog, TrackingLogger, Users, UsersError};
use crate::record::Record;
use crate::user::{CancellationOutput, User, WritingOutput};
use crate::values::{Glass, Target, Time, Water, WaterBalance, Weight};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error("no user {0}")]
    NoUser(UserId),

    #[error("target water balance cannot be negative")]
    NegativeTargetWaterBalance,

    #[error("glass capacity cannot be negative")]
    NegativeGlass,

    #[error("weight cannot be negative")]
    NegativeWeight,

    #[error(transparent)]
    NegativeWater(#[from] NegativeWaterAmount),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Cancellation(#[from] CancellationError),

    #[error(transparent)]
    Users(#[from] UsersError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl TrackingError {
    /// Wiring or infrastructure failure rather than a rejected request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TrackingError::Users(_) | TrackingError::Transaction(_) | TrackingError::Output(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct Written {
    pub user: User,
    pub output: WritingOutput,
}

#[derive(Debug, Clone)]
pub struct Cancelled {
    pub user: User,
    pub output: CancellationOutput,
}

#[derive(Debug, Clone)]
pub struct Reading {
    pub user: User,
    pub day: Option<Day>,
    pub records: Vec<Record>,
}

/// Mapper factories of the tracking context, dispatched User, Day, Record.
#[derive(Debug, Clone)]
pub struct TrackingMappers<UF, DF, RF> {
    pub users: UF,
    pub days: DF,
    pub records: RF,
}

impl<UF, DF, RF> TrackingMappers<UF, DF, RF> {
    pub fn new(users: UF, days: DF, records: RF) -> Self {
        Self {
            users,
            days,
            records,
        }
    }

    pub fn bind<R>(&self, repository: &R) -> Mappers
    where
        R: ?Sized,
        UF: MapperFactory<R, User>,
        DF: MapperFactory<R, Day>,
        RF: MapperFactory<R, Record>,
    {
        Mappers::new()
            .bind::<R, User, _>(&self.users, repository)
            .bind::<R, Day, _>(&self.days, repository)
            .bind::<R, Record, _>(&self.records, repository)
    }
}

/// Tracking use cases over one repository.
pub struct Tracking<U, TF, UF, DF, RF, L> {
    users: U,
    transactions: TF,
    mappers: TrackingMappers<UF, DF, RF>,
    logger: L,
}

impl<U, TF, UF, DF, RF, L> Tracking<U, TF, UF, DF, RF, L>
where
    U: Users,
    TF: TransactionFactory<U>,
    UF: MapperFactory<U, User>,
    DF: MapperFactory<U, Day>,
    RF: MapperFactory<U, Record>,
    L: TrackingLogger,
{
    pub fn new(
        users: U,
        transactions: TF,
        mappers: TrackingMappers<UF, DF, RF>,
        logger: L,
    ) -> Self {
        Self {
            users,
            transactions,
            mappers,
            logger,
        }
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    /// Register `user_id`, or return the already registered user.
    #[instrument(skip(self))]
    pub async fn register_user(
        &self,
        user_id: UserId,
        target_milliliters: Option<i64>,
        glass_milliliters: Option<i64>,
        weight_kilograms: Option<i64>,
    ) -> Result<User, TrackingError> {
        let target = target_milliliters
            .map(|ml| Water::try_new(ml).map(|water| Target::new(WaterBalance::new(water))))
            .transpose()
            .map_err(|_| TrackingError::NegativeTargetWaterBalance)?;
        let glass = glass_milliliters
            .map(|ml| Water::try_new(ml).map(Glass::new))
            .transpose()
            .map_err(|_| TrackingError::NegativeGlass)?;
        let weight = weight_kilograms
            .map(Weight::try_new)
            .transpose()
            .map_err(|_| TrackingError::NegativeWeight)?;

        let tx = self.transactions.transaction_for(&self.users);
        transactionally(tx, self.register_in(user_id, weight, glass, target)).await
    }

    async fn register_in(
        &self,
        user_id: UserId,
        weight: Option<Weight>,
        glass: Option<Glass>,
        target: Option<Target>,
    ) -> Result<User, TrackingError> {
        if let Some(user) = self.users.user_with_id(user_id).await? {
            debug!(%user_id, "user already registered");
            self.logger.log_registered_user_registration(&user).await;
            return Ok(user);
        }

        let mut effect = Effect::new();
        let user = User::register(user_id, weight, glass, target, &mut effect)?;
        self.output().run(effect).await?;
        Ok(user)
    }

    /// Drink `milliliters` (a glass when `None`) now.
    pub async fn write_water(
        &self,
        user_id: UserId,
        milliliters: Option<i64>,
    ) -> Result<Written, TrackingError> {
        self.write_water_at(user_id, milliliters, Time::now()).await
    }

    #[instrument(skip(self))]
    pub async fn write_water_at(
        &self,
        user_id: UserId,
        milliliters: Option<i64>,
        now: Time,
    ) -> Result<Written, TrackingError> {
        let water = milliliters.map(Water::try_new).transpose()?;

        let tx = self.transactions.transaction_for(&self.users);
        transactionally(tx, self.write_water_in(user_id, water, now)).await
    }

    async fn write_water_in(
        &self,
        user_id: UserId,
        water: Option<Water>,
        now: Time,
    ) -> Result<Written, TrackingError> {
        let mut user = self.existing_user(user_id).await?;

        let mut effect = Effect::new();
        let output = user.write_water(water, now, &mut effect);
        self.output().run(effect).await?;

        Ok(Written { user, output })
    }

    #[instrument(skip(self))]
    pub async fn cancel_record(
        &self,
        user_id: UserId,
        record_id: RecordId,
    ) -> Result<Cancelled, TrackingError> {
        let tx = self.transactions.transaction_for(&self.users);
        transactionally(tx, self.cancel_record_in(user_id, record_id)).await
    }

    async fn cancel_record_in(
        &self,
        user_id: UserId,
        record_id: RecordId,
    ) -> Result<Cancelled, TrackingError> {
        let mut user = self.existing_user(user_id).await?;

        let mut effect = Effect::new();
        let output = user.cancel_record(record_id, &mut effect)?;
        self.output().run(effect).await?;

        Ok(Cancelled { user, output })
    }

    /// The user with their day and records on `date`.
    pub async fn read_user(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Reading, TrackingError> {
        let user = self.existing_user(user_id).await?;
        let day = user.day_on(date).cloned();
        let records = user.records_on(date);
        Ok(Reading { user, day, records })
    }

    async fn existing_user(&self, user_id: UserId) -> Result<User, TrackingError> {
        self.users
            .user_with_id(user_id)
            .await?
            .ok_or(TrackingError::NoUser(user_id))
    }

    fn output(&self) -> Output<TrackingEffectLog<&L>> {
        Output::new(self.mappers.bind(&self.users), TrackingEffectLog::new(&self.logger))
    }
}
