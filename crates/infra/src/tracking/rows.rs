//! Row representation of the tracking aggregate.

use std::collections::HashMap;

use aqua_core::{Entities, Entity, SafeValue, UnsafeValueError};
use aqua_tracking::{
    Day, DayId, DayResult, Glass, Record, RecordId, Target, Time, User, UserId, Water,
    WaterBalance, Weight,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: UserId,
    pub weight_kilograms: Option<i64>,
    pub glass_milliliters: i64,
    pub target_milliliters: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRow {
    pub id: DayId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub target_milliliters: i64,
    pub water_balance_milliliters: i64,
    pub pinned_result: Option<DayResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub id: RecordId,
    pub user_id: UserId,
    pub drunk_water_milliliters: i64,
    pub recording_time: DateTime<Utc>,
    pub is_cancelled: bool,
}

/// Every persisted row of the tracking context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingState {
    pub users: HashMap<UserId, UserRow>,
    pub days: HashMap<DayId, DayRow>,
    pub records: HashMap<RecordId, RecordRow>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            weight_kilograms: user.weight().map(|w| w.kilograms()),
            glass_milliliters: user.glass().capacity().milliliters(),
            target_milliliters: user.target().water_balance().water().milliliters(),
        }
    }
}

impl From<&Day> for DayRow {
    fn from(day: &Day) -> Self {
        Self {
            id: *day.id(),
            user_id: day.user_id(),
            date: day.date(),
            target_milliliters: day.target().water_balance().water().milliliters(),
            water_balance_milliliters: day.water_balance().water().milliliters(),
            pinned_result: day.pinned_result(),
        }
    }
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        Self {
            id: *record.id(),
            user_id: record.user_id(),
            drunk_water_milliliters: record.drunk_water().milliliters(),
            recording_time: record.recording_time().instant(),
            is_cancelled: record.is_cancelled(),
        }
    }
}

fn water(milliliters: i64) -> Result<Water, UnsafeValueError> {
    Water::trusted(milliliters, milliliters >= 0)
}

fn target(milliliters: i64) -> Result<Target, UnsafeValueError> {
    Ok(Target::new(WaterBalance::new(water(milliliters)?)))
}

impl TrackingState {
    /// Rebuild the aggregate of `user_id` from its rows.
    pub fn user(&self, user_id: UserId) -> Result<Option<User>, UnsafeValueError> {
        let Some(row) = self.users.get(&user_id) else {
            return Ok(None);
        };

        let days = self
            .days
            .values()
            .filter(|day| day.user_id == user_id)
            .map(|day| -> Result<Day, UnsafeValueError> {
                Ok(Day::restore(
                    day.id,
                    day.user_id,
                    day.date,
                    target(day.target_milliliters)?,
                    WaterBalance::new(water(day.water_balance_milliliters)?),
                    day.pinned_result,
                ))
            })
            .collect::<Result<Entities<Day>, UnsafeValueError>>()?;

        let records = self
            .records
            .values()
            .filter(|record| record.user_id == user_id)
            .map(|record| -> Result<Record, UnsafeValueError> {
                Ok(Record::restore(
                    record.id,
                    record.user_id,
                    water(record.drunk_water_milliliters)?,
                    Time::from(record.recording_time),
                    record.is_cancelled,
                ))
            })
            .collect::<Result<Entities<Record>, UnsafeValueError>>()?;

        let weight = row
            .weight_kilograms
            .map(|kg| Weight::trusted(kg, kg >= 0))
            .transpose()?;

        Ok(Some(User::restore(
            row.id,
            weight,
            Glass::new(water(row.glass_milliliters)?),
            target(row.target_milliliters)?,
            days,
            records,
        )))
    }
}
