//! [`TrackingLogger`] implementations.

use std::sync::RwLock;

use aqua_core::Entity;
use aqua_tracking::{Day, Record, TrackingLogger, User};
use serde::Serialize;
use tracing::{info, warn};

use crate::tracking::{DayRow, RecordRow, UserRow};

fn render(row: &impl Serialize) -> String {
    serde_json::to_string(row).unwrap_or_else(|e| format!("<unrenderable: {e}>"))
}

/// Writes every tracking event as a structured `info` line.
#[derive(Debug, Default, Copy, Clone)]
pub struct TracingLogger;

#[async_trait::async_trait]
impl TrackingLogger for TracingLogger {
    async fn log_registered_user(&self, user: &User) {
        info!(user_id = %user.id(), user = %render(&UserRow::from(user)), "user registered");
    }

    async fn log_registered_user_registration(&self, user: &User) {
        warn!(user_id = %user.id(), "user is already registered");
    }

    async fn log_new_day(&self, day: &Day) {
        info!(
            user_id = %day.user_id(),
            day = %render(&DayRow::from(day)),
            "day opened"
        );
    }

    async fn log_new_day_state(&self, day: &Day) {
        info!(
            user_id = %day.user_id(),
            day_id = %day.id(),
            water_balance = day.water_balance().water().milliliters(),
            result = ?day.result(),
            "day balance changed"
        );
    }

    async fn log_new_record(&self, record: &Record) {
        info!(
            user_id = %record.user_id(),
            record = %render(&RecordRow::from(record)),
            "water written"
        );
    }

    async fn log_record_cancellation(&self, record: &Record) {
        info!(
            user_id = %record.user_id(),
            record_id = %record.id(),
            "record cancelled"
        );
    }
}

/// One call received by an [`InMemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    RegisteredUser(UserRow),
    RepeatedRegistration(UserRow),
    NewDay(DayRow),
    NewDayState(DayRow),
    NewRecord(RecordRow),
    RecordCancellation(RecordRow),
}

/// Remembers every call in order.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLogger {
    entries: RwLock<Vec<LogEntry>>,
}

impl InMemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.read() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn push(&self, entry: LogEntry) {
        match self.entries.write() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

#[async_trait::async_trait]
impl TrackingLogger for InMemoryLogger {
    async fn log_registered_user(&self, user: &User) {
        self.push(LogEntry::RegisteredUser(user.into()));
    }

    async fn log_registered_user_registration(&self, user: &User) {
        self.push(LogEntry::RepeatedRegistration(user.into()));
    }

    async fn log_new_day(&self, day: &Day) {
        self.push(LogEntry::NewDay(day.into()));
    }

    async fn log_new_day_state(&self, day: &Day) {
        self.push(LogEntry::NewDayState(day.into()));
    }

    async fn log_new_record(&self, record: &Record) {
        self.push(LogEntry::NewRecord(record.into()));
    }

    async fn log_record_cancellation(&self, record: &Record) {
        self.push(LogEntry::RecordCancellation(record.into()));
    }
}
