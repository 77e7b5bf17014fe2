//! Infrastructure layer: transactional storage, sessions, repositories,
//! loggers and configuration.

pub mod config;
pub mod loggers;
pub mod session;
pub mod storage;
pub mod tracking;


pub use config::{AquaConfig, ConfigError};
pub use loggers::{InMemoryLogger, LogEntry, TracingLogger};
pub use session::{
    HasSession, InMemorySession, PgSession, SessionTransaction, SessionTransactionFactory,
    TransactionalSession,
};
pub use storage::{HasStorage, StorageTransaction, StorageTransactionFactory, TransactionalStorage};
pub use tracking::{InMemoryMapper, InMemoryMapperFactory, InMemoryUsers, TrackingState};
