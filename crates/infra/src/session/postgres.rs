//! Postgres-backed session.
//!
//! One `PgSession` owns one connection, so transaction state is the state of
//! that connection. Statements issued through [`PgSession::connection`] run
//! inside the open transaction, if any.

use std::sync::atomic::{AtomicBool, Ordering};

use aqua_application::TransactionError;
use sqlx::{Connection, PgConnection};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::instrument;

use super::TransactionalSession;
use crate::config::{AquaConfig, ConfigError};

#[derive(Debug, Error)]
pub enum PgSessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect: {0}")]
    Connect(#[from] sqlx::Error),
}

pub struct PgSession {
    connection: Mutex<PgConnection>,
    open: AtomicBool,
}

impl PgSession {
    pub fn new(connection: PgConnection) -> Self {
        Self {
            connection: Mutex::new(connection),
            open: AtomicBool::new(false),
        }
    }

    pub async fn connect(url: &str) -> Result<Self, PgSessionError> {
        let connection = PgConnection::connect(url).await?;
        Ok(Self::new(connection))
    }

    /// Connect to `AQUA_DATABASE_URL`.
    pub async fn connect_with(config: &AquaConfig) -> Result<Self, PgSessionError> {
        let url = config.require_database_url()?;
        Self::connect(url).await
    }

    /// Exclusive access to the underlying connection.
    pub async fn connection(&self) -> MutexGuard<'_, PgConnection> {
        self.connection.lock().await
    }

    #[instrument(skip(self))]
    async fn execute(&self, statement: &'static str) -> Result<(), TransactionError> {
        let mut connection = self.connection.lock().await;
        sqlx::query(statement)
            .execute(&mut *connection)
            .await
            .map_err(|e| TransactionError::Session(e.to_string()))?;
        Ok(())
    }
}

impl core::fmt::Debug for PgSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PgSession")
            .field("open", &self.open.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl TransactionalSession for PgSession {
    async fn in_transaction(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn start_transaction(&self) -> Result<(), TransactionError> {
        if self.open.swap(true, Ordering::SeqCst) {
            return Err(TransactionError::NestedTransaction);
        }
        if let Err(e) = self.execute("BEGIN").await {
            self.open.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<(), TransactionError> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Err(TransactionError::NoTransaction);
        }
        self.execute("COMMIT").await
    }

    async fn abort_transaction(&self) -> Result<(), TransactionError> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Err(TransactionError::NoTransaction);
        }
        self.execute("ROLLBACK").await
    }
}
