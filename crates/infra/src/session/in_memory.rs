use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use aqua_application::TransactionError;

use super::TransactionalSession;

/// Session double that only tracks transaction state.
///
/// Intended for tests/dev. Counts every start, commit and abort.
#[derive(Debug, Default)]
pub struct InMemorySession {
    open: AtomicBool,
    starts: AtomicUsize,
    commits: AtomicUsize,
    aborts: AtomicUsize,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn aborts(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }

    fn close(&self) -> Result<(), TransactionError> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Err(TransactionError::NoTransaction);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TransactionalSession for InMemorySession {
    async fn in_transaction(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn start_transaction(&self) -> Result<(), TransactionError> {
        if self.open.swap(true, Ordering::SeqCst) {
            return Err(TransactionError::NestedTransaction);
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<(), TransactionError> {
        self.close()?;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn abort_transaction(&self) -> Result<(), TransactionError> {
        self.close()?;
        self.aborts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
