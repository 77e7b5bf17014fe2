//! In-memory storage with a snapshot stack.
//!
//! `begin` pushes a deep copy of the current state, `rollback` pops it back
//! into place and `commit` pops and discards it. Transactions nest freely:
//! every level is one snapshot.
//!
//! Intended for tests/dev: each snapshot is a full copy of the state.

use std::sync::{Arc, RwLock};

use aqua_application::{Transaction, TransactionError, TransactionFactory};
use tracing::debug;

#[derive(Debug)]
struct Inner<S> {
    current: S,
    snapshots: Vec<S>,
}

/// Shared state plus its snapshot stack.
#[derive(Debug)]
pub struct TransactionalStorage<S> {
    inner: RwLock<Inner<S>>,
}

impl<S: Default> Default for TransactionalStorage<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> TransactionalStorage<S> {
    pub fn new(state: S) -> Self {
        Self {
            inner: RwLock::new(Inner {
                current: state,
                snapshots: Vec::new(),
            }),
        }
    }

    /// Number of open transactions.
    pub fn depth(&self) -> Result<usize, TransactionError> {
        let inner = self.inner.read().map_err(|_| TransactionError::Poisoned)?;
        Ok(inner.snapshots.len())
    }

    /// Read the current state without copying it.
    pub fn read<T>(&self, f: impl FnOnce(&S) -> T) -> Result<T, TransactionError> {
        let inner = self.inner.read().map_err(|_| TransactionError::Poisoned)?;
        Ok(f(&inner.current))
    }

    /// Change the current state in place.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut S) -> T) -> Result<T, TransactionError> {
        let mut inner = self.inner.write().map_err(|_| TransactionError::Poisoned)?;
        Ok(f(&mut inner.current))
    }

    /// Discard the top snapshot, keeping the current state.
    pub fn commit(&self) -> Result<(), TransactionError> {
        let mut inner = self.inner.write().map_err(|_| TransactionError::Poisoned)?;
        inner
            .snapshots
            .pop()
            .ok_or(TransactionError::NoTransaction)?;
        debug!(depth = inner.snapshots.len(), "storage transaction committed");
        Ok(())
    }

    /// Restore the top snapshot.
    pub fn rollback(&self) -> Result<(), TransactionError> {
        let mut inner = self.inner.write().map_err(|_| TransactionError::Poisoned)?;
        let snapshot = inner
            .snapshots
            .pop()
            .ok_or(TransactionError::NoTransaction)?;
        inner.current = snapshot;
        debug!(depth = inner.snapshots.len(), "storage transaction rolled back");
        Ok(())
    }
}

impl<S: Clone> TransactionalStorage<S> {
    /// Push a deep copy of the current state.
    pub fn begin(&self) -> Result<(), TransactionError> {
        let mut inner = self.inner.write().map_err(|_| TransactionError::Poisoned)?;
        let snapshot = inner.current.clone();
        inner.snapshots.push(snapshot);
        debug!(depth = inner.snapshots.len(), "storage transaction begun");
        Ok(())
    }

    /// Deep copy of the current state.
    pub fn view(&self) -> Result<S, TransactionError> {
        self.read(S::clone)
    }
}

/// Anything backed by a [`TransactionalStorage`].
pub trait HasStorage {
    type State;

    fn storage(&self) -> &Arc<TransactionalStorage<Self::State>>;
}

impl<S> HasStorage for Arc<TransactionalStorage<S>> {
    type State = S;

    fn storage(&self) -> &Arc<TransactionalStorage<S>> {
        self
    }
}

/// One nesting level over a [`TransactionalStorage`].
#[derive(Debug)]
pub struct StorageTransaction<S> {
    storage: Arc<TransactionalStorage<S>>,
}

impl<S> StorageTransaction<S> {
    pub fn new(storage: Arc<TransactionalStorage<S>>) -> Self {
        Self { storage }
    }
}

impl<S> Clone for StorageTransaction<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

#[async_trait::async_trait]
impl<S> Transaction for StorageTransaction<S>
where
    S: Clone + Send + Sync,
{
    async fn begin(&self) -> Result<(), TransactionError> {
        self.storage.begin()
    }

    async fn commit(&self) -> Result<(), TransactionError> {
        self.storage.commit()
    }

    async fn rollback(&self) -> Result<(), TransactionError> {
        self.storage.rollback()
    }
}

/// Binds a [`StorageTransaction`] to any repository exposing its storage.
#[derive(Debug, Default, Copy, Clone)]
pub struct StorageTransactionFactory;

impl<R> TransactionFactory<R> for StorageTransactionFactory
where
    R: HasStorage + ?Sized,
    R::State: Clone + Send + Sync,
{
    type Transaction = StorageTransaction<R::State>;

    fn transaction_for(&self, repository: &R) -> StorageTransaction<R::State> {
        StorageTransaction::new(repository.storage().clone())
    }
}
