//! Transactions over an external session that cannot nest.
//!
//! Unlike the snapshot storage, a session supports one transaction at a
//! time: entering a second one is rejected with
//! [`TransactionError::NestedTransaction`].

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use aqua_application::{Transaction, TransactionError, TransactionFactory};
use tracing::debug;

pub use in_memory::InMemorySession;
pub use postgres::PgSession;

/// A database session with explicit transaction control.
#[async_trait::async_trait]
pub trait TransactionalSession: Send + Sync {
    async fn in_transaction(&self) -> bool;

    async fn start_transaction(&self) -> Result<(), TransactionError>;

    async fn commit_transaction(&self) -> Result<(), TransactionError>;

    async fn abort_transaction(&self) -> Result<(), TransactionError>;
}

#[async_trait::async_trait]
impl<X> TransactionalSession for Arc<X>
where
    X: TransactionalSession + ?Sized,
{
    async fn in_transaction(&self) -> bool {
        (**self).in_transaction().await
    }

    async fn start_transaction(&self) -> Result<(), TransactionError> {
        (**self).start_transaction().await
    }

    async fn commit_transaction(&self) -> Result<(), TransactionError> {
        (**self).commit_transaction().await
    }

    async fn abort_transaction(&self) -> Result<(), TransactionError> {
        (**self).abort_transaction().await
    }
}

/// Anything that owns a session.
pub trait HasSession {
    type Session: TransactionalSession;

    fn session(&self) -> &Arc<Self::Session>;
}

/// The single transaction of a session.
///
/// Only the instance whose `begin` succeeded may commit or roll back.
pub struct SessionTransaction<X: ?Sized> {
    began: AtomicBool,
    session: Arc<X>,
}

impl<X: ?Sized> SessionTransaction<X> {
    pub fn new(session: Arc<X>) -> Self {
        Self {
            began: AtomicBool::new(false),
            session,
        }
    }
}

#[async_trait::async_trait]
impl<X> Transaction for SessionTransaction<X>
where
    X: TransactionalSession + ?Sized,
{
    async fn begin(&self) -> Result<(), TransactionError> {
        if self.session.in_transaction().await {
            return Err(TransactionError::NestedTransaction);
        }
        self.session.start_transaction().await?;
        self.began.store(true, Ordering::SeqCst);
        debug!("session transaction started");
        Ok(())
    }

    async fn commit(&self) -> Result<(), TransactionError> {
        if !self.began.swap(false, Ordering::SeqCst) {
            return Err(TransactionError::NoTransaction);
        }
        self.session.commit_transaction().await?;
        debug!("session transaction committed");
        Ok(())
    }

    async fn rollback(&self) -> Result<(), TransactionError> {
        if !self.began.swap(false, Ordering::SeqCst) {
            return Err(TransactionError::NoTransaction);
        }
        self.session.abort_transaction().await?;
        debug!("session transaction aborted");
        Ok(())
    }
}

/// Binds a [`SessionTransaction`] to the session of a repository.
#[derive(Debug, Default, Copy, Clone)]
pub struct SessionTransactionFactory;

impl<R> TransactionFactory<R> for SessionTransactionFactory
where
    R: HasSession + ?Sized,
{
    type Transaction = SessionTransaction<R::Session>;

    fn transaction_for(&self, repository: &R) -> SessionTransaction<R::Session> {
        SessionTransaction::new(repository.session().clone())
    }
}

#[cfg(test)]
mod tests {
    use aqua_application::TransactionScope;

    use super::*;

    struct Holder {
        session: Arc<InMemorySession>,
    }

    impl HasSession for Holder {
        type Session = InMemorySession;

        fn session(&self) -> &Arc<InMemorySession> {
            &self.session
        }
    }

    fn holder() -> Holder {
        Holder {
            session: Arc::new(InMemorySession::new()),
        }
    }

    #[tokio::test]
    async fn nested_begin_is_rejected() {
        let holder = holder();
        let outer = SessionTransactionFactory.transaction_for(&holder);
        let inner = SessionTransactionFactory.transaction_for(&holder);

        outer.begin().await.unwrap();
        assert_eq!(inner.begin().await, Err(TransactionError::NestedTransaction));

        outer.commit().await.unwrap();
        assert_eq!(holder.session.starts(), 1);
        assert_eq!(holder.session.commits(), 1);
    }

    #[tokio::test]
    async fn rejected_transaction_cannot_close_the_open_one() {
        let holder = holder();
        let outer = SessionTransactionFactory.transaction_for(&holder);
        let inner = SessionTransactionFactory.transaction_for(&holder);

        outer.begin().await.unwrap();
        assert_eq!(inner.begin().await, Err(TransactionError::NestedTransaction));
        assert_eq!(inner.commit().await, Err(TransactionError::NoTransaction));
        assert_eq!(inner.rollback().await, Err(TransactionError::NoTransaction));
        assert!(holder.session.in_transaction().await);

        outer.rollback().await.unwrap();
        assert_eq!(holder.session.commits(), 0);
        assert_eq!(holder.session.aborts(), 1);
    }

    #[tokio::test]
    async fn commit_without_begin_is_rejected() {
        let holder = holder();
        let tx = SessionTransactionFactory.transaction_for(&holder);

        assert_eq!(tx.commit().await, Err(TransactionError::NoTransaction));
        assert_eq!(tx.rollback().await, Err(TransactionError::NoTransaction));
    }

    #[tokio::test]
    async fn scope_error_aborts_exactly_once() {
        let holder = holder();
        let scope = TransactionScope::enter(SessionTransactionFactory.transaction_for(&holder))
            .await
            .unwrap();

        let result: Result<(), TransactionError> =
            scope.exit(Err(TransactionError::Session("boom".into()))).await;

        assert!(result.is_err());
        assert_eq!(holder.session.aborts(), 1);
        assert_eq!(holder.session.commits(), 0);
        assert!(!holder.session.in_transaction().await);
    }

    #[tokio::test]
    async fn explicit_rollback_is_not_repeated() {
        let holder = holder();
        let mut scope =
            TransactionScope::enter(SessionTransactionFactory.transaction_for(&holder))
                .await
                .unwrap();

        scope.rollback().await.unwrap();
        let result: Result<(), TransactionError> = scope.exit(Ok(())).await;

        assert!(result.is_ok());
        assert_eq!(holder.session.aborts(), 1);
        assert_eq!(holder.session.commits(), 0);
    }
}
