//! Transaction port and the scope that drives it.
//!
//! ```text
//! enter ── begin ──> Open ── exit(Ok)  ── commit ───> closed
//!                     │  └── exit(Err) ── rollback ─> closed (original error returned)
//!                     └── rollback() ──> RolledBack ── exit(_) ──> closed (no further calls)
//! ```
//!
//! Async code cannot roll back from `Drop`, so the scope is closed explicitly
//! with [`TransactionScope::exit`]. A scope dropped while still open only
//! logs a warning; whatever the backend does with an abandoned transaction
//! applies.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::TransactionError;

/// A transaction bound to one storage or session handle.
#[async_trait::async_trait]
pub trait Transaction: Send + Sync {
    async fn begin(&self) -> Result<(), TransactionError>;

    async fn commit(&self) -> Result<(), TransactionError>;

    async fn rollback(&self) -> Result<(), TransactionError>;
}

#[async_trait::async_trait]
impl<T> Transaction for Arc<T>
where
    T: Transaction + ?Sized,
{
    async fn begin(&self) -> Result<(), TransactionError> {
        (**self).begin().await
    }

    async fn commit(&self) -> Result<(), TransactionError> {
        (**self).commit().await
    }

    async fn rollback(&self) -> Result<(), TransactionError> {
        (**self).rollback().await
    }
}

/// Produces a transaction bound to a concrete repository handle `R`.
pub trait TransactionFactory<R: ?Sized>: Send + Sync {
    type Transaction: Transaction;

    fn transaction_for(&self, repository: &R) -> Self::Transaction;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ScopeState {
    Open,
    RolledBack,
    Closed,
}

/// Single-use guard around one transaction.
///
/// `enter` consumes the transaction and `exit` consumes the scope, so a scope
/// can be neither re-entered nor exited twice.
pub struct TransactionScope<T: Transaction> {
    tx: T,
    state: ScopeState,
}

impl<T: Transaction> TransactionScope<T> {
    /// Begin `tx` and open a scope over it.
    pub async fn enter(tx: T) -> Result<Self, TransactionError> {
        tx.begin().await?;
        debug!("transaction scope entered");
        Ok(Self {
            tx,
            state: ScopeState::Open,
        })
    }

    /// Roll back now.
    ///
    /// After this, `exit` returns the outcome untouched. Calling it again is a
    /// no-op.
    pub async fn rollback(&mut self) -> Result<(), TransactionError> {
        if self.state != ScopeState::Open {
            return Ok(());
        }
        // Marked first: a failed rollback must not be retried by `exit`.
        self.state = ScopeState::RolledBack;
        self.tx.rollback().await?;
        debug!("transaction scope rolled back explicitly");
        Ok(())
    }

    pub fn is_rolled_back(&self) -> bool {
        self.state == ScopeState::RolledBack
    }

    /// Close the scope according to `outcome`.
    ///
    /// `Ok` commits; a commit failure is returned as `E`. `Err` rolls back and
    /// returns the original error; a rollback failure at that point is
    /// logged, not returned.
    pub async fn exit<R, E>(mut self, outcome: Result<R, E>) -> Result<R, E>
    where
        E: From<TransactionError>,
    {
        let state = self.state;
        self.state = ScopeState::Closed;

        if state != ScopeState::Open {
            debug!("transaction scope exited after explicit rollback");
            return outcome;
        }

        match outcome {
            Ok(value) => {
                self.tx.commit().await?;
                debug!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                match self.tx.rollback().await {
                    Ok(()) => debug!("transaction rolled back"),
                    Err(rollback) => {
                        error!(error = %rollback, "rollback failed while exiting with an error");
                    }
                }
                Err(err)
            }
        }
    }
}

impl<T: Transaction> Drop for TransactionScope<T> {
    fn drop(&mut self) {
        if self.state == ScopeState::Open {
            warn!("transaction scope dropped without exit; transaction left open");
        }
    }
}

/// Run `body` inside a scope over `tx`: commit on `Ok`, roll back on `Err`.
pub async fn transactionally<T, F, R, E>(tx: T, body: F) -> Result<R, E>
where
    T: Transaction,
    F: Future<Output = Result<R, E>>,
    E: From<TransactionError>,
{
    let scope = TransactionScope::enter(tx).await?;
    let outcome = body.await;
    scope.exit(outcome).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every call; `fail_on` makes that operation fail.
    #[derive(Default)]
    struct Probe {
        calls: Mutex<Vec<&'static str>>,
        fail_on: Option<&'static str>,
    }

    impl Probe {
        fn failing(op: &'static str) -> Self {
            Self {
                fail_on: Some(op),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn call(&self, op: &'static str) -> Result<(), TransactionError> {
            self.calls.lock().unwrap().push(op);
            if self.fail_on == Some(op) {
                return Err(TransactionError::Session(format!("{op} failed")));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Transaction for Probe {
        async fn begin(&self) -> Result<(), TransactionError> {
            self.call("begin")
        }

        async fn commit(&self) -> Result<(), TransactionError> {
            self.call("commit")
        }

        async fn rollback(&self) -> Result<(), TransactionError> {
            self.call("rollback")
        }
    }

    #[derive(Debug, PartialEq)]
    enum CaseError {
        Domain(&'static str),
        Tx(TransactionError),
    }

    impl From<TransactionError> for CaseError {
        fn from(value: TransactionError) -> Self {
            CaseError::Tx(value)
        }
    }

    #[tokio::test]
    async fn ok_outcome_commits() {
        let probe = Arc::new(Probe::default());
        let scope = TransactionScope::enter(probe.clone()).await.unwrap();

        let result: Result<u8, CaseError> = scope.exit(Ok(7)).await;

        assert_eq!(result, Ok(7));
        assert_eq!(probe.calls(), vec!["begin", "commit"]);
    }

    #[tokio::test]
    async fn err_outcome_rolls_back_and_returns_original_error() {
        let probe = Arc::new(Probe::default());
        let scope = TransactionScope::enter(probe.clone()).await.unwrap();

        let result: Result<u8, CaseError> = scope.exit(Err(CaseError::Domain("nope"))).await;

        assert_eq!(result, Err(CaseError::Domain("nope")));
        assert_eq!(probe.calls(), vec!["begin", "rollback"]);
    }

    #[tokio::test]
    async fn failed_rollback_does_not_mask_original_error() {
        let probe = Arc::new(Probe::failing("rollback"));
        let scope = TransactionScope::enter(probe.clone()).await.unwrap();

        let result: Result<(), CaseError> = scope.exit(Err(CaseError::Domain("first"))).await;

        assert_eq!(result, Err(CaseError::Domain("first")));
    }

    #[tokio::test]
    async fn commit_failure_surfaces_as_error() {
        let probe = Arc::new(Probe::failing("commit"));
        let scope = TransactionScope::enter(probe.clone()).await.unwrap();

        let result: Result<(), CaseError> = scope.exit(Ok(())).await;

        assert!(matches!(result, Err(CaseError::Tx(TransactionError::Session(_)))));
    }

    #[tokio::test]
    async fn explicit_rollback_is_not_repeated_on_exit() {
        let probe = Arc::new(Probe::default());
        let mut scope = TransactionScope::enter(probe.clone()).await.unwrap();

        scope.rollback().await.unwrap();
        scope.rollback().await.unwrap();
        assert!(scope.is_rolled_back());

        let ok: Result<(), CaseError> = scope.exit(Ok(())).await;
        assert_eq!(ok, Ok(()));
        assert_eq!(probe.calls(), vec!["begin", "rollback"]);
    }

    #[tokio::test]
    async fn failed_begin_opens_no_scope() {
        let probe = Arc::new(Probe::failing("begin"));
        let result: Result<(), CaseError> =
            transactionally(probe.clone(), async { Ok(()) }).await;

        assert!(matches!(result, Err(CaseError::Tx(_))));
        assert_eq!(probe.calls(), vec!["begin"]);
    }

    #[tokio::test]
    async fn transactionally_wraps_body() {
        let probe = Arc::new(Probe::default());

        let ok: Result<&str, CaseError> =
            transactionally(probe.clone(), async { Ok("done") }).await;
        let err: Result<(), CaseError> =
            transactionally(probe.clone(), async { Err(CaseError::Domain("bad")) }).await;

        assert_eq!(ok, Ok("done"));
        assert_eq!(err, Err(CaseError::Domain("bad")));
        assert_eq!(
            probe.calls(),
            vec!["begin", "commit", "begin", "rollback"]
        );
    }
}
