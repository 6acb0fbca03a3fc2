//! Cancellation and deadline scope for database calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{DbError, DbResult};

/// Cancellation token plus optional deadline, threaded through every RPC
/// and retry delay.
///
/// Cloning shares the token: cancelling any clone cancels all of them.
/// [`OpContext::child`] derives a scope that can be cancelled on its own.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    /// A context that is never cancelled and has no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A child scope: cancelled with its parent, or on its own.
    ///
    /// The child keeps the earlier of the parent's deadline and `timeout`.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The context error, if the context is already done.
    pub fn err(&self) -> Option<DbError> {
        if self.token.is_cancelled() {
            Some(DbError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(DbError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> DbError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => DbError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => DbError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                DbError::Cancelled
            }
        }
    }

    /// Run `fut` unless the context finishes first.
    pub async fn run<T, F>(&self, fut: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = fut => result,
        }
    }
}
