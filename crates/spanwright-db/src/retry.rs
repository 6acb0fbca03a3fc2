//! Bounded retry for Spanner calls.
//!
//! Transient backend statuses are retried up to [`MAX_ATTEMPTS`] times with
//! a linear delay of `attempt × 100ms`. Context errors and every other
//! status are returned straight away.

use std::future::Future;
use std::time::Duration;

use tonic::Code;
use tracing::{debug, warn};

use crate::context::OpContext;
use crate::error::{DbError, DbResult};

pub const MAX_ATTEMPTS: u32 = 3;
pub const BASE_DELAY: Duration = Duration::from_millis(100);

/// Backend status codes worth another attempt.
const RETRYABLE_CODES: &[Code] = &[
    Code::Unavailable,
    Code::DeadlineExceeded,
    Code::ResourceExhausted,
    Code::Internal,
];

/// Attempt limit and delay step for [`RetryPolicy::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based): linear, not exponential.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Run `f` until it succeeds, fails fatally, or attempts run out.
    ///
    /// `f` receives the 1-based attempt number. Each attempt is raced
    /// against `ctx`, and so is every delay between attempts.
    pub async fn run<T, F, Fut>(&self, ctx: &OpContext, operation: &str, mut f: F) -> DbResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = DbResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match ctx.run(f(attempt)).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !is_retryable(&err) {
                return Err(err);
            }

            if attempt >= max_attempts {
                return Err(DbError::RetriesExhausted {
                    operation: operation.to_string(),
                    attempts: max_attempts,
                    source: Box::new(err),
                });
            }

            let delay = self.delay_for(attempt);
            warn!(
                operation,
                attempt,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "retrying operation"
            );

            tokio::select! {
                err = ctx.done() => return Err(err),
                _ = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

/// Run `f` under the default policy (3 attempts, 100ms linear step).
pub async fn with_retry<T, F, Fut>(ctx: &OpContext, operation: &str, f: F) -> DbResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    RetryPolicy::default().run(ctx, operation, f).await
}

/// Whether another attempt could succeed.
///
/// Caller cancellation and deadlines never are; backend statuses only for
/// the transient codes.
pub fn is_retryable(err: &DbError) -> bool {
    match err {
        DbError::Backend(status) => RETRYABLE_CODES.contains(&status.code()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tonic::Status;
    use tokio::time::Instant;

    #[test]
    fn retryable_classification() {
        for status in [
            Status::unavailable("x"),
            Status::deadline_exceeded("x"),
            Status::resource_exhausted("x"),
            Status::internal("x"),
        ] {
            assert!(is_retryable(&DbError::Backend(status)));
        }
        for status in [
            Status::invalid_argument("x"),
            Status::permission_denied("x"),
            Status::already_exists("x"),
            Status::not_found("x"),
            Status::cancelled("x"),
        ] {
            assert!(!is_retryable(&DbError::Backend(status)));
        }
        assert!(!is_retryable(&DbError::Cancelled));
        assert!(!is_retryable(&DbError::DeadlineExceeded));
    }

    #[test]
    fn delays_are_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = with_retry(&OpContext::new(), "flaky", |attempt| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            assert_eq!(n, attempt);
            async move {
                if attempt < 3 {
                    Err(DbError::Backend(Status::unavailable("try again")))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms + 200ms of backoff.
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_returns_after_one_attempt() {
        let calls = AtomicU32::new(0);

        let result: DbResult<()> = with_retry(&OpContext::new(), "fatal", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbError::Backend(Status::permission_denied("no"))) }
        })
        .await;

        assert_eq!(result.unwrap_err().code(), Some(Code::PermissionDenied));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_wraps_last_error() {
        let calls = AtomicU32::new(0);

        let result: DbResult<()> = with_retry(&OpContext::new(), "always-down", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbError::Backend(Status::unavailable("down"))) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, DbError::RetriesExhausted { attempts: 3, .. }));
        let message = err.to_string();
        assert!(message.starts_with("max retry attempts (3) exceeded for always-down"));
        assert!(message.contains("down"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_delay_stops_retrying() {
        let ctx = OpContext::new();
        let calls = AtomicU32::new(0);

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let result: DbResult<()> = with_retry(&ctx, "cancelled", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DbError::Backend(Status::unavailable("down"))) }
        })
        .await;

        assert!(matches!(result, Err(DbError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_not_retried() {
        let ctx = OpContext::with_timeout(Duration::from_millis(20));
        let calls = AtomicU32::new(0);

        let result: DbResult<()> = with_retry(&ctx, "slow", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(())
            }
        })
        .await;

        assert!(matches!(result, Err(DbError::DeadlineExceeded)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_policy_limits_attempts() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
        };
        let calls = AtomicU32::new(0);

        let result: DbResult<()> = policy
            .run(&OpContext::new(), "five", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DbError::Backend(Status::internal("boom"))) }
            })
            .await;

        assert!(matches!(result, Err(DbError::RetriesExhausted { attempts: 5, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
