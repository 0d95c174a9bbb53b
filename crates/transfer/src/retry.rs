//! Bounded retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY};

/// Classifies errors into transient (worth another attempt) and fatal.
pub trait Retryable {
    /// True when a retry could plausibly succeed.
    fn is_transient(&self) -> bool;
}

/// Retry bounds for a single operation.
///
/// The delay grows linearly with the attempt number rather than
/// exponentially: the n-th failure waits `base_delay * n` before the next
/// attempt. `max_attempts` counts total invocations, the first included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total invocations allowed for one operation.
    pub max_attempts: u32,
    /// Backoff unit.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay scheduled after `failed_attempts` consecutive failures.
    pub fn delay_after_failure(&self, failed_attempts: u32) -> Duration {
        self.base_delay * failed_attempts
    }

    /// Runs `op` until it succeeds, fails fatally, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number. `on_retry` fires after
    /// each transient failure that leaves attempts remaining, with the
    /// attempt that failed and the delay about to be slept. Non-transient
    /// errors propagate immediately; the last transient error propagates
    /// once `max_attempts` invocations are spent.
    pub async fn run<T, E, F, Fut, H>(&self, mut op: F, mut on_retry: H) -> Result<T, E>
    where
        E: Retryable,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: FnMut(u32, Duration),
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_after_failure(attempt);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, "transient failure, will retry");
                    on_retry(attempt, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestError {
        transient: bool,
    }

    impl Retryable for TestError {
        fn is_transient(&self) -> bool {
            self.transient
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
        }
    }

    #[test]
    fn delay_grows_linearly() {
        let policy = policy();
        assert_eq!(policy.delay_after_failure(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after_failure(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_after_failure(4), Duration::from_millis(2000));
    }

    #[test]
    fn default_matches_reference_tuning() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_success_runs_once() {
        let mut calls = 0u32;
        let mut retries = 0u32;
        let result: Result<u32, TestError> = policy()
            .run(
                |_| {
                    calls += 1;
                    async { Ok(42) }
                },
                |_, _| retries += 1,
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
        assert_eq!(retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn two_failures_take_three_invocations() {
        let mut calls = 0u32;
        let mut observed = Vec::new();
        let result: Result<&str, TestError> = policy()
            .run(
                |_| {
                    calls += 1;
                    let fail = calls <= 2;
                    async move {
                        if fail {
                            Err(TestError { transient: true })
                        } else {
                            Ok("done")
                        }
                    }
                },
                |attempt, delay| observed.push((attempt, delay)),
            )
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls, 3);
        assert_eq!(
            observed,
            vec![
                (1, Duration::from_millis(500)),
                (2, Duration::from_millis(1000)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_stops_at_max_attempts() {
        let mut calls = 0u32;
        let mut retries = 0u32;
        let result: Result<(), TestError> = policy()
            .run(
                |_| {
                    calls += 1;
                    async { Err(TestError { transient: true }) }
                },
                |_, _| retries += 1,
            )
            .await;

        assert_eq!(result.unwrap_err(), TestError { transient: true });
        assert_eq!(calls, 5);
        assert_eq!(retries, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_is_not_retried() {
        let mut calls = 0u32;
        let result: Result<(), TestError> = policy()
            .run(
                |_| {
                    calls += 1;
                    async { Err(TestError { transient: false }) }
                },
                |_, _| panic!("fatal errors must not schedule retries"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn op_sees_one_based_attempt_numbers() {
        let mut seen = Vec::new();
        let _: Result<(), TestError> = policy()
            .run(
                |attempt| {
                    seen.push(attempt);
                    async { Err(TestError { transient: true }) }
                },
                |_, _| {},
            )
            .await;

        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }
}
