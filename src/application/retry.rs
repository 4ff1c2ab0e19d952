//! Bounded retry with a fixed delay.
//!
//! Used by both the initial connect and the reconnect path, each with its
//! own [`RetryPolicy`].
//!
//! | Policy | Retries | Attempts | Delay |
//! |--------|---------|----------|-------|
//! | `initial_connect` | 1 | 2 | 1s |
//! | `reconnect` | 10 | 11 | 1s |

use std::future::Future;
use std::time::Duration;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,

    /// Wait between two attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Startup policy: fail fast on misconfiguration.
    pub const fn initial_connect() -> Self {
        Self::new(1, Duration::from_secs(1))
    }

    /// Recovery policy: absorb short database restarts, bound the downtime.
    pub const fn reconnect() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// Total number of attempts, first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Report about one failed attempt.
#[derive(Debug)]
pub struct RetryFailure<'a, E> {
    /// 1-based attempt number.
    pub attempt: u32,

    /// True when no further attempt follows.
    pub is_final: bool,

    pub error: &'a E,
}

/// Runs an operation until it succeeds or the policy is exhausted.
#[derive(Debug, Clone)]
pub struct RetryController {
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Call `operation` until it succeeds, at most `max_retries + 1` times.
    ///
    /// `on_failure` sees every failed attempt before the delay. On
    /// exhaustion the last error is returned.
    pub async fn attempt<T, E, F, Fut, O>(&self, mut operation: F, mut on_failure: O) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        O: FnMut(RetryFailure<'_, E>),
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    let is_final = attempt >= max_attempts;
                    on_failure(RetryFailure {
                        attempt,
                        is_final,
                        error: &error,
                    });
                    if is_final {
                        return Err(error);
                    }
                }
            }

            tokio::time::sleep(self.policy.delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn instant_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::ZERO)
    }

    #[test]
    fn default_policies() {
        assert_eq!(RetryPolicy::initial_connect().max_attempts(), 2);
        assert_eq!(RetryPolicy::reconnect().max_attempts(), 11);
        assert_eq!(RetryPolicy::reconnect().delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn first_success_returns_immediately() {
        let calls = AtomicU32::new(0);
        let retry = RetryController::new(instant_policy(3));

        let result: Result<u32, String> = retry
            .attempt(
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(attempt) }
                },
                |_| panic!("no failure expected"),
            )
            .await;

        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let retry = RetryController::new(instant_policy(3));
        let mut failures = Vec::new();

        let result: Result<u32, String> = retry
            .attempt(
                |attempt| async move {
                    if attempt < 3 {
                        Err(format!("fail {}", attempt))
                    } else {
                        Ok(attempt)
                    }
                },
                |failure| failures.push((failure.attempt, failure.is_final)),
            )
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(failures, vec![(1, false), (2, false)]);
    }

    #[tokio::test]
    async fn exhaustion_returns_last_error() {
        let retry = RetryController::new(instant_policy(2));
        let mut failures = Vec::new();

        let result: Result<(), String> = retry
            .attempt(
                |attempt| async move { Err(format!("fail {}", attempt)) },
                |failure| failures.push((failure.attempt, failure.is_final, failure.error.clone())),
            )
            .await;

        assert_eq!(result, Err("fail 3".to_string()));
        assert_eq!(
            failures,
            vec![
                (1, false, "fail 1".to_string()),
                (2, false, "fail 2".to_string()),
                (3, true, "fail 3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn zero_retries_makes_single_attempt() {
        let calls = AtomicU32::new(0);
        let retry = RetryController::new(instant_policy(0));

        let result: Result<(), &str> = retry
            .attempt(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("down") }
                },
                |failure| assert!(failure.is_final),
            )
            .await;

        assert_eq!(result, Err("down"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_delay_between_attempts() {
        let retry = RetryController::new(RetryPolicy::new(10, Duration::from_secs(1)));
        let started = Instant::now();

        let result: Result<(), &str> = retry
            .attempt(|_| async { Err("unreachable") }, |_| {})
            .await;

        assert!(result.is_err());
        // 11 attempts, 10 waits in between
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }
}
