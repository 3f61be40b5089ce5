//! Bounded retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;

/// Retries a fallible async operation a fixed number of times.
///
/// After failed attempt `n` (1-based) the policy sleeps `base_delay * n`
/// before trying again. There is no sleep after the final attempt, no
/// jitter, and no cancellation: once every attempt fails the last error is
/// returned and earlier errors are only logged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Set the maximum number of attempts (minimum 1).
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the delay unit for linear backoff.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Backoff applied after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.base_delay
            .saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX))
    }

    /// Run `operation` until it succeeds or attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {}ms...",
                        attempt,
                        self.max_attempts,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(
                        "Attempt {}/{} failed: {}. No attempts left.",
                        attempt, self.max_attempts, err
                    );
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use tokio::time::Instant;

    use super::*;
    use crate::error::MockupError;

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(5),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    fn assert_gap(earlier: Instant, later: Instant, expected: Duration) {
        let gap = later - earlier;
        assert!(
            gap >= expected && gap < expected + Duration::from_millis(5),
            "gap {gap:?}, expected {expected:?}"
        );
    }

    #[test]
    fn test_linear_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(3, Duration::MAX);
        assert_eq!(policy.delay_for(2), Duration::MAX);
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        assert_eq!(policy.delay_for(usize::MAX), Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
        assert_eq!(RetryPolicy::default().with_max_attempts(0).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_two_delays() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        let recorder = attempts.clone();
        let result = policy
            .run(|| {
                let recorder = recorder.clone();
                async move {
                    let n = {
                        let mut at = recorder.lock().unwrap();
                        at.push(Instant::now());
                        at.len()
                    };
                    if n < 3 {
                        Err(MockupError::Context(format!("failure {n}")))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        let attempts = attempts.lock().unwrap();
        assert_eq!(attempts.len(), 3);
        assert_gap(start, attempts[0], Duration::ZERO);
        // 1000ms after the first failure, 2000ms after the second.
        assert_gap(attempts[0], attempts[1], Duration::from_millis(1000));
        assert_gap(attempts[1], attempts[2], Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error_without_trailing_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        let calls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let counter = calls.clone();
        let result: Result<()> = policy
            .run(|| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(MockupError::Context(format!("failure {n}")))
                }
            })
            .await;

        match result {
            Err(MockupError::Context(msg)) => assert_eq!(msg, "failure 3"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_elapsed(start, Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_does_not_sleep() {
        let policy = RetryPolicy::default();
        let start = Instant::now();
        let value = policy.run(|| async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
