//! Bounded retry combinator.
//!
//! Re-runs an async attempt a fixed number of times, each attempt capped by
//! an optional timeout. An attempt succeeds when it returns `Ok`; the first
//! success ends the loop. Used to re-click a submit control whose click does
//! not always register.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (at least one attempt always runs)
    pub max_attempts: u32,
    /// Hard cap for a single attempt
    pub attempt_timeout: Option<Duration>,
    /// Pause between a failed attempt and the next one
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: None,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given number of attempts
    #[must_use]
    pub const fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempt_timeout: None,
            delay: Duration::ZERO,
        }
    }

    /// Cap each attempt at `timeout`
    #[must_use]
    pub const fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Pause between attempts
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Effective number of attempts
    #[must_use]
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Why one attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure<E> {
    /// The attempt returned an error
    Failed(E),
    /// The attempt exceeded the per-attempt timeout
    TimedOut(Duration),
}

impl<E: fmt::Display> fmt::Display for AttemptFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "{e}"),
            Self::TimedOut(d) => write!(f, "attempt timed out after {}ms", d.as_millis()),
        }
    }
}

/// Result of a successful retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    /// Value produced by the successful attempt
    pub value: T,
    /// 1-based number of the successful attempt
    pub attempt: u32,
    /// Total duration of all attempts
    pub duration: Duration,
}

/// Error when every attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Number of attempts made
    pub attempts: u32,
    /// Failure of the last attempt
    pub last: AttemptFailure<E>,
    /// Total duration of all attempts
    pub duration: Duration,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempt(s) ({:.2}s): {}",
            self.attempts,
            self.duration.as_secs_f64(),
            self.last
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryExhausted<E> {}

/// Retry combinator
///
/// ## Example
///
/// ```ignore
/// let outcome = Retry::new(RetryPolicy::attempts(3))
///     .run(|attempt| async move { click_and_wait(attempt).await })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Retry {
    policy: RetryPolicy,
    description: Option<String>,
}

impl Retry {
    /// Create a retry combinator
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            description: None,
        }
    }

    /// Label used in log output
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Get the policy
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `attempt` until it succeeds or the attempts are used up.
    ///
    /// `attempt` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] carrying the last failure when no attempt
    /// succeeded.
    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> Result<RetryOutcome<T>, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let start = Instant::now();
        let max = self.policy.effective_attempts();
        let what = self.description.as_deref().unwrap_or("operation");
        let mut last = None;

        for n in 1..=max {
            let fut = attempt(n);
            let result = match self.policy.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(r) => r.map_err(AttemptFailure::Failed),
                    Err(_) => Err(AttemptFailure::TimedOut(limit)),
                },
                None => fut.await.map_err(AttemptFailure::Failed),
            };

            match result {
                Ok(value) => {
                    if n > 1 {
                        tracing::debug!(what, attempt = n, "succeeded after retry");
                    }
                    return Ok(RetryOutcome {
                        value,
                        attempt: n,
                        duration: start.elapsed(),
                    });
                }
                Err(failure) => {
                    tracing::warn!(what, attempt = n, max, error = %failure, "attempt failed");
                    last = Some(failure);
                }
            }

            if n < max && !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        Err(RetryExhausted {
            attempts: max,
            last: last.unwrap_or(AttemptFailure::TimedOut(Duration::ZERO)),
            duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Target that fails a fixed number of times before succeeding
    #[derive(Debug)]
    struct FlakyTarget {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakyTarget {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures_left: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
            })
        }

        async fn poke(&self) -> Result<&'static str, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left == 0 {
                Ok("done")
            } else {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                Err("click ignored".to_string())
            }
        }
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_default_policy() {
            let policy = RetryPolicy::default();
            assert_eq!(policy.max_attempts, 3);
            assert!(policy.attempt_timeout.is_none());
            assert_eq!(policy.delay, Duration::ZERO);
        }

        #[test]
        fn test_zero_attempts_still_runs_once() {
            assert_eq!(RetryPolicy::attempts(0).effective_attempts(), 1);
        }

        #[test]
        fn test_builder() {
            let policy = RetryPolicy::attempts(5)
                .with_attempt_timeout(Duration::from_millis(200))
                .with_delay(Duration::from_millis(10));
            assert_eq!(policy.max_attempts, 5);
            assert_eq!(policy.attempt_timeout, Some(Duration::from_millis(200)));
            assert_eq!(policy.delay, Duration::from_millis(10));
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_first_attempt_success() {
            let target = FlakyTarget::new(0);
            let outcome = Retry::new(RetryPolicy::attempts(3))
                .run(|_| {
                    let t = Arc::clone(&target);
                    async move { t.poke().await }
                })
                .await
                .unwrap();
            assert_eq!(outcome.value, "done");
            assert_eq!(outcome.attempt, 1);
            assert_eq!(target.calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_flaky_target_recovers() {
            let target = FlakyTarget::new(2);
            let outcome = Retry::new(RetryPolicy::attempts(3))
                .with_description("submit")
                .run(|_| {
                    let t = Arc::clone(&target);
                    async move { t.poke().await }
                })
                .await
                .unwrap();
            assert_eq!(outcome.attempt, 3);
            assert_eq!(target.calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test(start_paused = true)]
        async fn test_exhausted_reports_last_failure() {
            let target = FlakyTarget::new(10);
            let err = Retry::new(RetryPolicy::attempts(3))
                .run(|_| {
                    let t = Arc::clone(&target);
                    async move { t.poke().await }
                })
                .await
                .unwrap_err();
            assert_eq!(err.attempts, 3);
            assert_eq!(err.last, AttemptFailure::Failed("click ignored".to_string()));
            assert_eq!(target.calls.load(Ordering::SeqCst), 3);
            assert!(err.to_string().contains("gave up after 3 attempt(s)"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_attempt_timeout_counts_as_failure() {
            let policy = RetryPolicy::attempts(2).with_attempt_timeout(Duration::from_millis(100));
            let start = Instant::now();
            let err = Retry::new(policy)
                .run(|_| async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok::<(), String>(())
                })
                .await
                .unwrap_err();
            assert_eq!(err.attempts, 2);
            assert_eq!(err.last, AttemptFailure::TimedOut(Duration::from_millis(100)));
            assert_eq!(start.elapsed(), Duration::from_millis(200));
        }

        #[tokio::test(start_paused = true)]
        async fn test_attempt_numbers_are_one_based() {
            let mut seen = Vec::new();
            let _ = Retry::new(RetryPolicy::attempts(3))
                .run(|n| {
                    seen.push(n);
                    async { Err::<(), _>("no") }
                })
                .await;
            assert_eq!(seen, vec![1, 2, 3]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_delay_between_attempts() {
            let start = Instant::now();
            let _ = Retry::new(RetryPolicy::attempts(3).with_delay(Duration::from_millis(50)))
                .run(|_| async { Err::<(), _>("no") })
                .await;
            assert_eq!(start.elapsed(), Duration::from_millis(100));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_calls_never_exceed_budget(max in 1u32..8, failures in 0u32..10) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .start_paused(true)
                    .build()
                    .unwrap();
                let target = FlakyTarget::new(failures);
                let result = rt.block_on(Retry::new(RetryPolicy::attempts(max)).run(|_| {
                    let t = Arc::clone(&target);
                    async move { t.poke().await }
                }));
                let calls = target.calls.load(Ordering::SeqCst);
                prop_assert!(calls <= max);
                prop_assert_eq!(result.is_ok(), failures < max);
                if let Ok(outcome) = result {
                    prop_assert_eq!(outcome.attempt, failures + 1);
                }
            }
        }
    }
}
