//! Bounded waits.
//!
//! One poll-with-deadline primitive, [`poll_until`], backs every wait the
//! probe performs: element appearance, visibility and text population. The
//! probe closure returns `Ok(Some(value))` when the condition holds,
//! `Ok(None)` to keep polling, and `Err` to abort immediately.
//!
//! Time is measured with `tokio::time`, so tests may run with a paused clock.

use crate::result::{ProbeError, ProbeResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Budget for the result element to appear after a click
pub const ELEMENT_APPEAR_TIMEOUT_MS: u64 = 1_000;

/// Budget for the result element to become visible once present
pub const VISIBILITY_TIMEOUT_MS: u64 = 1_000;

/// Budget for the result text to become non-empty
pub const TEXT_POPULATED_TIMEOUT_MS: u64 = 2_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: ELEMENT_APPEAR_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create wait options with the given timeout and the default interval
    #[must_use]
    pub const fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields a value or the deadline passes.
///
/// The probe is always evaluated at least once, and once more at the
/// deadline, so a zero timeout degenerates to a single check.
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] naming `what` when the deadline passes,
/// or the first error the probe itself returns.
pub async fn poll_until<T, F, Fut>(options: WaitOptions, what: &str, mut probe: F) -> ProbeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let interval = options.poll_interval().max(Duration::from_millis(1));
    let mut polls: u32 = 0;

    loop {
        polls += 1;
        if let Some(value) = probe().await? {
            tracing::trace!(what, polls, elapsed_ms = start.elapsed().as_millis() as u64, "wait satisfied");
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(what, polls, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(ProbeError::Timeout {
                what: what.to_string(),
                ms: options.timeout_ms,
            });
        }

        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Poll a boolean condition until it holds or the deadline passes.
///
/// # Errors
///
/// Same as [`poll_until`].
pub async fn wait_for<F, Fut>(options: WaitOptions, what: &str, mut condition: F) -> ProbeResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    poll_until(options, what, || {
        let fut = condition();
        async move { Ok::<_, ProbeError>(fut.await?.then_some(())) }
    })
    .await
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_wait_options_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, ELEMENT_APPEAR_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_wait_options_chained() {
            let opts = WaitOptions::new(2000).with_poll_interval(10);
            assert_eq!(opts.timeout(), Duration::from_millis(2000));
            assert_eq!(opts.poll_interval(), Duration::from_millis(10));
            assert_eq!(opts.with_timeout(5).timeout_ms, 5);
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_immediate_success() {
            let value = poll_until(WaitOptions::new(1000), "value", || async { Ok(Some(7)) })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }

        #[tokio::test(start_paused = true)]
        async fn test_succeeds_after_several_polls() {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);
            let start = Instant::now();

            let value = poll_until(WaitOptions::new(1000), "third poll", move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok((n >= 3).then_some(n)) }
            })
            .await
            .unwrap();

            assert_eq!(value, 3);
            assert_eq!(start.elapsed(), Duration::from_millis(100));
        }

        #[tokio::test(start_paused = true)]
        async fn test_times_out_at_deadline() {
            let start = Instant::now();
            let err = poll_until::<(), _, _>(WaitOptions::new(1000), "never", || async { Ok(None) })
                .await
                .unwrap_err();

            assert!(matches!(err, ProbeError::Timeout { ms: 1000, ref what } if what == "never"));
            assert_eq!(start.elapsed(), Duration::from_millis(1000));
        }

        #[tokio::test(start_paused = true)]
        async fn test_zero_timeout_checks_once() {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);
            let result = poll_until::<(), _, _>(WaitOptions::new(0), "once", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(None) }
            })
            .await;

            assert!(result.is_err());
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_probe_error_aborts() {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);
            let err = poll_until::<(), _, _>(WaitOptions::new(1000), "driver", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ProbeError::driver("connection reset")) }
            })
            .await
            .unwrap_err();

            assert!(matches!(err, ProbeError::DriverError { .. }));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_for_condition() {
            let calls = Arc::new(AtomicU32::new(0));
            let counter = Arc::clone(&calls);
            wait_for(WaitOptions::new(500), "flag", move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n == 4) }
            })
            .await
            .unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 5);
        }
    }
}
