//! Probe configuration.
//!
//! The wait budgets are fixed constants of the suite; `ProbeConfig` carries
//! them so tests can shrink them, but the CLI never exposes them.

use crate::locator::FormLocators;
use crate::retry::RetryPolicy;
use crate::wait::{
    WaitOptions, DEFAULT_POLL_INTERVAL_MS, ELEMENT_APPEAR_TIMEOUT_MS, TEXT_POPULATED_TIMEOUT_MS,
    VISIBILITY_TIMEOUT_MS,
};
use std::time::Duration;

/// Page under test
pub const TRIANGLE_URL: &str = "https://playground.learnqa.ru/puzzle/triangle";

/// Wall-clock limit for a whole case
pub const CASE_TIMEOUT_MS: u64 = 30_000;

/// Submit clicks before giving up
pub const SUBMIT_ATTEMPTS: u32 = 3;

/// Configuration for a [`crate::FormProbe`] and the suite around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Page under test
    pub url: String,
    /// Locator map of the form
    pub locators: FormLocators,
    /// Submit clicks before giving up
    pub submit_attempts: u32,
    /// Budget for the result element to appear after a click
    pub appear_timeout_ms: u64,
    /// Budget for the result element to become visible
    pub visible_timeout_ms: u64,
    /// Budget for the result text to become non-empty
    pub text_timeout_ms: u64,
    /// Polling interval for all waits
    pub poll_interval_ms: u64,
    /// Wall-clock limit for a whole case
    pub case_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: TRIANGLE_URL.to_string(),
            locators: FormLocators::TRIANGLE,
            submit_attempts: SUBMIT_ATTEMPTS,
            appear_timeout_ms: ELEMENT_APPEAR_TIMEOUT_MS,
            visible_timeout_ms: VISIBILITY_TIMEOUT_MS,
            text_timeout_ms: TEXT_POPULATED_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            case_timeout_ms: CASE_TIMEOUT_MS,
        }
    }
}

impl ProbeConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the locator map
    #[must_use]
    pub fn with_locators(mut self, locators: FormLocators) -> Self {
        self.locators = locators;
        self
    }

    /// Set the number of submit attempts
    #[must_use]
    pub const fn with_submit_attempts(mut self, attempts: u32) -> Self {
        self.submit_attempts = attempts;
        self
    }

    /// Set the per-case timeout
    #[must_use]
    pub const fn with_case_timeout(mut self, ms: u64) -> Self {
        self.case_timeout_ms = ms;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Wait options for the result element to appear
    #[must_use]
    pub const fn appear_wait(&self) -> WaitOptions {
        WaitOptions::new(self.appear_timeout_ms).with_poll_interval(self.poll_interval_ms)
    }

    /// Wait options for the result element to become visible
    #[must_use]
    pub const fn visible_wait(&self) -> WaitOptions {
        WaitOptions::new(self.visible_timeout_ms).with_poll_interval(self.poll_interval_ms)
    }

    /// Wait options for the result text to fill in
    #[must_use]
    pub const fn text_wait(&self) -> WaitOptions {
        WaitOptions::new(self.text_timeout_ms).with_poll_interval(self.poll_interval_ms)
    }

    /// Retry policy for the submit click
    #[must_use]
    pub const fn submit_policy(&self) -> RetryPolicy {
        RetryPolicy::attempts(self.submit_attempts).with_attempt_timeout(Duration::from_millis(
            self.appear_timeout_ms + self.visible_timeout_ms + self.poll_interval_ms,
        ))
    }

    /// Per-case timeout as Duration
    #[must_use]
    pub const fn case_timeout(&self) -> Duration {
        Duration::from_millis(self.case_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ProbeConfig::default();
        assert_eq!(config.url, TRIANGLE_URL);
        assert_eq!(config.submit_attempts, 3);
        assert_eq!(config.appear_timeout_ms, 1000);
        assert_eq!(config.visible_timeout_ms, 1000);
        assert_eq!(config.text_timeout_ms, 2000);
        assert_eq!(config.case_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_builder() {
        let config = ProbeConfig::new()
            .with_url("http://localhost:8080/triangle")
            .with_submit_attempts(5)
            .with_case_timeout(1000)
            .with_poll_interval(10);
        assert_eq!(config.url, "http://localhost:8080/triangle");
        assert_eq!(config.submit_attempts, 5);
        assert_eq!(config.case_timeout_ms, 1000);
        assert_eq!(config.text_wait().poll_interval_ms, 10);
    }

    #[test]
    fn test_submit_policy_caps_attempt() {
        let policy = ProbeConfig::default().submit_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.attempt_timeout, Some(Duration::from_millis(2050)));
    }
}
