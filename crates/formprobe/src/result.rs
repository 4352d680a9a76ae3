//! Result and error types for FormProbe.

use thiserror::Error;

/// Result type for FormProbe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while probing a form page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Navigation error (page unreachable)
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// The result block never appeared after every submit attempt
    #[error("Submit did not register: no result appeared after {attempts} click attempt(s); last: {last}")]
    SubmissionError {
        /// Number of click attempts made
        attempts: u32,
        /// Failure of the final attempt
        last: String,
    },

    /// Observed text or class does not match the expectation
    #[error("Assertion failed: {message}")]
    AssertionError {
        /// Error message
        message: String,
    },

    /// A bounded wait expired
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element could not be located
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Operation called in the wrong probe state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Driver-level failure (CDP, script evaluation, input dispatch)
    #[error("Driver error: {message}")]
    DriverError {
        /// Error message
        message: String,
    },

    /// Case file could not be parsed
    #[error("Invalid case file: {message}")]
    CaseFileError {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::DriverError {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionError {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Whether this error was raised by the harness rather than by a
    /// mismatch between the page and the expectation
    #[must_use]
    pub const fn is_harness_error(&self) -> bool {
        !matches!(self, Self::AssertionError { .. })
    }
}
