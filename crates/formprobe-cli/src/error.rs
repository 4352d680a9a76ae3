//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// `run` was invoked in a build without the `browser` feature
    #[error("browser support is not compiled in; rebuild with --features browser")]
    BrowserUnavailable,

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// FormProbe library error
    #[error("{0}")]
    Probe(#[from] formprobe::ProbeError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// `1` is reserved for "suite ran and at least one case failed".
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. } | Self::InvalidArgument { .. } => 2,
            Self::BrowserUnavailable
            | Self::Probe(formprobe::ProbeError::BrowserLaunchError { .. }) => 3,
            Self::Io(_) | Self::Probe(_) => 4,
        }
    }
}
