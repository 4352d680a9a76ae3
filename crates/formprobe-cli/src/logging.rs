//! Tracing subscriber setup

use crate::config::{CliConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise derived from verbosity
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()))
}

/// Install the global subscriber. Logs go to stderr so reports on stdout
/// stay machine-readable.
///
/// Returns `false` if a subscriber was already installed.
pub fn init(config: &CliConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match config.log_format {
        LogFormat::Pretty => builder
            .with_ansi(config.color.should_color())
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_filter_follows_verbosity() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = CliConfig::new().with_verbosity(Verbosity::Debug);
        let filter = env_filter(&config).to_string();
        assert!(filter.contains("formprobe=debug"));
    }

    #[test]
    fn test_second_init_is_refused() {
        let config = CliConfig::new();
        let _ = init(&config);
        assert!(!init(&config));
    }
}
