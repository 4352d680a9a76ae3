//! FormProbe CLI library
//!
//! Argument parsing, configuration, logging setup and the `list` / `run`
//! handlers behind the `formprobe` binary.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ListArgs, OutputFormat, RunArgs};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Printer;
pub use runner::{browser_config, probe_config, resolve_cases, run_list, run_suite, suite_runner};
