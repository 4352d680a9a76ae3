//! CLI command definitions using clap

use crate::config::{ColorChoice, LogFormat};
use clap::{Parser, Subcommand, ValueEnum};
use formprobe::ReportFormat;
use std::path::PathBuf;

/// FormProbe: end-to-end checks for the triangle puzzle form
#[derive(Parser, Debug)]
#[command(name = "formprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit log events as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List test cases
    List(ListArgs),

    /// Run the suite against the page in Chromium
    Run(RunArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Load cases from a YAML or JSON file instead of the built-in catalog
    #[arg(long)]
    pub cases: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Only run cases whose id or name contains this (case-insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Also run cases marked as skipped
    #[arg(long)]
    pub include_skipped: bool,

    /// Load cases from a YAML or JSON file instead of the built-in catalog
    #[arg(long)]
    pub cases: Option<PathBuf>,

    /// Page under test
    #[arg(long, default_value = formprobe::TRIANGLE_URL)]
    pub url: String,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Path to the Chromium executable
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Also write the report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Color choice argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Detect from terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

impl Cli {
    /// Log format selected by `--log-json`
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}
