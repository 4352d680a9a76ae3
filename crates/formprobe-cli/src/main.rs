//! FormProbe CLI: run the triangle form suite from the command line
//!
//! ## Usage
//!
//! ```bash
//! formprobe list                          # Show the built-in catalog
//! formprobe run                           # Run it in headless Chromium
//! formprobe run --filter TC-01 --headed   # Watch a subset run
//! formprobe run --format json -o out.json # Machine-readable report
//! ```

use clap::Parser;
use formprobe_cli::{logging, run_list, run_suite, Cli, CliConfig, CliResult, Commands, Verbosity};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);

    match run(&cli, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_format(cli.log_format())
}

/// Returns whether every executed case passed
async fn run(cli: &Cli, config: &CliConfig) -> CliResult<bool> {
    match &cli.command {
        Commands::List(args) => {
            run_list(config, args)?;
            Ok(true)
        }
        Commands::Run(args) => {
            let results = run_suite(config, args).await?;
            Ok(results.all_passed())
        }
    }
}
