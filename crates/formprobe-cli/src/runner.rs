//! Handlers for the `list` and `run` subcommands

use crate::commands::{ListArgs, OutputFormat, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Printer;
use formprobe::report::{self, ReportFormat};
use formprobe::{catalog, load_cases, BrowserConfig, ProbeConfig, SuiteResults, SuiteRunner, TestCase};
use std::path::Path;

/// Built-in catalog, or the cases in `path`
///
/// # Errors
///
/// Returns error if the case file cannot be read or parsed, or is empty
pub fn resolve_cases(path: Option<&Path>) -> CliResult<Vec<TestCase>> {
    let Some(path) = path else {
        return Ok(catalog());
    };
    let cases = load_cases(path)?;
    if cases.is_empty() {
        return Err(CliError::config(format!("{} contains no cases", path.display())));
    }
    Ok(cases)
}

/// Probe configuration for a run
#[must_use]
pub fn probe_config(args: &RunArgs) -> ProbeConfig {
    ProbeConfig::default().with_url(args.url.clone())
}

/// Browser configuration for a run
#[must_use]
pub fn browser_config(args: &RunArgs) -> BrowserConfig {
    let mut config = BrowserConfig::default().with_headless(!args.headed);
    if args.no_sandbox {
        config = config.with_no_sandbox();
    }
    if let Some(path) = &args.chromium_path {
        config = config.with_chromium_path(path.clone());
    }
    config
}

/// Suite runner for a run
#[must_use]
pub fn suite_runner(args: &RunArgs) -> SuiteRunner {
    let mut runner =
        SuiteRunner::new(probe_config(args)).with_include_skipped(args.include_skipped);
    if let Some(filter) = &args.filter {
        runner = runner.with_filter(filter.clone());
    }
    runner
}

/// `formprobe list`
///
/// # Errors
///
/// Returns error if the case file is invalid or rendering fails
pub fn run_list(config: &CliConfig, args: &ListArgs) -> CliResult<()> {
    let cases = resolve_cases(args.cases.as_deref())?;
    let printer = Printer::new(config.color.should_color(), config.verbosity.is_quiet());
    match args.format {
        OutputFormat::Text => printer.catalog(&cases),
        OutputFormat::Json => printer.raw(&report::render_catalog_json(&cases)?),
    }
    Ok(())
}

/// `formprobe run`: returns the results so the caller can pick the exit
/// code
///
/// # Errors
///
/// Returns error if the cases cannot be loaded, the browser cannot be
/// launched, or the report cannot be written
pub async fn run_suite(config: &CliConfig, args: &RunArgs) -> CliResult<SuiteResults> {
    let cases = resolve_cases(args.cases.as_deref())?;
    let runner = suite_runner(args);
    if runner.select(&cases).is_empty() {
        return Err(CliError::invalid_argument(format!(
            "filter '{}' matches no case",
            args.filter.as_deref().unwrap_or_default()
        )));
    }

    let results = execute(&runner, args, &cases).await?;

    let printer = Printer::new(config.color.should_color(), config.verbosity.is_quiet());
    match args.format {
        OutputFormat::Text => {
            printer.header(&format!("{} @ {}", runner.suite_name, args.url));
            for result in &results.results {
                printer.case(result);
            }
            printer.summary(&results);
        }
        OutputFormat::Json => printer.raw(&report::render_json(&results)?),
    }

    if let Some(path) = &args.output {
        report::write_report(&results, ReportFormat::from(args.format), path)?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(results)
}

#[cfg(feature = "browser")]
async fn execute(runner: &SuiteRunner, args: &RunArgs, cases: &[TestCase]) -> CliResult<SuiteResults> {
    use formprobe::{ChromiumDriver, Session};

    let driver = ChromiumDriver::launch(browser_config(args)).await?;
    Ok(runner.run_scoped(Session::new(driver), cases).await)
}

#[cfg(not(feature = "browser"))]
async fn execute(_runner: &SuiteRunner, args: &RunArgs, _cases: &[TestCase]) -> CliResult<SuiteResults> {
    tracing::debug!(headed = args.headed, "run requested without browser support");
    Err(CliError::BrowserUnavailable)
}
