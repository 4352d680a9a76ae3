//! Plain-text and JSON rendering of suite results and case catalogs.

use crate::case::TestCase;
use crate::result::ProbeResult;
use crate::suite::{CaseResult, CaseStatus, SuiteResults};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Short upper-case tag for a status
#[must_use]
pub const fn status_tag(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Passed => "PASS",
        CaseStatus::Failed => "FAIL",
        CaseStatus::Skipped => "SKIP",
    }
}

/// Format a duration as "12ms" below a second, "1.50s" above
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// One line per case, without the trailing newline
#[must_use]
pub fn case_line(result: &CaseResult) -> String {
    let tag = status_tag(result.status);
    match result.status {
        CaseStatus::Skipped => format!(
            "{tag}  {} ({})",
            result.title(),
            result.skip_reason.as_deref().unwrap_or("skipped")
        ),
        _ => format!("{tag}  {} [{}]", result.title(), format_duration(result.duration)),
    }
}

/// "triangle: 13 passed, 1 failed, 4 skipped (18 total) in 21.40s"
#[must_use]
pub fn summary_line(results: &SuiteResults) -> String {
    format!(
        "{}: {} passed, {} failed, {} skipped ({} total) in {}",
        results.suite_name,
        results.passed_count(),
        results.failed_count(),
        results.skipped_count(),
        results.total(),
        format_duration(results.duration)
    )
}

/// Render results as text: one line per case, failure messages indented
/// beneath, then the summary.
#[must_use]
pub fn render_text(results: &SuiteResults) -> String {
    let mut out = String::new();
    for result in &results.results {
        let _ = writeln!(out, "{}", case_line(result));
        if let Some(error) = &result.error {
            let _ = writeln!(out, "      {error}");
        }
    }
    if let Some(error) = &results.teardown_error {
        let _ = writeln!(out, "teardown: {error}");
    }
    let _ = writeln!(out, "{}", summary_line(results));
    out
}

/// Render results as pretty JSON
///
/// # Errors
///
/// Returns error if serialization fails
pub fn render_json(results: &SuiteResults) -> ProbeResult<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Render results in the given format
///
/// # Errors
///
/// Returns error if serialization fails
pub fn render(results: &SuiteResults, format: ReportFormat) -> ProbeResult<String> {
    match format {
        ReportFormat::Text => Ok(render_text(results)),
        ReportFormat::Json => render_json(results),
    }
}

/// Write a report to a file
///
/// # Errors
///
/// Returns error if serialization or file writing fails
pub fn write_report(results: &SuiteResults, format: ReportFormat, path: &Path) -> ProbeResult<()> {
    let body = render(results, format)?;
    std::fs::write(path, body)?;
    tracing::debug!(path = %path.display(), ?format, "report written");
    Ok(())
}

/// Render a case list as text, one case per line
#[must_use]
pub fn render_catalog_text(cases: &[TestCase]) -> String {
    let mut out = String::new();
    for case in cases {
        let inputs = case
            .inputs
            .iter()
            .map(|v| format!("{:?}", v.as_input()))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(out, "{}  [{inputs}] => {}", case.title(), case.expected);
        if let Some(reason) = &case.skip {
            let _ = write!(out, "  (skipped: {reason})");
        }
        out.push('\n');
    }
    out
}

/// Render a case list as pretty JSON
///
/// # Errors
///
/// Returns error if serialization fails
pub fn render_catalog_json(cases: &[TestCase]) -> ProbeResult<String> {
    Ok(serde_json::to_string_pretty(cases)?)
}
