//! Terminal output for case lists and suite results

use console::{style, Style, Term};
use formprobe::report::{case_line, format_duration, status_tag};
use formprobe::{CaseResult, CaseStatus, SuiteResults, TestCase};

/// Writes human-readable output to stdout, styled when colors are on
#[derive(Debug)]
pub struct Printer {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Printer {
    /// Create a new printer
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Write a raw block (JSON, plain reports) regardless of quiet mode
    pub fn raw(&self, body: &str) {
        let _ = self.term.write_str(body);
        if !body.ends_with('\n') {
            let _ = self.term.write_line("");
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line(&styled);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print the case catalog
    pub fn catalog(&self, cases: &[TestCase]) {
        for case in cases {
            let inputs = case
                .inputs
                .iter()
                .map(|v| format!("{:?}", v.as_input()))
                .collect::<Vec<_>>()
                .join(", ");
            let mut line = format!("{}  [{inputs}] => {}", self.id(&case.id), case.expected);
            if let Some(reason) = &case.skip {
                line.push_str(&self.dim(&format!("  (skipped: {reason})")));
            }
            let _ = self.term.write_line(&format!("{line}  {}", self.dim(&case.name)));
        }
    }

    /// Print one case result; failures are shown even in quiet mode
    pub fn case(&self, result: &CaseResult) {
        if self.quiet && !result.status.is_failed() {
            return;
        }
        if !self.use_color {
            let _ = self.term.write_line(&case_line(result));
        } else {
            let tag = status_tag(result.status);
            let tag = match result.status {
                CaseStatus::Passed => style(tag).green().bold(),
                CaseStatus::Failed => style(tag).red().bold(),
                CaseStatus::Skipped => style(tag).yellow(),
            };
            let detail = match result.status {
                CaseStatus::Skipped => {
                    format!("({})", result.skip_reason.as_deref().unwrap_or("skipped"))
                }
                _ => format!("[{}]", format_duration(result.duration)),
            };
            let _ = self.term.write_line(&format!(
                "{tag}  {} {}",
                result.title(),
                self.dim(&detail)
            ));
        }
        if let Some(error) = &result.error {
            let _ = self.term.write_line(&format!("      {error}"));
        }
    }

    /// Print test summary
    pub fn summary(&self, results: &SuiteResults) {
        let failed = results.failed_count();
        if self.quiet && failed == 0 {
            return;
        }

        if let Some(error) = &results.teardown_error {
            self.warning(&format!("browser teardown failed: {error}"));
        }

        let passed = results.passed_count();
        let skipped = results.skipped_count();
        let total = results.total();
        let duration = format_duration(results.duration);

        let _ = self.term.write_line("");
        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} cases in {} ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} cases in {duration} ({passed} passed, {failed} failed, {skipped} skipped)"
            ));
        }
    }

    fn id(&self, id: &str) -> String {
        if self.use_color {
            style(id).cyan().bold().to_string()
        } else {
            id.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }
}
