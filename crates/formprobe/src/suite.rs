//! Sequential suite runner.
//!
//! Every selected case gets a fresh [`FormProbe`] over the shared session's
//! driver, runs `open → fill_sides → read_result` under a wall-clock limit,
//! and is reported independently. Failures, timeouts and panics are
//! case-local; the session is closed after the last case whatever happened.

use crate::case::TestCase;
use crate::config::ProbeConfig;
use crate::driver::ProbeDriver;
use crate::observation::ResultObservation;
use crate::probe::FormProbe;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;

/// Outcome of a single case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// Observation matched the expectation
    Passed,
    /// Any error, timeout or panic
    Failed,
    /// Not executed
    Skipped,
}

impl CaseStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        })
    }
}

/// Result of running (or skipping) one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case identifier
    pub id: String,
    /// Case name
    pub name: String,
    /// Outcome
    pub status: CaseStatus,
    /// Originating error message if failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why the case was not run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    /// Text read from the result block, when one was observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
    /// Wall-clock duration
    pub duration: Duration,
}

impl CaseResult {
    /// Create a passing result
    #[must_use]
    pub fn passed(case: &TestCase, observation: ResultObservation, duration: Duration) -> Self {
        Self {
            id: case.id.clone(),
            name: case.name.clone(),
            status: CaseStatus::Passed,
            error: None,
            skip_reason: None,
            observed: Some(observation.text),
            duration,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(case: &TestCase, error: impl Into<String>, duration: Duration) -> Self {
        Self {
            id: case.id.clone(),
            name: case.name.clone(),
            status: CaseStatus::Failed,
            error: Some(error.into()),
            skip_reason: None,
            observed: None,
            duration,
        }
    }

    /// Create a skipped result
    #[must_use]
    pub fn skipped(case: &TestCase) -> Self {
        Self {
            id: case.id.clone(),
            name: case.name.clone(),
            status: CaseStatus::Skipped,
            error: None,
            skip_reason: case.skip.clone(),
            observed: None,
            duration: Duration::ZERO,
        }
    }

    /// "TC-001: name"
    #[must_use]
    pub fn title(&self) -> String {
        format!("{}: {}", self.id, self.name)
    }
}

/// Results from running a suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Per-case results in execution order
    pub results: Vec<CaseResult>,
    /// Total duration
    pub duration: Duration,
    /// Error raised while closing the session, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teardown_error: Option<String>,
}

impl SuiteResults {
    /// Create empty results
    #[must_use]
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            results: Vec::new(),
            duration: Duration::ZERO,
            teardown_error: None,
        }
    }

    /// Check if no case failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Count passed cases
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(CaseStatus::Passed)
    }

    /// Count failed cases
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(CaseStatus::Failed)
    }

    /// Count skipped cases
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(CaseStatus::Skipped)
    }

    /// Get total case count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed cases
    #[must_use]
    pub fn failures(&self) -> Vec<&CaseResult> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }

    /// Look a result up by case id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CaseResult> {
        self.results.iter().find(|r| r.id == id)
    }

    fn count(&self, status: CaseStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Runs cases one after another against a single session
#[derive(Debug, Clone, Default)]
pub struct SuiteRunner {
    /// Probe configuration shared by every case
    pub config: ProbeConfig,
    /// Only run cases whose id or name contains this
    pub filter: Option<String>,
    /// Run cases that are marked skipped
    pub include_skipped: bool,
    /// Name used in reports
    pub suite_name: String,
}

impl SuiteRunner {
    /// Create a runner with the given probe configuration
    #[must_use]
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            filter: None,
            include_skipped: false,
            suite_name: "triangle".to_string(),
        }
    }

    /// Only run cases matching `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Run skipped cases as well
    #[must_use]
    pub const fn with_include_skipped(mut self, include: bool) -> Self {
        self.include_skipped = include;
        self
    }

    /// Set the suite name
    #[must_use]
    pub fn with_suite_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Cases that pass the filter, in catalog order
    #[must_use]
    pub fn select<'c>(&self, cases: &'c [TestCase]) -> Vec<&'c TestCase> {
        cases
            .iter()
            .filter(|c| self.filter.as_deref().is_none_or(|f| c.matches(f)))
            .collect()
    }

    /// Run the selected cases, then close the session.
    ///
    /// The session is closed even if cases fail, time out or panic. A close
    /// failure is recorded in [`SuiteResults::teardown_error`].
    pub async fn run_scoped<D: ProbeDriver>(
        &self,
        mut session: Session<D>,
        cases: &[TestCase],
    ) -> SuiteResults {
        let mut results = self.run(&mut session, cases).await;
        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "teardown failed");
            results.teardown_error = Some(e.to_string());
        }
        results
    }

    /// Run the selected cases sequentially on an open session
    pub async fn run<D: ProbeDriver>(
        &self,
        session: &mut Session<D>,
        cases: &[TestCase],
    ) -> SuiteResults {
        let start = Instant::now();
        let selected = self.select(cases);
        tracing::info!(
            suite = %self.suite_name,
            selected = selected.len(),
            total = cases.len(),
            "running suite"
        );

        let mut results = SuiteResults::new(self.suite_name.clone());
        for case in selected {
            let result = if case.is_skipped() && !self.include_skipped {
                CaseResult::skipped(case)
            } else {
                match session.driver_mut() {
                    Ok(driver) => self.run_case(driver, case).await,
                    Err(e) => CaseResult::failed(case, e.to_string(), Duration::ZERO),
                }
            };
            log_result(&result);
            results.results.push(result);
        }

        results.duration = start.elapsed();
        tracing::info!(
            passed = results.passed_count(),
            failed = results.failed_count(),
            skipped = results.skipped_count(),
            duration_ms = results.duration.as_millis() as u64,
            "suite finished"
        );
        results
    }

    /// Run one case with a fresh probe, under the case timeout, catching
    /// panics
    pub async fn run_case<D: ProbeDriver>(&self, driver: &mut D, case: &TestCase) -> CaseResult {
        let start = Instant::now();
        let limit = self.config.case_timeout();
        let span = tracing::info_span!("case", case = %case.id);

        let guarded = tokio::time::timeout(limit, execute_case(driver, &self.config, case));
        let outcome = AssertUnwindSafe(guarded)
            .catch_unwind()
            .instrument(span)
            .await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(Ok(Ok(observation))) => CaseResult::passed(case, observation, elapsed),
            Ok(Ok(Err(e))) => CaseResult::failed(case, e.to_string(), elapsed),
            Ok(Err(_)) => {
                let e = ProbeError::Timeout {
                    what: format!("case {}", case.id),
                    ms: self.config.case_timeout_ms,
                };
                CaseResult::failed(case, e.to_string(), elapsed)
            }
            Err(panic) => CaseResult::failed(
                case,
                format!("case panicked: {}", panic_message(panic.as_ref())),
                elapsed,
            ),
        }
    }
}

async fn execute_case<D: ProbeDriver>(
    driver: &mut D,
    config: &ProbeConfig,
    case: &TestCase,
) -> ProbeResult<ResultObservation> {
    let mut probe = FormProbe::new(driver, config);
    probe.open().await?;
    let [a, b, c] = case.inputs.clone();
    probe.fill_sides(a, b, c).await?;
    probe.read_result(&case.expected).await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn log_result(result: &CaseResult) {
    let duration_ms = result.duration.as_millis() as u64;
    match result.status {
        CaseStatus::Passed => {
            tracing::info!(case = %result.id, duration_ms, "case passed");
        }
        CaseStatus::Failed => tracing::info!(
            case = %result.id,
            duration_ms,
            error = result.error.as_deref().unwrap_or_default(),
            "case failed"
        ),
        CaseStatus::Skipped => tracing::info!(
            case = %result.id,
            reason = result.skip_reason.as_deref().unwrap_or_default(),
            "case skipped"
        ),
    }
}
