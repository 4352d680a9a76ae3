//! FormProbe: end-to-end browser harness for form-driven pages
//!
//! FormProbe drives a third-party page through a browser, types values into
//! its inputs, submits, and asserts on the rendered result. It ships with a
//! suite for the triangle-classification puzzle page.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    FORMPROBE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ TestCase   │    │ SuiteRunner│    │ FormProbe  │            │
//! │   │ catalog /  │───►│ (Session,  │───►│ open/fill/ │            │
//! │   │ case file  │    │  timeout)  │    │ read       │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             ▼                    │
//! │                          ┌──────────────────────────────┐        │
//! │                          │ ProbeDriver                  │        │
//! │                          │  ChromiumDriver | MockDriver │        │
//! │                          └──────────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use formprobe::{catalog, MockDriver, ProbeConfig, RenderedResult, Session, SuiteRunner};
//!
//! # async fn demo() {
//! let driver = MockDriver::with_fixed_result(RenderedResult::success("Это прямоугольный треугольник"));
//! let runner = SuiteRunner::new(ProbeConfig::default()).with_filter("TC-001");
//! let results = runner.run_scoped(Session::new(driver), &catalog()).await;
//! assert!(results.all_passed());
//! # }
//! ```

#![warn(missing_docs)]

mod browser;
mod case;
mod config;
mod driver;
mod locator;
mod observation;
mod probe;
mod result;
mod session;
mod suite;

/// Scripted form page for tests
pub mod mock;

/// Plain-text and JSON reports
pub mod report;

/// Bounded retry of an async operation
pub mod retry;

/// Bounded waits
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use browser::BrowserConfig;
pub use case::{catalog, load_cases, SideValue, TestCase};
pub use config::{ProbeConfig, CASE_TIMEOUT_MS, SUBMIT_ATTEMPTS, TRIANGLE_URL};
pub use driver::{ElementHandle, Key, ProbeDriver};
pub use locator::{FormField, FormLocators, Selector};
pub use mock::{MockDriver, RenderedResult};
pub use observation::{phrases, Outcome, ResultObservation, ERROR_CLASS, SUCCESS_CLASS};
pub use probe::{FormProbe, ProbeState};
pub use report::ReportFormat;
pub use result::{ProbeError, ProbeResult};
pub use retry::{Retry, RetryPolicy};
pub use session::{Session, SessionState};
pub use suite::{CaseResult, CaseStatus, SuiteResults, SuiteRunner};
pub use wait::{poll_until, wait_for, WaitOptions};

/// Whether real browser support was compiled in
pub const BROWSER_SUPPORT: bool = cfg!(feature = "browser");

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::ChromiumDriver;
    pub use super::{
        catalog, BrowserConfig, CaseStatus, FormProbe, MockDriver, ProbeConfig, ProbeDriver,
        ProbeError, ProbeResult, RenderedResult, Session, SideValue, SuiteResults, SuiteRunner,
        TestCase,
    };
}
