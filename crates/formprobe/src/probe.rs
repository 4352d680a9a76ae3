//! FormProbe: navigation, input, submit-retry and result extraction against
//! a remote form whose rendering timing is not guaranteed.
//!
//! ```text
//! NotStarted ─open─► Navigated ─fill_sides─► Filled ─► Submitted(1..n) ─► ResultVisible
//!      │                                                    │                  │
//!      ▼                                                    ▼            read_result
//! NavigationFailed                                   SubmissionFailed          │
//!                                                                     Asserted / AssertionFailed
//! ```
//!
//! `open` may be called from any state and always starts over.

use crate::case::SideValue;
use crate::config::ProbeConfig;
use crate::driver::{ElementHandle, Key, ProbeDriver};
use crate::locator::Selector;
use crate::observation::ResultObservation;
use crate::result::{ProbeError, ProbeResult};
use crate::retry::Retry;
use crate::wait::{poll_until, wait_for};
use std::fmt;

/// Lifecycle of one case against the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeState {
    /// Nothing done yet
    NotStarted,
    /// Page loaded
    Navigated,
    /// Inputs typed, submit button located
    Filled,
    /// Submit clicked, result pending
    Submitted {
        /// 1-based click attempt
        attempt: u32,
    },
    /// Result element present and visible
    ResultVisible,
    /// Observation matched the expectation
    Asserted,
    /// Page could not be loaded
    NavigationFailed,
    /// Result never appeared
    SubmissionFailed,
    /// Observation did not match
    AssertionFailed,
}

impl ProbeState {
    /// Whether no further operation (other than `open`) is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Asserted | Self::NavigationFailed | Self::SubmissionFailed | Self::AssertionFailed
        )
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted { attempt } => write!(f, "Submitted({attempt})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Probe bound to a driver session for the duration of one case
#[derive(Debug)]
pub struct FormProbe<'a, D: ProbeDriver> {
    driver: &'a mut D,
    config: &'a ProbeConfig,
    state: ProbeState,
}

impl<'a, D: ProbeDriver> FormProbe<'a, D> {
    /// Bind a probe to a driver session
    pub fn new(driver: &'a mut D, config: &'a ProbeConfig) -> Self {
        Self {
            driver,
            config,
            state: ProbeState::NotStarted,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> ProbeState {
        self.state
    }

    /// Navigate to the configured page, resetting its state.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::NavigationError`] if the page is unreachable.
    pub async fn open(&mut self) -> ProbeResult<()> {
        tracing::debug!(url = %self.config.url, "opening page");
        match self.driver.navigate(&self.config.url).await {
            Ok(()) => {
                self.state = ProbeState::Navigated;
                Ok(())
            }
            Err(e) => {
                self.state = ProbeState::NavigationFailed;
                Err(match e {
                    ProbeError::NavigationError { .. } => e,
                    other => ProbeError::NavigationError {
                        url: self.config.url.clone(),
                        message: other.to_string(),
                    },
                })
            }
        }
    }

    /// Type the three sides and submit, retrying the click until the result
    /// block appears.
    ///
    /// Values are not validated; whatever the page makes of them is the
    /// page's business.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidState`] unless the page was just opened,
    /// [`ProbeError::ElementNotFound`] if a form control is missing, and
    /// [`ProbeError::SubmissionError`] if no attempt produced a result.
    pub async fn fill_sides(
        &mut self,
        a: impl Into<SideValue>,
        b: impl Into<SideValue>,
        c: impl Into<SideValue>,
    ) -> ProbeResult<()> {
        self.expect_state(ProbeState::Navigated, "fill_sides")?;
        let values = [a.into(), b.into(), c.into()];
        let config = self.config;
        let locators = &config.locators;

        for (i, (selector, value)) in locators.inputs().into_iter().zip(&values).enumerate() {
            let input = self.require(selector).await?;
            let text = value.as_input();
            self.driver.clear(&input).await?;
            if !text.is_empty() {
                self.driver.type_text(&input, &text).await?;
            }
            if i == 2 {
                self.driver.press_key(&input, Key::Tab).await?;
            }
            tracing::debug!(selector = %selector, value = %text, "filled side");
        }

        let button = self.require(&locators.submit_button).await?;
        self.state = ProbeState::Filled;
        self.submit(&button).await
    }

    async fn submit(&mut self, button: &ElementHandle) -> ProbeResult<()> {
        let driver: &D = self.driver;
        let config = self.config;
        let result_selector = &config.locators.result_block;
        let policy = config.submit_policy();
        let state = &mut self.state;

        let outcome = Retry::new(policy)
            .with_description("submit")
            .run(|attempt| {
                *state = ProbeState::Submitted { attempt };
                async move {
                    tracing::debug!(attempt, "clicking submit");
                    driver.dom_click(button).await?;
                    let result = poll_until(config.appear_wait(), "result block", || {
                        driver.find(result_selector)
                    })
                    .await?;
                    wait_for(config.visible_wait(), "result block visible", || {
                        driver.is_visible(&result)
                    })
                    .await?;
                    Ok::<_, ProbeError>(attempt)
                }
            })
            .await;

        match outcome {
            Ok(done) => {
                tracing::debug!(attempt = done.value, elapsed_ms = done.duration.as_millis() as u64, "result visible");
                self.state = ProbeState::ResultVisible;
                Ok(())
            }
            Err(exhausted) => {
                tracing::warn!(attempts = exhausted.attempts, last = %exhausted.last, "result never appeared");
                self.state = ProbeState::SubmissionFailed;
                Err(ProbeError::SubmissionError {
                    attempts: exhausted.attempts,
                    last: exhausted.last.to_string(),
                })
            }
        }
    }

    /// Read the result block and assert it against `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidState`] unless a result is visible,
    /// [`ProbeError::Timeout`] if the text stays empty, and
    /// [`ProbeError::AssertionError`] on a text or class mismatch.
    pub async fn read_result(&mut self, expected: &str) -> ProbeResult<ResultObservation> {
        self.expect_state(ProbeState::ResultVisible, "read_result")?;
        let observation = match self.observe().await {
            Ok(obs) => obs,
            Err(e) => {
                self.state = ProbeState::AssertionFailed;
                return Err(e);
            }
        };
        tracing::debug!(text = %observation.text, classes = ?observation.css_classes, "observed result");

        match observation.verify(expected) {
            Ok(_) => {
                self.state = ProbeState::Asserted;
                Ok(observation)
            }
            Err(e) => {
                self.state = ProbeState::AssertionFailed;
                Err(e)
            }
        }
    }

    async fn observe(&self) -> ProbeResult<ResultObservation> {
        let driver: &D = self.driver;
        let result = self.require(&self.config.locators.result_block).await?;

        let text = poll_until(self.config.text_wait(), "result text", || {
            let result = &result;
            async move {
                let text = driver.text(result).await?;
                Ok::<_, ProbeError>((!text.is_empty()).then_some(text))
            }
        })
        .await?;
        let class = driver.attribute(&result, "class").await?.unwrap_or_default();
        Ok(ResultObservation::new(text, &class))
    }

    async fn require(&self, selector: &Selector) -> ProbeResult<ElementHandle> {
        self.driver
            .find(selector)
            .await?
            .ok_or_else(|| ProbeError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    fn expect_state(&self, expected: ProbeState, op: &str) -> ProbeResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ProbeError::invalid_state(format!(
                "{op} requires state {expected}, probe is in {}",
                self.state
            )))
        }
    }
}
