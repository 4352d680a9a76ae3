//! Scripted form page for testing the probe without a browser.
//!
//! [`MockDriver`] models a page with three inputs, a submit button and a
//! result block. What the page renders for a given set of inputs is decided
//! by a caller-supplied responder; how the page misbehaves (ignored clicks,
//! slow rendering, a result that never becomes visible, an unreachable URL)
//! is configured with builder methods. Every driver call is recorded in a
//! call history for verification.

use crate::driver::{ElementHandle, Key, ProbeDriver};
use crate::locator::{FormField, FormLocators, Selector};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// What the page renders into the result block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResult {
    /// Text content
    pub text: String,
    /// Raw `class` attribute
    pub class: String,
}

impl RenderedResult {
    /// A result styled as a valid classification
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: "info logg".to_string(),
        }
    }

    /// A result styled as a validation error
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: "info error".to_string(),
        }
    }

    /// A result with an arbitrary class attribute
    #[must_use]
    pub fn with_class(text: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: class.into(),
        }
    }
}

/// Maps the three input values to the rendered result
pub type Responder = Arc<dyn Fn(&[String; 3]) -> RenderedResult + Send + Sync>;

#[derive(Debug, Clone)]
struct PendingResult {
    rendered: RenderedResult,
    appear_at: Instant,
    text_at: Instant,
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    loaded: bool,
    inputs: [String; 3],
    clicks: u32,
    result: Option<PendingResult>,
    history: Vec<String>,
    closed: bool,
}

/// Mock driver simulating a three-input form page
pub struct MockDriver {
    locators: FormLocators,
    responder: Responder,
    ignored_clicks: u32,
    render_delay: Duration,
    text_delay: Duration,
    hidden_result: bool,
    reachable: bool,
    has_form: bool,
    click_error: Option<String>,
    state: Mutex<PageState>,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver")
            .field("ignored_clicks", &self.ignored_clicks)
            .field("render_delay", &self.render_delay)
            .field("text_delay", &self.text_delay)
            .field("hidden_result", &self.hidden_result)
            .field("reachable", &self.reachable)
            .field("has_form", &self.has_form)
            .field("click_error", &self.click_error)
            .finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Create a mock page whose result is computed by `responder`
    #[must_use]
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[String; 3]) -> RenderedResult + Send + Sync + 'static,
    {
        Self {
            locators: FormLocators::TRIANGLE,
            responder: Arc::new(responder),
            ignored_clicks: 0,
            render_delay: Duration::ZERO,
            text_delay: Duration::ZERO,
            hidden_result: false,
            reachable: true,
            has_form: true,
            click_error: None,
            state: Mutex::new(PageState::default()),
        }
    }

    /// Create a mock page that renders the same result for any input
    #[must_use]
    pub fn with_fixed_result(rendered: RenderedResult) -> Self {
        Self::new(move |_| rendered.clone())
    }

    /// Use a different locator map
    #[must_use]
    pub fn with_locators(mut self, locators: FormLocators) -> Self {
        self.locators = locators;
        self
    }

    /// Swallow the first `n` clicks on the submit button
    #[must_use]
    pub const fn with_ignored_clicks(mut self, n: u32) -> Self {
        self.ignored_clicks = n;
        self
    }

    /// Delay between a registered click and the result element appearing
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Delay between the result element appearing and its text filling in
    #[must_use]
    pub const fn with_text_delay(mut self, delay: Duration) -> Self {
        self.text_delay = delay;
        self
    }

    /// Render the result element but never make it visible
    #[must_use]
    pub const fn with_hidden_result(mut self) -> Self {
        self.hidden_result = true;
        self
    }

    /// Fail every navigation
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Serve a page without the form
    #[must_use]
    pub const fn without_form(mut self) -> Self {
        self.has_form = false;
        self
    }

    /// Fail every click on the submit button with a driver error
    #[must_use]
    pub fn with_click_error(mut self, message: impl Into<String>) -> Self {
        self.click_error = Some(message.into());
        self
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: String) {
        self.state().history.push(call);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if a method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(method))
    }

    /// Number of calls whose history entry starts with `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    /// Clicks received by the submit button since the last navigation
    #[must_use]
    pub fn clicks(&self) -> u32 {
        self.state().clicks
    }

    /// Current values of the three inputs
    #[must_use]
    pub fn input_values(&self) -> [String; 3] {
        self.state().inputs.clone()
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    fn field_of(&self, selector: &Selector) -> Option<FormField> {
        FormField::ALL
            .into_iter()
            .find(|field| self.locators.get(*field) == selector)
    }

    fn input_index(&self, element: &ElementHandle) -> ProbeResult<usize> {
        match self.field_of(&element.selector) {
            Some(FormField::InputA) => Ok(0),
            Some(FormField::InputB) => Ok(1),
            Some(FormField::InputC) => Ok(2),
            _ => Err(ProbeError::driver(format!("{element} is not an input"))),
        }
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.state().closed {
            return Err(ProbeError::driver("browser is closed"));
        }
        Ok(())
    }

    fn visible_result(&self) -> Option<PendingResult> {
        let state = self.state();
        state
            .result
            .as_ref()
            .filter(|r| Instant::now() >= r.appear_at)
            .cloned()
    }
}

#[async_trait]
impl ProbeDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        self.record(format!("navigate:{url}"));
        if !self.reachable {
            return Err(ProbeError::NavigationError {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        let mut state = self.state();
        state.url = url.to_string();
        state.loaded = true;
        state.inputs = Default::default();
        state.clicks = 0;
        state.result = None;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state().url.clone())
    }

    async fn find(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
        self.ensure_open()?;
        if !self.state().loaded {
            return Ok(None);
        }
        let found = match self.field_of(selector) {
            Some(FormField::ResultBlock) => self
                .visible_result()
                .map(|_| ElementHandle::new(selector.clone()).with_tag("div")),
            Some(FormField::SubmitButton) if self.has_form => {
                Some(ElementHandle::new(selector.clone()).with_tag("button"))
            }
            Some(FormField::InputA | FormField::InputB | FormField::InputC) if self.has_form => {
                Some(ElementHandle::new(selector.clone()).with_tag("input"))
            }
            _ => None,
        };
        Ok(found)
    }

    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        let idx = self.input_index(element)?;
        self.record(format!("clear:{}", element.selector));
        self.state().inputs[idx].clear();
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let idx = self.input_index(element)?;
        self.record(format!("type:{}={text}", element.selector));
        self.state().inputs[idx].push_str(text);
        Ok(())
    }

    async fn press_key(&self, element: &ElementHandle, key: Key) -> ProbeResult<()> {
        self.record(format!("key:{}={key}", element.selector));
        Ok(())
    }

    async fn dom_click(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.ensure_open()?;
        self.record(format!("click:{}", element.selector));
        if self.field_of(&element.selector) != Some(FormField::SubmitButton) {
            return Ok(());
        }

        let inputs = {
            let mut state = self.state();
            state.clicks += 1;
            if let Some(message) = &self.click_error {
                return Err(ProbeError::driver(message.clone()));
            }
            if state.clicks <= self.ignored_clicks {
                return Ok(());
            }
            state.inputs.clone()
        };

        let rendered = (self.responder)(&inputs);
        let appear_at = Instant::now() + self.render_delay;
        self.state().result = Some(PendingResult {
            rendered,
            appear_at,
            text_at: appear_at + self.text_delay,
        });
        Ok(())
    }

    async fn is_visible(&self, element: &ElementHandle) -> ProbeResult<bool> {
        match self.field_of(&element.selector) {
            Some(FormField::ResultBlock) => {
                Ok(!self.hidden_result && self.visible_result().is_some())
            }
            Some(_) => Ok(self.has_form),
            None => Ok(false),
        }
    }

    async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        if self.field_of(&element.selector) != Some(FormField::ResultBlock) {
            return Ok(String::new());
        }
        let result = self.visible_result().ok_or_else(|| ProbeError::ElementNotFound {
            selector: element.selector.to_string(),
        })?;
        if Instant::now() >= result.text_at {
            Ok(result.rendered.text)
        } else {
            Ok(String::new())
        }
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        if name != "class" || self.field_of(&element.selector) != Some(FormField::ResultBlock) {
            return Ok(None);
        }
        Ok(self.visible_result().map(|r| r.rendered.class))
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.record("close".to_string());
        self.state().closed = true;
        Ok(())
    }
}
