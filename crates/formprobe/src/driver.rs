//! ProbeDriver - abstract browser automation trait
//!
//! The probe only needs a handful of primitives from a browser: navigate,
//! locate, type, press a key, click through the DOM, and read text and
//! attributes back. Keeping them behind a trait lets the same probe run
//! against Chromium over CDP ([`crate::ChromiumDriver`], `browser` feature)
//! or against the scripted [`crate::MockDriver`] in tests.

use crate::locator::Selector;
use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an element located on the current page.
///
/// Handles are cheap descriptors, not live references: drivers re-resolve
/// the selector on every call, so a handle survives re-renders of the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    /// Selector the element was found with
    pub selector: Selector,
    /// Lower-case tag name, when the driver knows it
    pub tag_name: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub const fn new(selector: Selector) -> Self {
        Self {
            selector,
            tag_name: None,
        }
    }

    /// Attach the tag name
    #[must_use]
    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag_name {
            Some(tag) => write!(f, "<{tag}> {}", self.selector),
            None => write!(f, "{}", self.selector),
        }
    }
}

/// Non-printing keys the probe sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Move focus to the next control
    Tab,
    /// Submit / confirm
    Enter,
}

impl Key {
    /// DOM `KeyboardEvent.key` value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tab => "Tab",
            Self::Enter => "Enter",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract driver trait for browser automation
///
/// # Implementations
///
/// - `ChromiumDriver` - CDP via the chromiumoxide crate (`browser` feature)
/// - `MockDriver` - scripted form page for unit testing
#[async_trait]
pub trait ProbeDriver: Send + Sync {
    /// Navigate to URL and wait for the load to finish
    async fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Locate the first element matching `selector`, if any
    async fn find(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>>;

    /// Clear the value of an input element
    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type text into an element as key presses
    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Press a non-printing key with the element focused
    async fn press_key(&self, element: &ElementHandle, key: Key) -> ProbeResult<()>;

    /// Invoke `element.click()` in page context, bypassing pointer events
    async fn dom_click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Whether the element is rendered and visible
    async fn is_visible(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Rendered text of the element
    async fn text(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Attribute value, `None` if the attribute is absent
    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>>;

    /// Close the browser
    async fn close(&mut self) -> ProbeResult<()>;
}
