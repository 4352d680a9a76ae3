//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`ChromiumDriver`] launches a local Chromium
//! through chromiumoxide and implements [`ProbeDriver`] on a single page.
//! Element lookups, DOM clicks and reads go through script evaluation;
//! typing and key presses go through native input events so the page sees
//! real keystrokes.

#[cfg(feature = "browser")]
use crate::driver::{ElementHandle, Key, ProbeDriver};
#[cfg(feature = "browser")]
use crate::locator::Selector;
#[cfg(feature = "browser")]
use crate::result::{ProbeError, ProbeResult};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Page scripts
// ============================================================================

/// Wrap a body operating on `el` so the script always yields an object.
///
/// `null` results cannot be deserialized from a CDP evaluation, so every
/// script reports `{ found, value }` instead.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn element_script(selector_query: &str, body: &str) -> String {
    format!(
        "(() => {{ const el = {selector_query}; \
         if (!el) {{ return {{ found: false, value: null }}; }} \
         return {{ found: true, value: (() => {{ {body} }})() }}; }})()"
    )
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const TAG_NAME_BODY: &str = "return el.tagName.toLowerCase();";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const CLEAR_BODY: &str = "el.focus(); el.value = ''; \
    el.dispatchEvent(new Event('input', { bubbles: true })); \
    el.dispatchEvent(new Event('change', { bubbles: true })); return true;";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const CLICK_BODY: &str = "el.click(); return true;";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const VISIBLE_BODY: &str = "const style = window.getComputedStyle(el); \
    return style.display !== 'none' && style.visibility !== 'hidden' \
    && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
const TEXT_BODY: &str = "return el.innerText ?? el.textContent ?? '';";

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn attribute_body(name: &str) -> String {
    format!("return el.getAttribute({name:?});")
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::*;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Debug, Deserialize)]
    struct Lookup<T> {
        found: bool,
        value: Option<T>,
    }

    /// [`ProbeDriver`] backed by a real Chromium over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        page: CdpPage,
        handle: tokio::task::JoinHandle<()>,
        closed: bool,
    }

    impl ChromiumDriver {
        /// Launch a new browser and open a blank page
        ///
        /// # Errors
        ///
        /// Returns [`ProbeError::BrowserLaunchError`] if Chromium cannot be
        /// started or the first page cannot be created.
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(|e| {
                ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            tracing::info!(
                headless = config.headless,
                sandbox = config.sandbox,
                chromium = config.chromium_path.as_deref().unwrap_or("auto"),
                "browser launched"
            );

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                page,
                handle,
                closed: false,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        async fn eval<T: DeserializeOwned>(&self, script: String) -> ProbeResult<T> {
            self.page
                .evaluate_expression(script)
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?
                .into_value()
                .map_err(|e| ProbeError::driver(e.to_string()))
        }

        async fn eval_on<T: DeserializeOwned>(
            &self,
            selector: &Selector,
            body: &str,
        ) -> ProbeResult<Option<T>> {
            let lookup: Lookup<T> = self
                .eval(element_script(&selector.to_query(), body))
                .await?;
            Ok(lookup.found.then_some(lookup.value).flatten())
        }

        async fn eval_required<T: DeserializeOwned>(
            &self,
            element: &ElementHandle,
            body: &str,
        ) -> ProbeResult<T> {
            let lookup: Lookup<T> = self
                .eval(element_script(&element.selector.to_query(), body))
                .await?;
            if !lookup.found {
                return Err(ProbeError::ElementNotFound {
                    selector: element.selector.to_string(),
                });
            }
            lookup
                .value
                .ok_or_else(|| ProbeError::driver(format!("script on {element} returned null")))
        }

        /// Resolve a handle to a chromiumoxide element for native input
        async fn native(&self, element: &ElementHandle) -> ProbeResult<Element> {
            let not_found = |_| ProbeError::ElementNotFound {
                selector: element.selector.to_string(),
            };
            match &element.selector {
                Selector::Css(css) => self.page.find_element(css.as_ref()).await.map_err(not_found),
                other => match other.to_xpath() {
                    Some(xpath) => self.page.find_xpath(xpath).await.map_err(not_found),
                    None => Err(ProbeError::driver(format!(
                        "native input is not supported for {other}"
                    ))),
                },
            }
        }
    }

    #[async_trait::async_trait]
    impl ProbeDriver for ChromiumDriver {
        async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| ProbeError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            tracing::debug!(url, "navigated");
            Ok(())
        }

        async fn current_url(&self) -> ProbeResult<String> {
            let url = self
                .page
                .url()
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            Ok(url.unwrap_or_default())
        }

        async fn find(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
            let tag: Option<String> = self.eval_on(selector, TAG_NAME_BODY).await?;
            Ok(tag.map(|t| ElementHandle::new(selector.clone()).with_tag(t)))
        }

        async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
            self.eval_required::<bool>(element, CLEAR_BODY).await?;
            Ok(())
        }

        async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
            let native = self.native(element).await?;
            native
                .focus()
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            native
                .type_str(text)
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            Ok(())
        }

        async fn press_key(&self, element: &ElementHandle, key: Key) -> ProbeResult<()> {
            let native = self.native(element).await?;
            native
                .press_key(key.as_str())
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            Ok(())
        }

        async fn dom_click(&self, element: &ElementHandle) -> ProbeResult<()> {
            self.eval_required::<bool>(element, CLICK_BODY).await?;
            Ok(())
        }

        async fn is_visible(&self, element: &ElementHandle) -> ProbeResult<bool> {
            Ok(self
                .eval_on::<bool>(&element.selector, VISIBLE_BODY)
                .await?
                .unwrap_or(false))
        }

        async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
            self.eval_required(element, TEXT_BODY).await
        }

        async fn attribute(
            &self,
            element: &ElementHandle,
            name: &str,
        ) -> ProbeResult<Option<String>> {
            let lookup: Lookup<String> = self
                .eval(element_script(
                    &element.selector.to_query(),
                    &attribute_body(name),
                ))
                .await?;
            if lookup.found {
                Ok(lookup.value)
            } else {
                Err(ProbeError::ElementNotFound {
                    selector: element.selector.to_string(),
                })
            }
        }

        async fn close(&mut self) -> ProbeResult<()> {
            if self.closed {
                return Ok(());
            }
            self.closed = true;
            let mut browser = self.inner.lock().await;
            let result = browser.close().await;
            if let Err(e) = browser.wait().await {
                tracing::warn!(error = %e, "browser process did not exit cleanly");
            }
            self.handle.abort();
            result.map_err(|e| ProbeError::driver(e.to_string()))?;
            tracing::info!("browser closed");
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
