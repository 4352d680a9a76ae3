//! Selectors and the fixed locator map of the triangle form.
//!
//! A [`Selector`] knows how to turn itself into a JavaScript expression that
//! evaluates to the first matching element (or `null`). Drivers that work by
//! script evaluation use [`Selector::to_query`]; drivers with native lookup
//! match on the variant.

use std::borrow::Cow;
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "input.js_a")
    Css(Cow<'static, str>),
    /// XPath selector
    XPath(Cow<'static, str>),
    /// First element whose own text contains the given string
    Text(Cow<'static, str>),
    /// CSS selector narrowed by text content
    CssWithText {
        /// Base CSS selector
        css: Cow<'static, str>,
        /// Text content to match
        text: Cow<'static, str>,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<Cow<'static, str>>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<Cow<'static, str>>) -> Self {
        Self::XPath(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<Cow<'static, str>>) -> Self {
        Self::Text(text.into())
    }

    /// Convert to a JavaScript expression yielding the element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue")
            }
            Self::Text(t) => {
                format!("Array.from(document.querySelectorAll('*')).find(el => Array.from(el.childNodes).some(n => n.nodeType === 3 && n.textContent.includes({t:?}))) ?? null")
            }
            Self::CssWithText { css, text } => {
                format!("Array.from(document.querySelectorAll({css:?})).find(el => el.textContent.includes({text:?})) ?? null")
            }
        }
    }

    /// Convert to an XPath expression when the selector has one
    #[must_use]
    pub fn to_xpath(&self) -> Option<String> {
        match self {
            Self::XPath(s) => Some(s.to_string()),
            Self::Text(t) => Some(format!("//*[contains(text(), {})]", xpath_literal(t))),
            Self::Css(_) | Self::CssWithText { .. } => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::CssWithText { css, text } => write!(f, "css={css} >> text={text}"),
        }
    }
}

/// Quote a string as an XPath 1.0 literal
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Logical fields of a three-input form with one submit button and one
/// result block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// First side input
    InputA,
    /// Second side input
    InputB,
    /// Third side input
    InputC,
    /// Submit control
    SubmitButton,
    /// Element rendering the outcome
    ResultBlock,
}

impl FormField {
    /// All fields in page order
    pub const ALL: [Self; 5] = [
        Self::InputA,
        Self::InputB,
        Self::InputC,
        Self::SubmitButton,
        Self::ResultBlock,
    ];

    /// Logical field name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InputA => "inputA",
            Self::InputB => "inputB",
            Self::InputC => "inputC",
            Self::SubmitButton => "submitButton",
            Self::ResultBlock => "resultBlock",
        }
    }
}

/// Fixed mapping from logical form field to physical selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLocators {
    /// First side input
    pub input_a: Selector,
    /// Second side input
    pub input_b: Selector,
    /// Third side input
    pub input_c: Selector,
    /// Submit control, found by its visible label
    pub submit_button: Selector,
    /// Result container
    pub result_block: Selector,
}

impl FormLocators {
    /// Locators of the triangle puzzle page
    pub const TRIANGLE: Self = Self {
        input_a: Selector::Css(Cow::Borrowed("input.js_a")),
        input_b: Selector::Css(Cow::Borrowed("input.js_b")),
        input_c: Selector::Css(Cow::Borrowed("input.js_c")),
        submit_button: Selector::XPath(Cow::Borrowed("//button[contains(text(), 'Показать')]")),
        result_block: Selector::Css(Cow::Borrowed(".info")),
    };

    /// Selector for a logical field
    #[must_use]
    pub const fn get(&self, field: FormField) -> &Selector {
        match field {
            FormField::InputA => &self.input_a,
            FormField::InputB => &self.input_b,
            FormField::InputC => &self.input_c,
            FormField::SubmitButton => &self.submit_button,
            FormField::ResultBlock => &self.result_block,
        }
    }

    /// The three side inputs in order
    #[must_use]
    pub const fn inputs(&self) -> [&Selector; 3] {
        [&self.input_a, &self.input_b, &self.input_c]
    }
}

impl Default for FormLocators {
    fn default() -> Self {
        Self::TRIANGLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let sel = Selector::css("input.js_a");
            assert_eq!(sel.to_query(), "document.querySelector(\"input.js_a\")");
        }

        #[test]
        fn test_xpath_query_keeps_cyrillic() {
            let sel = FormLocators::TRIANGLE.submit_button.clone();
            let query = sel.to_query();
            assert!(query.starts_with("document.evaluate("));
            assert!(query.contains("Показать"));
            assert!(query.contains("FIRST_ORDERED_NODE_TYPE"));
        }

        #[test]
        fn test_text_to_xpath() {
            let sel = Selector::text("Показать");
            assert_eq!(
                sel.to_xpath().as_deref(),
                Some("//*[contains(text(), 'Показать')]")
            );
            assert!(Selector::css(".info").to_xpath().is_none());
        }

        #[test]
        fn test_xpath_literal_with_both_quotes() {
            assert_eq!(xpath_literal("it's"), "\"it's\"");
            assert_eq!(
                xpath_literal("a'b\"c"),
                "concat('a', \"'\", 'b\"c')"
            );
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css(".info").to_string(), "css=.info");
            let combined = Selector::CssWithText {
                css: "button".into(),
                text: "Go".into(),
            };
            assert_eq!(combined.to_string(), "css=button >> text=Go");
        }
    }

    mod form_locator_tests {
        use super::*;

        #[test]
        fn test_triangle_locators() {
            let loc = FormLocators::TRIANGLE;
            assert_eq!(loc.input_a, Selector::css("input.js_a"));
            assert_eq!(loc.input_b, Selector::css("input.js_b"));
            assert_eq!(loc.input_c, Selector::css("input.js_c"));
            assert_eq!(loc.result_block, Selector::css(".info"));
            assert!(matches!(loc.submit_button, Selector::XPath(_)));
        }

        #[test]
        fn test_get_by_field() {
            let loc = FormLocators::default();
            for field in FormField::ALL {
                let _ = loc.get(field);
            }
            assert_eq!(loc.get(FormField::ResultBlock), &loc.result_block);
            assert_eq!(FormField::SubmitButton.name(), "submitButton");
        }

        #[test]
        fn test_inputs_order() {
            let loc = FormLocators::TRIANGLE;
            let [a, b, c] = loc.inputs();
            assert_eq!(a, &loc.input_a);
            assert_eq!(b, &loc.input_b);
            assert_eq!(c, &loc.input_c);
        }
    }
}
