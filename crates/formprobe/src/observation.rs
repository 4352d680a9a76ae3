//! Result observations and the error/success classification.
//!
//! The page signals an invalid input with an `error` class on the result
//! block and a valid classification with `logg`. Which of the two a case
//! expects is inferred from the expected text alone: if it contains one of
//! the known error phrases, the case is error-expected. A change in the
//! page's wording therefore silently flips the classification.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Class marking a result the page treated as invalid input
pub const ERROR_CLASS: &str = "error";

/// Class marking a valid classification
pub const SUCCESS_CLASS: &str = "logg";

/// Result phrases rendered by the triangle page
pub mod phrases {
    /// Right triangle
    pub const RIGHT: &str = "Это прямоугольный треугольник";
    /// Obtuse triangle
    pub const OBTUSE: &str = "Это тупоугольный треугольник";
    /// Acute triangle
    pub const ACUTE: &str = "Это остроугольный треугольник";
    /// Equilateral triangle
    pub const EQUILATERAL: &str = "Это равносторонний треугольник";
    /// Isosceles triangle
    pub const ISOSCELES: &str = "Это равнобедренный треугольник";

    /// Input is not a triangle
    pub const NOT_A_TRIANGLE: &str = "Это НЕ треугольник";
    /// Triangle inequality violated
    pub const SIDE_EXCEEDS_SUM: &str = "Одна сторона больше суммы двух других или равна ей";
    /// At least one side missing
    pub const SPECIFY_ALL_SIDES: &str = "Задайте все стороны";
    /// Numbers out of range
    pub const NUMBERS_TOO_LARGE: &str = "Числа слишком большие";
    /// SQL injection detected
    pub const SQL_INJECTION: &str = "SQL-инъекции это плохо!";
    /// XSS payload detected
    pub const XSS: &str = "XSS это плохо!";

    /// Fragments that mark an expected text as an error outcome
    pub const ERROR_MARKERS: [&str; 6] = [
        "НЕ треугольник",
        "Одна сторона больше",
        "Задайте все стороны",
        "Числа слишком большие",
        "SQL-инъекции это плохо",
        "XSS это плохо",
    ];
}

/// Which class marker an observation must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Page should flag the input as invalid
    Error,
    /// Page should render a valid classification
    Success,
}

impl Outcome {
    /// Classify an expected result text
    #[must_use]
    pub fn expected_for(expected: &str) -> Self {
        if phrases::ERROR_MARKERS.iter().any(|m| expected.contains(m)) {
            Self::Error
        } else {
            Self::Success
        }
    }

    /// Whether this is the error outcome
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Text and classes read from the result block after one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultObservation {
    /// Rendered text
    pub text: String,
    /// Class tokens of the element
    pub css_classes: BTreeSet<String>,
}

impl ResultObservation {
    /// Build an observation from text and a raw `class` attribute
    #[must_use]
    pub fn new(text: impl Into<String>, class_attr: &str) -> Self {
        Self {
            text: text.into(),
            css_classes: class_attr.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Whether the element carries the given class token
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.css_classes.contains(class)
    }

    /// Outcome signalled by the class markers, if exactly one is present
    #[must_use]
    pub fn observed_outcome(&self) -> Option<Outcome> {
        match (self.has_class(ERROR_CLASS), self.has_class(SUCCESS_CLASS)) {
            (true, false) => Some(Outcome::Error),
            (false, true) => Some(Outcome::Success),
            _ => None,
        }
    }

    /// Assert this observation against an expected text fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionError`] when the text does not contain
    /// `expected`, or when the class markers disagree with the outcome
    /// implied by `expected`.
    pub fn verify(&self, expected: &str) -> ProbeResult<Outcome> {
        if !self.text.contains(expected) {
            return Err(ProbeError::assertion(format!(
                "expected result text '{}' to contain '{expected}'",
                self.text
            )));
        }

        let outcome = Outcome::expected_for(expected);
        let classes = self.class_list();
        match outcome {
            Outcome::Error => {
                if !self.has_class(ERROR_CLASS) {
                    return Err(ProbeError::assertion(format!(
                        "expected class '{ERROR_CLASS}' for '{expected}', got [{classes}]"
                    )));
                }
            }
            Outcome::Success => {
                if self.has_class(ERROR_CLASS) {
                    return Err(ProbeError::assertion(format!(
                        "unexpected class '{ERROR_CLASS}' for '{expected}', got [{classes}]"
                    )));
                }
                if !self.has_class(SUCCESS_CLASS) {
                    return Err(ProbeError::assertion(format!(
                        "expected class '{SUCCESS_CLASS}' for '{expected}', got [{classes}]"
                    )));
                }
            }
        }
        Ok(outcome)
    }

    fn class_list(&self) -> String {
        self.css_classes
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
