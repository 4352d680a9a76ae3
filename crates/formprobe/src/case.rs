//! Declarative test cases and the triangle catalog.

use crate::observation::{phrases, Outcome};
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Value entered into one side field.
///
/// Numbers are typed the way a browser stringifies them
/// (`Number.prototype.toString`): integral values without a fractional part
/// (`3`, `-5`), positional notation for `1e-7 < |n| < 1e21` (`1e20` as
/// `100000000000000000000`), exponent notation outside it (`1e+21`,
/// `1e-7`), and `0`, `Infinity`, `NaN` for the special values.
///
/// Integral numbers serialize as JSON/YAML integers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SideValue {
    /// Numeric side
    Number(f64),
    /// Arbitrary text, including the empty string
    Text(String),
}

impl SideValue {
    /// The empty input
    #[must_use]
    pub const fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Text that will be typed into the field
    #[must_use]
    pub fn as_input(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&js_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for SideValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) if is_safe_integer(*n) => serializer.serialize_i64(*n as i64),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// 2^53 - 1
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn is_safe_integer(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

/// Format `n` like JavaScript's `Number.prototype.toString()`.
fn js_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // Shortest round-trip digits: "1.2345e20" -> digits "12345", exponent 20
    let sci = format!("{:e}", n.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let point = exp + 1;

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let e = point - 1;
        let e_sign = if e < 0 { '-' } else { '+' };
        match digits.split_at(1) {
            (lead, "") => format!("{lead}e{e_sign}{}", e.unsigned_abs()),
            (lead, rest) => format!("{lead}.{rest}e{e_sign}{}", e.unsigned_abs()),
        }
    };

    if n < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

impl From<f64> for SideValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for SideValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for SideValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SideValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A single test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Stable identifier (e.g. "TC-001")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Values for the three side fields
    pub inputs: [SideValue; 3],
    /// Fragment the result text must contain
    pub expected: String,
    /// Reason the case is skipped, if it is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<String>,
}

impl TestCase {
    /// Create a new test case
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        inputs: [SideValue; 3],
        expected: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inputs,
            expected: expected.into(),
            skip: None,
        }
    }

    /// Mark the case as skipped
    #[must_use]
    pub fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    /// Whether the case is skipped
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.skip.is_some()
    }

    /// Outcome implied by the expected text
    #[must_use]
    pub fn expected_outcome(&self) -> Outcome {
        Outcome::expected_for(&self.expected)
    }

    /// "TC-001: name"
    #[must_use]
    pub fn title(&self) -> String {
        format!("{}: {}", self.id, self.name)
    }

    /// Whether `filter` matches the id or the name (case-insensitive)
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.id.to_lowercase().contains(&filter) || self.name.to_lowercase().contains(&filter)
    }
}

fn case<A, B, C>(id: &str, name: &str, a: A, b: B, c: C, expected: &str) -> TestCase
where
    A: Into<SideValue>,
    B: Into<SideValue>,
    C: Into<SideValue>,
{
    TestCase::new(id, name, [a.into(), b.into(), c.into()], expected)
}

/// Cases for the triangle puzzle page.
///
/// TC-016..TC-019 cover inputs the page is known to mishandle and are
/// marked skipped.
#[must_use]
pub fn catalog() -> Vec<TestCase> {
    vec![
        case("TC-001", "Right triangle (3, 4, 5)", 3, 4, 5, phrases::RIGHT),
        case("TC-002", "Obtuse triangle (3, 5, 7)", 3, 5, 7, phrases::OBTUSE),
        case("TC-003", "Acute triangle (6, 7, 8)", 6, 7, 8, phrases::ACUTE),
        case("TC-004", "Equilateral triangle (6, 6, 6)", 6, 6, 6, phrases::EQUILATERAL),
        case("TC-005", "Isosceles triangle (5, 5, 8)", 5, 5, 8, phrases::ISOSCELES),
        case("TC-006", "Letters (A, B, C)", "A", "B", "C", phrases::NOT_A_TRIANGLE),
        case("TC-007", "Impossible triangle (1, 2, 10)", 1, 2, 10, "Одна сторона больше"),
        case("TC-008", "Negative side (-5, 5, 5)", -5, 5, 5, phrases::NOT_A_TRIANGLE),
        case("TC-009", "All fields empty", "", "", "", phrases::SPECIFY_ALL_SIDES),
        case("TC-010", "Only A filled (5, _, _)", 5, "", "", phrases::SPECIFY_ALL_SIDES),
        case("TC-011", "Zero side (0, 5, 5)", 0, 5, 5, phrases::SIDE_EXCEEDS_SUM),
        case(
            "TC-012",
            "Numbers too large (1e+20 x3)",
            1e20,
            1e20,
            1e20,
            phrases::NUMBERS_TOO_LARGE,
        ),
        case(
            "TC-013",
            "SQL injection in B",
            5,
            "SELECT FROM Users",
            5,
            phrases::SQL_INJECTION,
        ),
        case(
            "TC-014",
            "XSS injection in B",
            5,
            "<script>alert(1)</script>",
            5,
            phrases::XSS,
        ),
        case("TC-016", "Period decimal separator (3.5, 4.5, 5.5)", 3.5, 4.5, 5.5, phrases::ACUTE)
            .skipped("page does not parse '.' as a decimal separator"),
        case("TC-017", "Comma decimal separator (3,5 4,5 5,5)", "3,5", "4,5", "5,5", phrases::ACUTE)
            .skipped("page does not parse ',' as a decimal separator"),
        case("TC-018", "Blank C is not validated (5, 5, _)", 5, 5, "", phrases::SPECIFY_ALL_SIDES)
            .skipped("page does not validate an empty third field"),
        case("TC-019", "All zeros (0, 0, 0)", 0, 0, 0, phrases::SIDE_EXCEEDS_SUM)
            .skipped("page reports zeros as an equilateral triangle"),
    ]
}

/// Load cases from a YAML or JSON file (chosen by extension, YAML otherwise).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if two cases
/// share an id.
pub fn load_cases(path: &Path) -> ProbeResult<Vec<TestCase>> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let cases: Vec<TestCase> = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml_ng::from_str(&content)?
    };

    let mut seen = std::collections::HashSet::new();
    for c in &cases {
        if !seen.insert(c.id.as_str()) {
            return Err(ProbeError::CaseFileError {
                message: format!("duplicate case id '{}' in {}", c.id, path.display()),
            });
        }
    }
    tracing::debug!(path = %path.display(), count = cases.len(), "loaded cases");
    Ok(cases)
}
