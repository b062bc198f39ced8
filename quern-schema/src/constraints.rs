//! Per-field constraint and option declarations.
//!
//! Constraints are declared on the schema and enforced by the compiler's
//! validator before any SQL is emitted. Declarations compile their regex
//! pattern and parse their date bounds once at construction.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// A compiled constraint pattern that remembers its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    source: String,
}

impl Pattern {
    /// Compile a pattern from its source text.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Self { regex, source })
    }

    /// Test a candidate string against the pattern.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Get the original pattern text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(source).map_err(D::Error::custom)
    }
}

/// A parsed date bound for `min_date`/`max_date` constraints.
///
/// Accepts `YYYY-MM-DD` (expanded to midnight) or `YYYY-MM-DDTHH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateBound(pub NaiveDateTime);

impl DateBound {
    /// Parse a bound from its declaration string.
    pub fn parse(s: &str) -> Option<Self> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Some(Self(dt));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Some(Self(dt));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }
}

impl Serialize for DateBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DateBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateBound::parse(&s).ok_or_else(|| D::Error::custom(format!("invalid date bound `{}`", s)))
    }
}

/// Outcome of a user-supplied validation predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value is acceptable.
    Pass,
    /// The value is rejected, with a diagnostic message.
    Reject(String),
}

impl Verdict {
    /// Create a rejection with a message.
    pub fn reject(message: impl Into<String>) -> Self {
        Self::Reject(message.into())
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::Reject("value rejected by custom validator".to_string())
        }
    }
}

/// A user-supplied validation predicate.
///
/// The predicate sees the candidate value in JSON form and returns a
/// [`Verdict`]; set/range operands are checked element-wise upstream, so the
/// predicate always receives a scalar.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&JsonValue) -> Verdict + Send + Sync>);

impl Predicate {
    /// Wrap a closure as a predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&JsonValue) -> Verdict + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Run the predicate against a candidate value.
    pub fn check(&self, value: &JsonValue) -> Verdict {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Constraint declarations for a field.
///
/// Which constraints apply depends on the field's logical type; irrelevant
/// declarations are ignored by the validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regex the string must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,

    /// Inclusive numeric minimum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive numeric maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Minimum list length for array values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    /// Maximum list length for array values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    /// Named date format the value must match (see the compiler's format table).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Earliest acceptable date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<DateBound>,
    /// Latest acceptable date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<DateBound>,

    /// User predicate, run after the built-in checks.
    #[serde(skip)]
    pub validate: Option<Predicate>,
}

impl Constraints {
    /// Check if no constraints are declared.
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.min_items.is_none()
            && self.max_items.is_none()
            && self.date_format.is_none()
            && self.min_date.is_none()
            && self.max_date.is_none()
            && self.validate.is_none()
    }

    /// Check for self-contradictory bounds; returns a message on failure.
    pub fn check_coherent(&self) -> Result<(), String> {
        if let (Some(lo), Some(hi)) = (self.min_length, self.max_length) {
            if lo > hi {
                return Err(format!("min_length {} exceeds max_length {}", lo, hi));
            }
        }
        if let (Some(lo), Some(hi)) = (self.min, self.max) {
            if lo > hi {
                return Err(format!("min {} exceeds max {}", lo, hi));
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_items, self.max_items) {
            if lo > hi {
                return Err(format!("min_items {} exceeds max_items {}", lo, hi));
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_date, self.max_date) {
            if lo > hi {
                return Err(format!("min_date {} exceeds max_date {}", lo, hi));
            }
        }
        Ok(())
    }
}

/// An enumerated value set for a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// The allowed values.
    #[serde(default)]
    pub values: Vec<JsonValue>,
    /// When true, values outside the set are rejected.
    #[serde(default)]
    pub strict: bool,
}

impl Options {
    /// Create a strict option set from a list of values.
    pub fn strict(values: impl IntoIterator<Item = JsonValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
            strict: true,
        }
    }

    /// Test membership with numeric tolerance.
    ///
    /// JSON deserializers split numbers into integer and float
    /// representations; `18` must match an option declared as `18.0`.
    pub fn contains(&self, candidate: &JsonValue) -> bool {
        self.values.iter().any(|v| json_value_eq(v, candidate))
    }
}

/// Equality over JSON scalars that unifies integer and float encodings.
pub fn json_value_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => fx == fy,
            _ => x == y,
        },
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pattern_compile_and_match() {
        let p = Pattern::new(r"^[a-z]+$").unwrap();
        assert!(p.is_match("hello"));
        assert!(!p.is_match("Hello"));
        assert_eq!(p.source(), r"^[a-z]+$");
    }

    #[test]
    fn test_pattern_invalid() {
        assert!(Pattern::new("[unclosed").is_err());
    }

    #[test]
    fn test_date_bound_parse() {
        let d = DateBound::parse("2024-01-15").unwrap();
        assert_eq!(d.to_string(), "2024-01-15T00:00:00");
        let dt = DateBound::parse("2024-01-15T10:30:00").unwrap();
        assert!(dt > d);
        assert!(DateBound::parse("15/01/2024").is_none());
    }

    #[test]
    fn test_constraints_coherence() {
        let mut c = Constraints {
            min: Some(10.0),
            max: Some(5.0),
            ..Default::default()
        };
        assert!(c.check_coherent().is_err());
        c.max = Some(20.0);
        assert!(c.check_coherent().is_ok());
    }

    #[test]
    fn test_options_numeric_membership() {
        let opts = Options::strict([json!(18.0), json!("active")]);
        assert!(opts.contains(&json!(18)));
        assert!(opts.contains(&json!("active")));
        assert!(!opts.contains(&json!("inactive")));
    }

    #[test]
    fn test_predicate() {
        let p = Predicate::new(|v| {
            if v.as_str().is_some_and(|s| s.len() > 2) {
                Verdict::Pass
            } else {
                Verdict::reject("too short")
            }
        });
        assert_eq!(p.check(&json!("abc")), Verdict::Pass);
        assert_eq!(p.check(&json!("a")), Verdict::Reject("too short".into()));
    }

    #[test]
    fn test_constraints_serde() {
        let c: Constraints = serde_json::from_str(
            r#"{"min_length": 2, "max_length": 10, "pattern": "^[a-z]+$"}"#,
        )
        .unwrap();
        assert_eq!(c.min_length, Some(2));
        assert!(c.pattern.unwrap().is_match("abc"));
    }
}
