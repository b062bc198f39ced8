//! Runtime values carried through compilation.
//!
//! A [`Value`] is a condition operand after parsing: every literal a rule may
//! compare against, plus homogeneous lists for set operators. Values are
//! registered as bind parameters verbatim and never appear in SQL text.
//!
//! # Examples
//!
//! ```rust
//! use quern_compiler::Value;
//!
//! let v: Value = 42.into();
//! assert!(matches!(v, Value::Int(42)));
//!
//! let v: Value = "active".into();
//! assert!(matches!(v, Value::String(_)));
//!
//! let v = Value::Null;
//! assert!(v.is_null());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A literal operand value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// String literal.
    String(String),
    /// JSON document (objects reaching JSONB operators).
    Json(JsonValue),
    /// Ordered list of literals.
    List(Vec<Value>),
}

impl Value {
    /// Check if this is the null literal.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Borrow the string content, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list content, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric view unifying integer and float encodings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Build a value from a deserialized JSON node.
    ///
    /// Integral JSON numbers become [`Value::Int`]; everything else numeric
    /// becomes [`Value::Float`]. Objects are kept whole as JSON documents.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(_) => Self::Json(json.clone()),
        }
    }

    /// Convert back to a JSON node (for option checks, predicates, and JSONB
    /// parameter serialization).
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Json(j) => j.clone(),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
