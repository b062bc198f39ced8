//! Per-field value transforms.
//!
//! Transforms are declared on a field and rendered by the compiler in two
//! forms: wrapped around the column expression in SQL, and (for the text
//! built-ins) applied to the parameter value itself so both sides of a
//! comparison normalize identically.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Placeholder substituted with the current column expression in custom
/// transform templates.
pub const TEMPLATE_PLACEHOLDER: &str = "{column}";

/// A single transform step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Lowercase.
    Lower,
    /// Uppercase.
    Upper,
    /// Trim both ends.
    Trim,
    /// Trim the left end.
    Ltrim,
    /// Trim the right end.
    Rtrim,
    /// Strip accents (PostgreSQL only).
    Unaccent,
    /// Truncate to the date part.
    Date,
    /// Extract the year.
    Year,
    /// Extract the month.
    Month,
    /// Extract the day of month.
    Day,
    /// A raw SQL template containing [`TEMPLATE_PLACEHOLDER`].
    Custom(String),
}

impl Transform {
    /// Parse a transform from its declaration string.
    ///
    /// Unknown names are treated as custom templates; the template must
    /// contain the column placeholder, which schema construction enforces.
    pub fn parse(s: &str) -> Self {
        match s {
            "lower" => Self::Lower,
            "upper" => Self::Upper,
            "trim" => Self::Trim,
            "ltrim" => Self::Ltrim,
            "rtrim" => Self::Rtrim,
            "unaccent" => Self::Unaccent,
            "date" => Self::Date,
            "year" => Self::Year,
            "month" => Self::Month,
            "day" => Self::Day,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Get the declaration string for this transform.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Trim => "trim",
            Self::Ltrim => "ltrim",
            Self::Rtrim => "rtrim",
            Self::Unaccent => "unaccent",
            Self::Date => "date",
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Custom(t) => t,
        }
    }

    /// Check if this is a text built-in that also applies to parameter values.
    pub fn applies_to_values(&self) -> bool {
        matches!(
            self,
            Self::Lower | Self::Upper | Self::Trim | Self::Ltrim | Self::Rtrim
        )
    }

    /// Check if this is a custom template.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Transform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Transform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(D::Error::custom("transform must not be empty"));
        }
        Ok(Transform::parse(&s))
    }
}

/// Ordered transform lists for a field.
///
/// `input` transforms apply while filtering (wrapping the column and, for the
/// text built-ins, the comparison value); `output` transforms apply when the
/// field is projected by the select helper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    /// Transforms applied on the filter path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<Transform>,
    /// Transforms applied on the projection path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<Transform>,
}

impl TransformSpec {
    /// Check that every custom template carries the column placeholder.
    pub fn validate(&self) -> Result<(), &str> {
        for t in self.input.iter().chain(self.output.iter()) {
            if let Transform::Custom(template) = t {
                if !template.contains(TEMPLATE_PLACEHOLDER) {
                    return Err(template);
                }
            }
        }
        Ok(())
    }

    /// Check if no transforms are declared.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.output.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtins() {
        assert_eq!(Transform::parse("lower"), Transform::Lower);
        assert_eq!(Transform::parse("unaccent"), Transform::Unaccent);
        assert_eq!(Transform::parse("day"), Transform::Day);
    }

    #[test]
    fn test_parse_custom() {
        let t = Transform::parse("COALESCE({column}, '')");
        assert!(t.is_custom());
        assert_eq!(t.as_str(), "COALESCE({column}, '')");
    }

    #[test]
    fn test_value_applicability() {
        assert!(Transform::Lower.applies_to_values());
        assert!(Transform::Rtrim.applies_to_values());
        assert!(!Transform::Date.applies_to_values());
        assert!(!Transform::Custom("x({column})".into()).applies_to_values());
    }

    #[test]
    fn test_spec_validation() {
        let good = TransformSpec {
            input: vec![Transform::Lower, Transform::Custom("f({column})".into())],
            output: vec![],
        };
        assert!(good.validate().is_ok());

        let bad = TransformSpec {
            input: vec![Transform::Custom("no placeholder".into())],
            output: vec![],
        };
        assert_eq!(bad.validate(), Err("no placeholder"));
    }

    #[test]
    fn test_serde() {
        let spec: TransformSpec =
            serde_json::from_str(r#"{"input": ["lower", "trim"], "output": ["upper"]}"#).unwrap();
        assert_eq!(spec.input, vec![Transform::Lower, Transform::Trim]);
        assert_eq!(spec.output, vec![Transform::Upper]);
    }
}
