//! Logical field types and shared type declarations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical type of a schema field.
///
/// The logical type drives value validation and, for JSON-path backed fields,
/// the cast applied by the active dialect on emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Short string (maps to VARCHAR).
    String,
    /// Long-form text.
    Text,
    /// Arbitrary numeric value.
    Number,
    /// Integral numeric value.
    Integer,
    /// Exact decimal value.
    Decimal,
    /// Boolean value.
    Boolean,
    /// Calendar date.
    Date,
    /// Date with time-of-day.
    Datetime,
    /// Point-in-time timestamp.
    Timestamp,
    /// UUID in the canonical 8-4-4-4-12 form.
    Uuid,
    /// Multi-valued column (PostgreSQL native array).
    Array,
    /// JSON document.
    Json,
    /// Binary JSON document (PostgreSQL JSONB).
    Jsonb,
}

impl FieldType {
    /// Parse a field type from its lowercase name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "decimal" => Some(Self::Decimal),
            "boolean" | "bool" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "datetime" => Some(Self::Datetime),
            "timestamp" => Some(Self::Timestamp),
            "uuid" => Some(Self::Uuid),
            "array" => Some(Self::Array),
            "json" => Some(Self::Json),
            "jsonb" => Some(Self::Jsonb),
            _ => None,
        }
    }

    /// Get the lowercase name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
            Self::Array => "array",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
        }
    }

    /// Check if this is a textual type.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Text)
    }

    /// Check if this is a numeric type.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Integer | Self::Decimal)
    }

    /// Check if this is a temporal type.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Datetime | Self::Timestamp)
    }

    /// Check if this type holds multiple values or a document.
    ///
    /// Multi-valued fields reinterpret set operators as intersection tests
    /// and route `contains` to the array emitters.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Array | Self::Json | Self::Jsonb)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
