//! The internal condition operator set.
//!
//! Schemas allowlist operators per field; the compiler canonicalizes JSON
//! Logic surface tokens onto this enum and classifies them for dispatch.
//! Logical connectives (`and`, `or`, `not`) are not condition operators;
//! they are structural nodes of the rule tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A condition operator applied to a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,

    /// Value in a candidate list.
    In,
    /// Value not in a candidate list.
    NotIn,
    /// Value within an inclusive range.
    Between,
    /// Value outside an inclusive range.
    NotBetween,

    /// Substring match on strings; containment on array/jsonb columns.
    Contains,
    /// Array/jsonb column contained by the operand.
    ContainedBy,
    /// Array/jsonb column intersects the operand list.
    Overlaps,
    /// Operand equals any element of the column.
    AnyOf,
    /// Operand equals no element of the column.
    NotAnyOf,
    /// Operand case-insensitively matches some element of the column.
    AnyIlike,
    /// Operand case-insensitively matches no element of the column.
    NotAnyIlike,

    /// SQL LIKE with a caller-provided pattern.
    Like,
    /// Case-insensitive LIKE with a caller-provided pattern.
    Ilike,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Regular-expression match.
    Regex,

    /// Column is NULL.
    IsNull,
    /// Column is not NULL.
    IsNotNull,

    /// JSONB document contains the operand document.
    JsonContains,
    /// JSONB document has the operand as a top-level key.
    JsonHasKey,
    /// JSONB document has any of the operand keys.
    JsonHasAnyKeys,
}

impl Operator {
    /// Get the canonical snake_case name of this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Between => "between",
            Self::NotBetween => "not_between",
            Self::Contains => "contains",
            Self::ContainedBy => "contained_by",
            Self::Overlaps => "overlaps",
            Self::AnyOf => "any_of",
            Self::NotAnyOf => "not_any_of",
            Self::AnyIlike => "any_ilike",
            Self::NotAnyIlike => "not_any_ilike",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Regex => "regex",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::JsonContains => "json_contains",
            Self::JsonHasKey => "json_has_key",
            Self::JsonHasAnyKeys => "json_has_any_keys",
        }
    }

    /// Parse an operator from its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            "not_in" => Some(Self::NotIn),
            "between" => Some(Self::Between),
            "not_between" => Some(Self::NotBetween),
            "contains" => Some(Self::Contains),
            "contained_by" => Some(Self::ContainedBy),
            "overlaps" => Some(Self::Overlaps),
            "any_of" => Some(Self::AnyOf),
            "not_any_of" => Some(Self::NotAnyOf),
            "any_ilike" => Some(Self::AnyIlike),
            "not_any_ilike" => Some(Self::NotAnyIlike),
            "like" => Some(Self::Like),
            "ilike" => Some(Self::Ilike),
            "starts_with" => Some(Self::StartsWith),
            "ends_with" => Some(Self::EndsWith),
            "regex" => Some(Self::Regex),
            "is_null" => Some(Self::IsNull),
            "is_not_null" => Some(Self::IsNotNull),
            "json_contains" => Some(Self::JsonContains),
            "json_has_key" => Some(Self::JsonHasKey),
            "json_has_any_keys" => Some(Self::JsonHasAnyKeys),
            _ => None,
        }
    }

    /// Check if this operator takes no value operand.
    pub fn is_unary(&self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Check if this operator takes two value operands.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }

    /// Check if this operator's operand is a list validated element-wise.
    pub fn takes_list(&self) -> bool {
        matches!(
            self,
            Self::In | Self::NotIn | Self::Overlaps | Self::ContainedBy | Self::JsonHasAnyKeys
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full comparison set, for schema declarations that allow them all.
pub const COMPARISON_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Gte,
    Operator::Lt,
    Operator::Lte,
];
