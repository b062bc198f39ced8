//! Operator canonicalization and classification.
//!
//! JSON Logic rules name operators with surface tokens (`==`, `>`, `!in`, …)
//! or with the internal snake_case names verbatim. Canonicalization maps both
//! onto [`Operator`]; classification groups operators by emission strategy,
//! taking the field's type into account for the overloaded ones.

use quern_schema::{FieldType, Operator};

use crate::error::{CompileError, CompileResult};

/// Emission strategy groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    /// `=`, `<>`, `<`, `>`, `<=`, `>=` against one placeholder.
    Comparison,
    /// `IS NULL` / `IS NOT NULL`, no parameter.
    Unary,
    /// `BETWEEN`, two parameters.
    Range,
    /// `IN` / `NOT IN` lists on scalar fields.
    Set,
    /// LIKE-family and regex matching.
    StringOp,
    /// Multi-valued column operators (native array or jsonb).
    Array,
    /// JSONB document operators.
    Json,
}

/// Map a surface token onto the internal operator set.
///
/// Internal names are accepted verbatim; unknown tokens fail with
/// [`CompileError::UnknownOperator`].
pub fn canonicalize(token: &str) -> CompileResult<Operator> {
    let op = match token {
        "==" | "===" => Some(Operator::Eq),
        "!=" | "!==" => Some(Operator::Ne),
        ">" => Some(Operator::Gt),
        ">=" => Some(Operator::Gte),
        "<" => Some(Operator::Lt),
        "<=" => Some(Operator::Lte),
        "!in" => Some(Operator::NotIn),
        other => Operator::from_name(other),
    };
    op.ok_or_else(|| CompileError::UnknownOperator {
        token: token.to_string(),
    })
}

/// Classify an operator for dispatch, given the active field type.
///
/// `contains` carries array/jsonb semantics on multi-valued fields and
/// substring semantics otherwise; `in`/`not_in` on multi-valued fields are
/// reinterpreted as intersection tests and dispatch to the array emitters.
pub fn classify(op: Operator, field_type: FieldType) -> OperatorClass {
    match op {
        Operator::Eq | Operator::Ne | Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            OperatorClass::Comparison
        }
        Operator::IsNull | Operator::IsNotNull => OperatorClass::Unary,
        Operator::Between | Operator::NotBetween => OperatorClass::Range,
        Operator::In | Operator::NotIn => {
            if field_type.is_multi_valued() {
                OperatorClass::Array
            } else {
                OperatorClass::Set
            }
        }
        Operator::Contains => {
            if field_type.is_multi_valued() {
                OperatorClass::Array
            } else {
                OperatorClass::StringOp
            }
        }
        Operator::ContainedBy
        | Operator::Overlaps
        | Operator::AnyOf
        | Operator::NotAnyOf
        | Operator::AnyIlike
        | Operator::NotAnyIlike => OperatorClass::Array,
        Operator::Like
        | Operator::Ilike
        | Operator::StartsWith
        | Operator::EndsWith
        | Operator::Regex => OperatorClass::StringOp,
        Operator::JsonContains | Operator::JsonHasKey | Operator::JsonHasAnyKeys => {
            OperatorClass::Json
        }
    }
}

/// Check whether an operator requires its operand to be a list.
pub fn requires_list(op: Operator) -> bool {
    matches!(
        op,
        Operator::In
            | Operator::NotIn
            | Operator::Overlaps
            | Operator::ContainedBy
            | Operator::JsonHasAnyKeys
    )
}
