//! Error types for rule compilation.
//!
//! All compilation errors are synchronous and terminal: the first failure
//! aborts the compile and no SQL is returned. Every error carries a
//! human-readable message and, where relevant, the offending field and
//! operator. [`CompileError::kind`] gives the coarse category callers route
//! on.

use quern_schema::Operator;
use thiserror::Error;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Coarse error categories, for callers that route without matching every
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed rule tree, bad arity, unknown token, caps exceeded.
    Structural,
    /// Field/operator/value rejected by the schema.
    Schema,
    /// Identifier failed the lexical grammar.
    Identifier,
    /// Parameter value rejected.
    Parameter,
    /// Operation unsupported by the active dialect.
    Dialect,
    /// Input rejected by the sanitizer.
    Input,
}

/// Errors that can occur while compiling a rule.
#[derive(Error, Debug)]
pub enum CompileError {
    // Structural
    /// The rule tree is malformed.
    #[error("invalid rule: {message}")]
    InvalidRule { message: String },

    /// An operator token has no canonical form.
    #[error("unknown operator `{token}`")]
    UnknownOperator { token: String },

    /// An operator is missing a required operand.
    #[error("operator `{operator}` on field `{field}` is missing an operand")]
    MissingOperand { field: String, operator: Operator },

    /// Rule nesting exceeded the configured maximum.
    #[error("rule nesting exceeds the maximum depth of {max_depth}")]
    MaxDepthExceeded { max_depth: usize },

    /// Condition count exceeded the configured maximum.
    #[error("rule has more than {max_conditions} conditions")]
    MaxConditionsExceeded { max_conditions: usize },

    // Schema
    /// A rule referenced a field the schema does not declare.
    #[error("unknown field `{field}`")]
    UnknownField { field: String },

    /// A rule filtered on a field that is not filterable.
    #[error("field `{field}` is not filterable")]
    NotFilterable { field: String },

    /// A select helper projected a field that is not selectable.
    #[error("field `{field}` is not selectable")]
    NotSelectable { field: String },

    /// A sort helper ordered by a field that is not sortable.
    #[error("field `{field}` is not sortable")]
    NotSortable { field: String },

    /// An operator is not in the field's allowlist.
    #[error("operator `{operator}` is not allowed on field `{field}` (allowed: {allowed})")]
    OperatorNotAllowed {
        field: String,
        operator: Operator,
        allowed: String,
    },

    /// A null value reached a field that does not accept nulls.
    #[error("field `{field}` does not accept null values")]
    NullNotAllowed { field: String },

    /// A value failed type, option, or constraint checks.
    #[error("invalid value for `{field}` with operator `{operator}`: {message}")]
    InvalidValue {
        field: String,
        operator: Operator,
        message: String,
    },

    // Identifier
    /// An identifier failed the lexical grammar.
    #[error("invalid identifier `{identifier}`: {message}")]
    InvalidIdentifier { identifier: String, message: String },

    // Parameter
    /// A parameter value was rejected.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    // Dialect
    /// The active dialect does not support the operator.
    #[error("operator `{operator}` is not supported on {dialect}")]
    UnsupportedOperator { operator: Operator, dialect: String },

    /// The active dialect does not support a declared transform.
    #[error("transform `{transform}` is not supported on {dialect}")]
    UnsupportedTransform { transform: String, dialect: String },

    // Input integrity
    /// The input contained a circular reference (or runaway nesting).
    #[error("input contains a circular reference")]
    CircularReference,

    /// The input was empty after sanitization.
    #[error("input rule is empty")]
    InvalidInput,
}

impl CompileError {
    /// Get the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRule { .. }
            | Self::UnknownOperator { .. }
            | Self::MissingOperand { .. }
            | Self::MaxDepthExceeded { .. }
            | Self::MaxConditionsExceeded { .. } => ErrorKind::Structural,
            Self::UnknownField { .. }
            | Self::NotFilterable { .. }
            | Self::NotSelectable { .. }
            | Self::NotSortable { .. }
            | Self::OperatorNotAllowed { .. }
            | Self::NullNotAllowed { .. }
            | Self::InvalidValue { .. } => ErrorKind::Schema,
            Self::InvalidIdentifier { .. } => ErrorKind::Identifier,
            Self::InvalidParameter { .. } => ErrorKind::Parameter,
            Self::UnsupportedOperator { .. } | Self::UnsupportedTransform { .. } => {
                ErrorKind::Dialect
            }
            Self::CircularReference | Self::InvalidInput => ErrorKind::Input,
        }
    }

    /// Create an invalid-rule error.
    pub fn invalid_rule(message: impl Into<String>) -> Self {
        Self::InvalidRule {
            message: message.into(),
        }
    }

    /// Create an invalid-value error.
    pub fn invalid_value(
        field: impl Into<String>,
        operator: Operator,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            operator,
            message: message.into(),
        }
    }

    /// Create an operator-not-allowed error quoting the allowed set.
    pub fn operator_not_allowed(
        field: impl Into<String>,
        operator: Operator,
        allowed: &[Operator],
    ) -> Self {
        let allowed = allowed
            .iter()
            .map(Operator::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Self::OperatorNotAllowed {
            field: field.into(),
            operator,
            allowed,
        }
    }

    /// Create an unsupported-operator error.
    pub fn unsupported(operator: Operator, dialect: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator,
            dialect: dialect.into(),
        }
    }
}
