//! Error types for schema construction and validation.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while building or validating a field schema.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// A field was declared more than once.
    #[error("duplicate field `{name}`")]
    #[diagnostic(code(quern::schema::duplicate_field))]
    DuplicateField { name: String },

    /// A field was declared with an empty name.
    #[error("field names must not be empty")]
    #[diagnostic(code(quern::schema::empty_field_name))]
    EmptyFieldName,

    /// A column identifier failed the lexical grammar.
    #[error("invalid column identifier `{identifier}` on field `{field}`: {message}")]
    #[diagnostic(
        code(quern::schema::invalid_identifier),
        help("identifiers must match [A-Za-z_][A-Za-z0-9_]* per dot-separated segment, with at most 3 segments")
    )]
    InvalidIdentifier {
        field: String,
        identifier: String,
        message: String,
    },

    /// A field declared more than one physical backing.
    #[error("field `{field}` declares conflicting backings ({first} and {second})")]
    #[diagnostic(
        code(quern::schema::conflicting_backing),
        help("a field is backed by exactly one of: a column, a JSON path, or a computed expression")
    )]
    ConflictingBacking {
        field: String,
        first: &'static str,
        second: &'static str,
    },

    /// A computed field was declared without an expression.
    #[error("computed field `{field}` has no expression")]
    #[diagnostic(code(quern::schema::missing_expression))]
    MissingExpression { field: String },

    /// A custom transform template is missing the column placeholder.
    #[error("custom transform on field `{field}` has no `{{column}}` placeholder: `{template}`")]
    #[diagnostic(code(quern::schema::invalid_transform_template))]
    InvalidTransformTemplate { field: String, template: String },

    /// A constraint pattern failed to compile.
    #[error("invalid pattern on field `{field}`: {message}")]
    #[diagnostic(code(quern::schema::invalid_pattern))]
    InvalidPattern { field: String, message: String },

    /// A constraint declaration is self-contradictory.
    #[error("invalid constraints on field `{field}`: {message}")]
    #[diagnostic(code(quern::schema::invalid_constraints))]
    InvalidConstraints { field: String, message: String },

    /// A date bound failed to parse.
    #[error("invalid date bound `{value}` on field `{field}`")]
    #[diagnostic(
        code(quern::schema::invalid_date_bound),
        help("date bounds accept `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`")
    )]
    InvalidDateBound { field: String, value: String },

    /// A schema mapping referenced a field that does not exist.
    #[error("mapping references unknown field `{name}`")]
    #[diagnostic(code(quern::schema::unknown_mapped_field))]
    UnknownMappedField { name: String },

    /// Schema construction failed with multiple issues.
    #[error("schema validation failed with {count} error(s)")]
    #[diagnostic(code(quern::schema::validation_failed))]
    ValidationFailed {
        count: usize,
        #[related]
        errors: Vec<SchemaError>,
    },
}

impl SchemaError {
    /// Create an invalid-identifier error.
    pub fn invalid_identifier(
        field: impl Into<String>,
        identifier: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidIdentifier {
            field: field.into(),
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-constraints error.
    pub fn invalid_constraints(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConstraints {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Collapse a list of errors into a single error.
    ///
    /// Returns `Ok(())` when the list is empty and unwraps singleton lists.
    pub fn collect(errors: Vec<SchemaError>) -> SchemaResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.into_iter().next().unwrap()),
            count => Err(SchemaError::ValidationFailed { count, errors }),
        }
    }
}
