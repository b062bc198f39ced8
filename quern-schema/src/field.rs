//! Field definitions.
//!
//! A [`FieldDef`] declares everything the compiler needs to validate and emit
//! a condition on one field: its logical type, its physical backing, the
//! operators callers may use, and the constraint/option/transform rules.

use serde::{Deserialize, Serialize};

use crate::constraints::{Constraints, Options};
use crate::operator::Operator;
use crate::transform::TransformSpec;
use crate::types::FieldType;

/// How a field reaches its data in SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldBacking {
    /// A physical column, possibly qualified (`schema.table.column`).
    ///
    /// `None` means the field name itself is the column name.
    Column(Option<String>),
    /// A raw JSON-access expression (e.g. `meta->>'priority'`), emitted
    /// verbatim and optionally cast to the logical type by the dialect.
    JsonPath(String),
    /// A raw SQL expression substituted for the field reference.
    Computed(String),
}

impl FieldBacking {
    /// Check if this is a regular column backing.
    pub fn is_column(&self) -> bool {
        matches!(self, Self::Column(_))
    }

    /// Short label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Column(_) => "column",
            Self::JsonPath(_) => "json_path",
            Self::Computed(_) => "computed",
        }
    }
}

impl Default for FieldBacking {
    fn default() -> Self {
        Self::Column(None)
    }
}

/// Declaration of a single schema field.
///
/// The serde shape mirrors the configuration surface: every knob is optional
/// except the type and the operator allowlist.
///
/// # Examples
///
/// ```rust
/// use quern_schema::{FieldDef, FieldType, Operator};
///
/// let field = FieldDef::new(FieldType::String, [Operator::Eq, Operator::In])
///     .with_column("users.status")
///     .not_nullable();
/// assert!(field.allows(Operator::Eq));
/// assert!(!field.allows(Operator::Gt));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Logical type of the field.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Operators callers may apply to this field.
    #[serde(default)]
    pub allowed_operators: Vec<Operator>,

    /// Physical column (defaults to the field name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Raw JSON-access expression backing the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,
    /// Marks the field as computed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,
    /// Raw SQL expression for computed fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Whether rules may filter on this field.
    #[serde(default = "default_true")]
    pub filterable: bool,
    /// Whether the select helper may project this field.
    #[serde(default = "default_true")]
    pub selectable: bool,
    /// Whether the sort helper may order by this field.
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Whether null comparison values are accepted.
    #[serde(default)]
    pub nullable: bool,
    /// Whether string operators match case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,

    /// Enumerated value set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Options>,
    /// Value constraints.
    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
    /// Input/output transforms.
    #[serde(default, skip_serializing_if = "TransformSpec::is_empty")]
    pub transform: TransformSpec,

    /// Output alias used by the select helper (defaults to the field name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

fn default_true() -> bool {
    true
}

impl FieldDef {
    /// Create a field with a type and operator allowlist; everything else
    /// takes its default.
    pub fn new(field_type: FieldType, operators: impl IntoIterator<Item = Operator>) -> Self {
        Self {
            field_type,
            allowed_operators: operators.into_iter().collect(),
            column: None,
            json_path: None,
            computed: false,
            expression: None,
            filterable: true,
            selectable: true,
            sortable: true,
            nullable: false,
            case_sensitive: false,
            options: None,
            constraints: Constraints::default(),
            transform: TransformSpec::default(),
            alias: None,
        }
    }

    /// Set the physical column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Back the field with a raw JSON-access expression.
    pub fn with_json_path(mut self, path: impl Into<String>) -> Self {
        self.json_path = Some(path.into());
        self
    }

    /// Back the field with a computed SQL expression.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.computed = true;
        self.expression = Some(expression.into());
        self
    }

    /// Allow null comparison values.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Reject null comparison values (the default).
    pub fn not_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Make string operators case-sensitive.
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Exclude the field from filtering.
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Exclude the field from selection.
    pub fn not_selectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    /// Exclude the field from sorting.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Set the enumerated value set.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the constraints.
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Set the transforms.
    pub fn with_transform(mut self, transform: TransformSpec) -> Self {
        self.transform = transform;
        self
    }

    /// Set the output alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Check if an operator is in this field's allowlist.
    pub fn allows(&self, op: Operator) -> bool {
        self.allowed_operators.contains(&op)
    }

    /// Resolve the declared backing.
    ///
    /// Precedence is not applied here: declaring more than one backing is a
    /// construction-time error surfaced by the schema builder.
    pub fn backing(&self) -> FieldBacking {
        if self.computed {
            FieldBacking::Computed(self.expression.clone().unwrap_or_default())
        } else if let Some(path) = &self.json_path {
            FieldBacking::JsonPath(path.clone())
        } else {
            FieldBacking::Column(self.column.clone())
        }
    }

    /// List the backings the definition declares, for conflict detection.
    pub fn declared_backings(&self) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        if self.column.is_some() {
            kinds.push("column");
        }
        if self.json_path.is_some() {
            kinds.push("json_path");
        }
        if self.computed {
            kinds.push("computed");
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let f = FieldDef::new(FieldType::String, [Operator::Eq]);
        assert!(f.filterable);
        assert!(f.selectable);
        assert!(f.sortable);
        assert!(!f.nullable);
        assert!(!f.case_sensitive);
        assert_eq!(f.backing(), FieldBacking::Column(None));
    }

    #[test]
    fn test_allowlist() {
        let f = FieldDef::new(FieldType::Integer, [Operator::Eq, Operator::Between]);
        assert!(f.allows(Operator::Between));
        assert!(!f.allows(Operator::Like));
    }

    #[test]
    fn test_backing_precedence_reporting() {
        let f = FieldDef::new(FieldType::Number, [Operator::Gt])
            .with_column("a")
            .with_json_path("meta->>'a'");
        assert_eq!(f.declared_backings(), vec!["column", "json_path"]);
    }

    #[test]
    fn test_serde_defaults() {
        let f: FieldDef =
            serde_json::from_str(r#"{"type": "string", "allowed_operators": ["eq", "like"]}"#)
                .unwrap();
        assert!(f.filterable);
        assert!(!f.nullable);
        assert_eq!(f.allowed_operators, vec![Operator::Eq, Operator::Like]);
    }

    #[test]
    fn test_serde_full() {
        let f: FieldDef = serde_json::from_str(
            r#"{
                "type": "date",
                "allowed_operators": ["between"],
                "column": "events.occurred_at",
                "nullable": true,
                "constraints": {"date_format": "YYYY-MM-DD", "min_date": "2000-01-01"}
            }"#,
        )
        .unwrap();
        assert_eq!(f.field_type, FieldType::Date);
        assert!(f.nullable);
        assert_eq!(f.constraints.date_format.as_deref(), Some("YYYY-MM-DD"));
    }
}
