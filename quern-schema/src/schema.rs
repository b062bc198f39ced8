//! Schema construction and validation.
//!
//! A [`Schema`] is built once, validated eagerly, and then shared read-only
//! with every compilation. All identifier and declaration checks happen here
//! so the compiler can trust the schema it borrows.
//!
//! # Examples
//!
//! ```rust
//! use quern_schema::{FieldDef, FieldType, Operator, Schema};
//!
//! let schema = Schema::builder()
//!     .field("status", FieldDef::new(FieldType::String, [Operator::Eq, Operator::In]))
//!     .field(
//!         "age",
//!         FieldDef::new(FieldType::Integer, [Operator::Gt, Operator::Between]),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert!(schema.field("status").is_some());
//! assert_eq!(schema.settings().max_depth, 5);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldDef;
use crate::ident::check_identifier;

/// Runtime-protection settings carried by a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Maximum nesting depth of logical connectives.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of conditions in one rule.
    #[serde(default = "default_max_conditions")]
    pub max_conditions: usize,
}

fn default_max_depth() -> usize {
    5
}

fn default_max_conditions() -> usize {
    100
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_conditions: default_max_conditions(),
        }
    }
}

/// A validated, immutable field schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: IndexMap<String, FieldDef>,
    #[serde(default)]
    settings: SchemaSettings,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Build a schema from a field map, validating every declaration.
    pub fn from_fields(fields: IndexMap<String, FieldDef>) -> SchemaResult<Self> {
        let mut builder = SchemaBuilder::new();
        for (name, def) in fields {
            builder = builder.field(name, def);
        }
        builder.build()
    }

    /// Deserialize and validate a schema from a JSON definition.
    ///
    /// The definition is an object mapping field names to [`FieldDef`]
    /// declarations, with an optional `settings` entry.
    pub fn from_json(json: &serde_json::Value) -> SchemaResult<Self> {
        #[derive(Deserialize)]
        struct Definition {
            #[serde(flatten)]
            fields: IndexMap<String, FieldDef>,
            #[serde(default)]
            settings: Option<SchemaSettings>,
        }

        let def: Definition = serde_json::from_value(json.clone()).map_err(|e| {
            SchemaError::InvalidConstraints {
                field: "<schema>".to_string(),
                message: e.to_string(),
            }
        })?;

        let mut builder = SchemaBuilder::new();
        if let Some(settings) = def.settings {
            builder = builder.settings(settings);
        }
        for (name, field) in def.fields {
            builder = builder.field(name, field);
        }
        builder.build()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Iterate fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The schema's runtime-protection settings.
    pub fn settings(&self) -> SchemaSettings {
        self.settings
    }

    /// Derive a renamed sub-schema for a public surface.
    ///
    /// `mapping` pairs a public name with the internal field it exposes; the
    /// result contains exactly the mapped fields under their public names.
    /// Rewriting happens here, at construction time, so compilation never
    /// consults two schemas.
    pub fn map_public(&self, mapping: &[(&str, &str)]) -> SchemaResult<Schema> {
        let mut fields = IndexMap::with_capacity(mapping.len());
        for (public, internal) in mapping {
            let def = self
                .fields
                .get(*internal)
                .ok_or_else(|| SchemaError::UnknownMappedField {
                    name: (*internal).to_string(),
                })?
                .clone();
            // The internal column must survive the rename.
            let def = if def.column.is_none() && def.json_path.is_none() && !def.computed {
                let mut def = def;
                def.column = Some((*internal).to_string());
                def
            } else {
                def
            };
            fields.insert((*public).to_string(), def);
        }
        let mut schema = Schema::from_fields(fields)?;
        schema.settings = self.settings;
        Ok(schema)
    }
}

/// Builder collecting field declarations before validation.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: IndexMap<String, FieldDef>,
    settings: SchemaSettings,
    errors: Vec<SchemaError>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the runtime-protection settings.
    pub fn settings(mut self, settings: SchemaSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the maximum rule nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.settings.max_depth = max_depth;
        self
    }

    /// Override the maximum condition count.
    pub fn max_conditions(mut self, max_conditions: usize) -> Self {
        self.settings.max_conditions = max_conditions;
        self
    }

    /// Declare a field.
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        let name = name.into();
        if self.fields.contains_key(&name) {
            self.errors.push(SchemaError::DuplicateField { name });
            return self;
        }
        self.fields.insert(name, def);
        self
    }

    /// Validate every declaration and produce the schema.
    pub fn build(mut self) -> SchemaResult<Schema> {
        for (name, def) in &self.fields {
            validate_field(name, def, &mut self.errors);
        }
        SchemaError::collect(self.errors)?;
        debug!(fields = self.fields.len(), "schema built");
        Ok(Schema {
            fields: self.fields,
            settings: self.settings,
        })
    }
}

fn validate_field(name: &str, def: &FieldDef, errors: &mut Vec<SchemaError>) {
    if name.is_empty() {
        errors.push(SchemaError::EmptyFieldName);
        return;
    }

    let backings = def.declared_backings();
    if backings.len() > 1 {
        errors.push(SchemaError::ConflictingBacking {
            field: name.to_string(),
            first: backings[0],
            second: backings[1],
        });
    }

    if def.computed && def.expression.as_deref().map_or(true, str::is_empty) {
        errors.push(SchemaError::MissingExpression {
            field: name.to_string(),
        });
    }

    // Regular columns go through the identifier quoter, so they must pass the
    // lexeme here. JSON paths and computed expressions are raw SQL by
    // declaration and are emitted verbatim.
    if !def.computed && def.json_path.is_none() {
        let column = def.column.as_deref().unwrap_or(name);
        if let Err(message) = check_identifier(column) {
            errors.push(SchemaError::invalid_identifier(name, column, message));
        }
    }

    if let Err(template) = def.transform.validate() {
        errors.push(SchemaError::InvalidTransformTemplate {
            field: name.to_string(),
            template: template.to_string(),
        });
    }

    if let Err(message) = def.constraints.check_coherent() {
        errors.push(SchemaError::invalid_constraints(name, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Constraints;
    use crate::operator::Operator;
    use crate::transform::{Transform, TransformSpec};
    use crate::types::FieldType;
    use serde_json::json;

    fn string_field() -> FieldDef {
        FieldDef::new(FieldType::String, [Operator::Eq])
    }

    #[test]
    fn test_build_simple() {
        let schema = Schema::builder()
            .field("status", string_field())
            .field("age", FieldDef::new(FieldType::Integer, [Operator::Gt]))
            .build()
            .unwrap();
        assert_eq!(schema.len(), 2);
        assert!(schema.field("status").is_some());
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_duplicate_field() {
        let err = Schema::builder()
            .field("status", string_field())
            .field("status", string_field())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn test_bad_column_identifier() {
        let err = Schema::builder()
            .field("status", string_field().with_column("users.status; --"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_field_name_is_default_column() {
        // A hyphenated field name fails because it would become the column.
        let err = Schema::builder()
            .field("created-at", string_field())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_json_path_skips_lexeme() {
        let schema = Schema::builder()
            .field(
                "priority",
                FieldDef::new(FieldType::String, [Operator::Eq])
                    .with_json_path("meta->>'priority'"),
            )
            .build()
            .unwrap();
        assert!(schema.field("priority").is_some());
    }

    #[test]
    fn test_conflicting_backing() {
        let err = Schema::builder()
            .field(
                "x",
                string_field().with_column("a").with_json_path("m->>'a'"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::ConflictingBacking { .. }));
    }

    #[test]
    fn test_computed_needs_expression() {
        let mut def = string_field();
        def.computed = true;
        let err = Schema::builder().field("total", def).build().unwrap_err();
        assert!(matches!(err, SchemaError::MissingExpression { .. }));
    }

    #[test]
    fn test_bad_transform_template() {
        let err = Schema::builder()
            .field(
                "name",
                string_field().with_transform(TransformSpec {
                    input: vec![Transform::Custom("UPPER(name)".into())],
                    output: vec![],
                }),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidTransformTemplate { .. }));
    }

    #[test]
    fn test_incoherent_constraints() {
        let err = Schema::builder()
            .field(
                "age",
                FieldDef::new(FieldType::Integer, [Operator::Gt]).with_constraints(Constraints {
                    min: Some(100.0),
                    max: Some(1.0),
                    ..Default::default()
                }),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidConstraints { .. }));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let err = Schema::builder()
            .field("a", string_field().with_column("1bad"))
            .field("b", string_field().with_column("also bad"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::ValidationFailed { count: 2, .. }));
    }

    #[test]
    fn test_from_json() {
        let schema = Schema::from_json(&json!({
            "status": {"type": "string", "allowed_operators": ["eq", "in"]},
            "age": {"type": "integer", "allowed_operators": ["gt", "between"]},
            "settings": {"max_depth": 8, "max_conditions": 50}
        }))
        .unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.settings().max_depth, 8);
        assert_eq!(schema.settings().max_conditions, 50);
    }

    #[test]
    fn test_map_public() {
        let internal = Schema::builder()
            .field("internal_status", string_field())
            .field("internal_age", FieldDef::new(FieldType::Integer, [Operator::Gt]))
            .build()
            .unwrap();

        let public = internal
            .map_public(&[("status", "internal_status")])
            .unwrap();
        assert_eq!(public.len(), 1);
        // The public name maps back to the internal column.
        assert_eq!(
            public.field("status").unwrap().column.as_deref(),
            Some("internal_status")
        );

        let err = internal.map_public(&[("x", "missing")]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownMappedField { .. }));
    }
}
