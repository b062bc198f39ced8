//! SELECT-list helper.
//!
//! Builds a projection fragment from the same schema the compiler validates
//! against: column mappings, JSON paths, computed expressions, and output
//! transforms all honored, with every emitted identifier quoted by the
//! dialect.

use quern_schema::{FieldBacking, FieldDef, Schema};

use crate::dialect::Dialect;
use crate::error::{CompileError, CompileResult};
use crate::transform::column_transform;

/// Options for [`build_select`].
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Project exactly these fields, in order. `None` projects every
    /// selectable field in schema order.
    pub fields: Option<Vec<String>>,
    /// Fields to leave out.
    pub exclude: Vec<String>,
    /// Target dialect.
    pub dialect: Dialect,
}

impl SelectOptions {
    /// Options for a dialect, projecting all selectable fields.
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    /// Project exactly the named fields.
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Exclude the named fields.
    pub fn exclude(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Build a `SELECT`-list fragment (without the `SELECT` keyword).
///
/// Explicitly requested fields must exist and be selectable; when projecting
/// the whole schema, non-selectable fields are simply skipped.
pub fn build_select(schema: &Schema, options: &SelectOptions) -> CompileResult<String> {
    let mut parts = Vec::new();

    match &options.fields {
        Some(fields) => {
            for name in fields {
                if options.exclude.iter().any(|e| e == name) {
                    continue;
                }
                let def = schema
                    .field(name)
                    .ok_or_else(|| CompileError::UnknownField {
                        field: name.clone(),
                    })?;
                if !def.selectable {
                    return Err(CompileError::NotSelectable {
                        field: name.clone(),
                    });
                }
                parts.push(projection(name, def, options.dialect)?);
            }
        }
        None => {
            for (name, def) in schema.fields() {
                if !def.selectable || options.exclude.iter().any(|e| e == name) {
                    continue;
                }
                parts.push(projection(name, def, options.dialect)?);
            }
        }
    }

    Ok(parts.join(", "))
}

fn projection(name: &str, def: &FieldDef, dialect: Dialect) -> CompileResult<String> {
    let alias = def.alias.as_deref().unwrap_or(name);
    let quoted_alias = dialect.quote_identifier(alias)?;

    let expression = match def.backing() {
        FieldBacking::Computed(expression) => format!("({})", expression),
        FieldBacking::JsonPath(path) => path,
        FieldBacking::Column(column) => {
            let column = column.as_deref().unwrap_or(name);
            let quoted = dialect.quote_identifier(column)?;
            column_transform(dialect, quoted, &def.transform.output)?
        }
    };

    // Skip the alias when it would just restate the expression.
    if expression == quoted_alias {
        Ok(expression)
    } else {
        Ok(format!("{} AS {}", expression, quoted_alias))
    }
}
