//! ORDER BY helper.

use quern_schema::{FieldBacking, Schema};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dialect::Dialect;
use crate::error::{CompileError, CompileResult};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// One sort entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// The schema field to order by.
    pub field: String,
    /// Direction (ascending when omitted).
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    /// Ascending sort on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Build an `ORDER BY` fragment from sort entries.
///
/// Every referenced field must exist and be sortable; computed fields expand
/// to their parenthesized expression. An empty sort list yields an empty
/// fragment.
pub fn build_sort(sorts: &[SortSpec], schema: &Schema, dialect: Dialect) -> CompileResult<String> {
    if sorts.is_empty() {
        return Ok(String::new());
    }

    let mut parts = Vec::with_capacity(sorts.len());
    for sort in sorts {
        let def = schema
            .field(&sort.field)
            .ok_or_else(|| CompileError::UnknownField {
                field: sort.field.clone(),
            })?;
        if !def.sortable {
            return Err(CompileError::NotSortable {
                field: sort.field.clone(),
            });
        }

        let expression = match def.backing() {
            FieldBacking::Computed(expression) => format!("({})", expression),
            FieldBacking::JsonPath(path) => path,
            FieldBacking::Column(column) => {
                let column = column.as_deref().unwrap_or(&sort.field);
                dialect.quote_identifier(column)?
            }
        };
        parts.push(format!("{} {}", expression, sort.order.as_sql()));
    }

    Ok(format!("ORDER BY {}", parts.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quern_schema::{FieldDef, FieldType, Operator};

    fn schema() -> Schema {
        Schema::builder()
            .field("name", FieldDef::new(FieldType::String, [Operator::Eq]))
            .field(
                "total",
                FieldDef::new(FieldType::Number, [Operator::Gt])
                    .with_expression("price * quantity"),
            )
            .field(
                "internal",
                FieldDef::new(FieldType::String, [Operator::Eq]).not_sortable(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_multi_field_sort() {
        let sql = build_sort(
            &[SortSpec::asc("name"), SortSpec::desc("total")],
            &schema(),
            Dialect::Postgres,
        )
        .unwrap();
        assert_eq!(sql, "ORDER BY \"name\" ASC, (price * quantity) DESC");
    }

    #[test]
    fn test_empty_sorts() {
        let sql = build_sort(&[], &schema(), Dialect::Postgres).unwrap();
        assert!(sql.is_empty());
    }

    #[test]
    fn test_unknown_field() {
        let err = build_sort(&[SortSpec::asc("missing")], &schema(), Dialect::Postgres)
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownField { .. }));
    }

    #[test]
    fn test_not_sortable() {
        let err = build_sort(&[SortSpec::asc("internal")], &schema(), Dialect::Postgres)
            .unwrap_err();
        assert!(matches!(err, CompileError::NotSortable { .. }));
    }

    #[test]
    fn test_mysql_quoting() {
        let sql = build_sort(&[SortSpec::desc("name")], &schema(), Dialect::MySql).unwrap();
        assert_eq!(sql, "ORDER BY `name` DESC");
    }

    #[test]
    fn test_sort_spec_serde() {
        let spec: SortSpec = serde_json::from_str(r#"{"field": "name"}"#).unwrap();
        assert_eq!(spec.order, SortOrder::Asc);
        let spec: SortSpec =
            serde_json::from_str(r#"{"field": "name", "order": "desc"}"#).unwrap();
        assert_eq!(spec.order, SortOrder::Desc);
    }
}
