//! Dialect-specific SQL synthesis.
//!
//! Each dialect decides identifier quoting, the default placeholder style,
//! and the emission strategy for every operator class. The compiler driver
//! calls the methods on [`Dialect`]; dialect-specific behavior lives in the
//! per-dialect submodules and everything four dialects share lives here.
//!
//! # Support matrix
//!
//! | Operator class     | PostgreSQL | MySQL          | MSSQL | SQLite   |
//! |--------------------|------------|----------------|-------|----------|
//! | comparison/null    | ✅         | ✅             | ✅    | ✅       |
//! | between / in       | ✅         | ✅             | ✅    | ✅       |
//! | string LIKE family | ✅ ILIKE   | ✅ collation   | ✅    | ✅       |
//! | regex              | ✅ ~ / ~*  | ✅ REGEXP      | ❌    | ✅ REGEXP|
//! | array operators    | ✅         | contains only  | ❌    | ❌       |
//! | jsonb operators    | ✅         | contains only  | ❌    | ❌       |

mod mssql;
mod mysql;
mod postgres;
mod sqlite;

use quern_schema::{FieldType, Operator};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::CompileContext;
use crate::error::{CompileError, CompileResult};
use crate::value::Value;

/// A target SQL dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL.
    #[default]
    #[serde(rename = "postgresql", alias = "postgres")]
    Postgres,
    /// MySQL.
    MySql,
    /// Microsoft SQL Server.
    MsSql,
    /// SQLite.
    Sqlite,
}

/// How placeholders are written into SQL text.
///
/// The stored parameter key is always `p{i}` regardless of style; positional
/// (`?`) dialects rely on the ordered parameter array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, … (PostgreSQL).
    Dollar,
    /// `?` positional (MySQL, SQLite).
    Question,
    /// `@p1`, `@p2`, … (MSSQL).
    At,
}

impl PlaceholderStyle {
    /// Render the placeholder for a 1-based parameter index.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Dollar => format!("${}", index),
            Self::Question => "?".to_string(),
            Self::At => format!("@p{}", index),
        }
    }
}

impl Dialect {
    /// Parse a dialect from its configuration name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "postgresql" | "postgres" => Some(Self::Postgres),
            "mysql" => Some(Self::MySql),
            "mssql" | "sqlserver" => Some(Self::MsSql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Get the configuration name of this dialect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::MySql => "mysql",
            Self::MsSql => "mssql",
            Self::Sqlite => "sqlite",
        }
    }

    /// The placeholder style this dialect uses unless overridden.
    pub fn default_placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Self::Postgres => PlaceholderStyle::Dollar,
            Self::MySql | Self::Sqlite => PlaceholderStyle::Question,
            Self::MsSql => PlaceholderStyle::At,
        }
    }

    /// Quote a possibly-qualified identifier.
    ///
    /// Each dot-separated segment is checked against the identifier lexeme
    /// and quoted independently; any failure aborts compilation.
    pub fn quote_identifier(&self, identifier: &str) -> CompileResult<String> {
        quern_schema::check_identifier(identifier).map_err(|message| {
            CompileError::InvalidIdentifier {
                identifier: identifier.to_string(),
                message,
            }
        })?;
        let quoted: Vec<String> = identifier
            .split('.')
            .map(|segment| self.quote_segment(segment))
            .collect();
        Ok(quoted.join("."))
    }

    fn quote_segment(&self, segment: &str) -> String {
        match self {
            Self::Postgres | Self::Sqlite => format!("\"{}\"", segment.replace('"', "\"\"")),
            Self::MySql => format!("`{}`", segment.replace('`', "``")),
            Self::MsSql => format!("[{}]", segment.replace(']', "]]")),
        }
    }

    /// Wrap a JSON-path expression in the cast its logical type needs.
    ///
    /// Text comparisons need no cast; the JSON accessor already yields text.
    pub fn cast_json_path(&self, path: &str, field_type: FieldType) -> String {
        match self {
            Self::Postgres => {
                let cast = match field_type {
                    FieldType::Boolean => "boolean",
                    FieldType::Number | FieldType::Integer | FieldType::Decimal => "numeric",
                    FieldType::Date => "date",
                    FieldType::Datetime | FieldType::Timestamp => "timestamp",
                    FieldType::Uuid => "uuid",
                    _ => return format!("({})", path),
                };
                format!("({})::{}", path, cast)
            }
            Self::MySql => {
                let cast = match field_type {
                    FieldType::Number | FieldType::Integer | FieldType::Decimal => "DECIMAL",
                    FieldType::Date => "DATE",
                    FieldType::Datetime | FieldType::Timestamp => "DATETIME",
                    _ => return format!("({})", path),
                };
                format!("CAST({} AS {})", path, cast)
            }
            Self::Sqlite => {
                let cast = match field_type {
                    FieldType::Number | FieldType::Integer | FieldType::Decimal => "REAL",
                    FieldType::Date | FieldType::Datetime | FieldType::Timestamp => "TEXT",
                    _ => return format!("({})", path),
                };
                format!("CAST({} AS {})", path, cast)
            }
            Self::MsSql => {
                let cast = match field_type {
                    FieldType::Number | FieldType::Integer | FieldType::Decimal => "FLOAT",
                    FieldType::Date => "DATE",
                    FieldType::Datetime | FieldType::Timestamp => "DATETIME2",
                    FieldType::Uuid => "UNIQUEIDENTIFIER",
                    _ => return format!("({})", path),
                };
                format!("CAST({} AS {})", path, cast)
            }
        }
    }

    /// Escape LIKE metacharacters in a user-provided fragment so they match
    /// literally.
    pub fn escape_like(&self, fragment: &str) -> String {
        let mut out = String::with_capacity(fragment.len());
        match self {
            Self::MsSql => {
                for c in fragment.chars() {
                    match c {
                        '%' => out.push_str("[%]"),
                        '_' => out.push_str("[_]"),
                        '[' => out.push_str("[[]"),
                        other => out.push(other),
                    }
                }
            }
            _ => {
                for c in fragment.chars() {
                    match c {
                        '\\' => out.push_str("\\\\"),
                        '%' => out.push_str("\\%"),
                        '_' => out.push_str("\\_"),
                        other => out.push(other),
                    }
                }
            }
        }
        out
    }

    // ========================================================================
    // Emitters shared by all dialects
    // ========================================================================

    /// `column IS NULL` / `column IS NOT NULL`; no parameter.
    pub fn null_check(&self, column: &str, negated: bool) -> String {
        if negated {
            format!("{} IS NOT NULL", column)
        } else {
            format!("{} IS NULL", column)
        }
    }

    /// `column <op> placeholder` for the six comparison operators.
    pub fn comparison(
        &self,
        ctx: &mut CompileContext,
        column: &str,
        op: Operator,
        value: Value,
    ) -> CompileResult<String> {
        let op_sql = comparison_sql(op);
        let placeholder = ctx.register(value)?;
        Ok(format!("{} {} {}", column, op_sql, placeholder))
    }

    /// `column [NOT] BETWEEN p AND p`, consuming two parameters.
    pub fn between(
        &self,
        ctx: &mut CompileContext,
        column: &str,
        negated: bool,
        low: Value,
        high: Value,
    ) -> CompileResult<String> {
        let low_placeholder = ctx.register(low)?;
        let high_placeholder = ctx.register(high)?;
        let keyword = if negated { "NOT BETWEEN" } else { "BETWEEN" };
        Ok(format!(
            "{} {} {} AND {}",
            column, keyword, low_placeholder, high_placeholder
        ))
    }

    /// `column [NOT] IN (p, p, …)` on scalar fields.
    ///
    /// The empty list collapses to its identity: `IN ()` can never match, so
    /// `in []` is `1=0` and `not_in []` is `1=1`, with no parameters.
    pub fn in_op(
        &self,
        ctx: &mut CompileContext,
        column: &str,
        negated: bool,
        items: Vec<Value>,
    ) -> CompileResult<String> {
        if items.is_empty() {
            return Ok(if negated { "1=1" } else { "1=0" }.to_string());
        }
        let mut placeholders = Vec::with_capacity(items.len());
        for item in items {
            placeholders.push(ctx.register(item)?);
        }
        let keyword = if negated { "NOT IN" } else { "IN" };
        Ok(format!(
            "{} {} ({})",
            column,
            keyword,
            placeholders.join(", ")
        ))
    }

    // ========================================================================
    // Dialect-dispatched emitters
    // ========================================================================

    /// LIKE-family and regex operators.
    pub fn string_op(
        &self,
        ctx: &mut CompileContext,
        column: &str,
        op: Operator,
        value: Value,
        case_sensitive: bool,
    ) -> CompileResult<String> {
        match self {
            Self::Postgres => postgres::string_op(self, ctx, column, op, value, case_sensitive),
            Self::MySql => mysql::string_op(self, ctx, column, op, value),
            Self::MsSql => mssql::string_op(self, ctx, column, op, value),
            Self::Sqlite => sqlite::string_op(self, ctx, column, op, value),
        }
    }

    /// Multi-valued column operators, including `in`/`not_in` reinterpreted
    /// on array/jsonb fields and the overloaded `contains`.
    ///
    /// The driver forwards every multi-valued shape here; the dialect decides
    /// what it can emit and fails the rest with `UnsupportedOperator`.
    pub fn array_op(
        &self,
        ctx: &mut CompileContext,
        column: &str,
        op: Operator,
        value: Value,
    ) -> CompileResult<String> {
        match self {
            Self::Postgres => postgres::array_op(ctx, column, op, value),
            Self::MySql => mysql::array_op(self, ctx, column, op, value),
            Self::MsSql | Self::Sqlite => {
                // Only plain membership survives outside PostgreSQL/MySQL.
                match op {
                    Operator::In => self.in_op(ctx, column, false, into_list(value)),
                    Operator::NotIn => self.in_op(ctx, column, true, into_list(value)),
                    other => Err(CompileError::unsupported(other, self.as_str())),
                }
            }
        }
    }

    /// JSONB document operators.
    pub fn json_op(
        &self,
        ctx: &mut CompileContext,
        column: &str,
        op: Operator,
        value: Value,
    ) -> CompileResult<String> {
        match self {
            Self::Postgres => postgres::json_op(ctx, column, op, value),
            Self::MySql => mysql::json_op(ctx, column, op, value),
            Self::MsSql | Self::Sqlite => Err(CompileError::unsupported(op, self.as_str())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// SQL text for the comparison operators.
pub(crate) fn comparison_sql(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "=",
        Operator::Ne => "<>",
        Operator::Gt => ">",
        Operator::Gte => ">=",
        Operator::Lt => "<",
        Operator::Lte => "<=",
        // The driver routes only comparison operators here.
        _ => "=",
    }
}

/// View a value as the element list of a set operator.
pub(crate) fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        other => vec![other],
    }
}

/// Wrap a starts_with/ends_with/contains value with `%`, escaping the LIKE
/// metacharacters so user text matches literally.
pub(crate) fn wrap_pattern(dialect: &Dialect, op: Operator, value: Value) -> Value {
    let Value::String(s) = value else {
        return value;
    };
    let escaped = dialect.escape_like(&s);
    let wrapped = match op {
        Operator::StartsWith => format!("{}%", escaped),
        Operator::EndsWith => format!("%{}", escaped),
        _ => format!("%{}%", escaped),
    };
    Value::String(wrapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_placeholder_styles() {
        assert_eq!(
            Dialect::Postgres.default_placeholder_style(),
            PlaceholderStyle::Dollar
        );
        assert_eq!(
            Dialect::MySql.default_placeholder_style(),
            PlaceholderStyle::Question
        );
        assert_eq!(
            Dialect::Sqlite.default_placeholder_style(),
            PlaceholderStyle::Question
        );
        assert_eq!(
            Dialect::MsSql.default_placeholder_style(),
            PlaceholderStyle::At
        );
    }

    #[test]
    fn test_quote_identifier_per_dialect() {
        assert_eq!(
            Dialect::Postgres.quote_identifier("users.email").unwrap(),
            "\"users\".\"email\""
        );
        assert_eq!(
            Dialect::MySql.quote_identifier("users.email").unwrap(),
            "`users`.`email`"
        );
        assert_eq!(
            Dialect::MsSql.quote_identifier("users.email").unwrap(),
            "[users].[email]"
        );
        assert_eq!(
            Dialect::Sqlite.quote_identifier("email").unwrap(),
            "\"email\""
        );
    }

    #[test]
    fn test_quote_identifier_rejects_bad_lexeme() {
        for bad in ["a b", "1col", "a.b.c.d", "col;", "naïve"] {
            let err = Dialect::Postgres.quote_identifier(bad).unwrap_err();
            assert!(matches!(err, CompileError::InvalidIdentifier { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_escape_like_backslash_style() {
        assert_eq!(
            Dialect::Postgres.escape_like("50%_off\\"),
            "50\\%\\_off\\\\"
        );
        assert_eq!(Dialect::MySql.escape_like("a%b"), "a\\%b");
    }

    #[test]
    fn test_escape_like_bracket_style() {
        assert_eq!(Dialect::MsSql.escape_like("50%_off["), "50[%][_]off[[]");
    }

    #[test]
    fn test_cast_json_path() {
        assert_eq!(
            Dialect::Postgres.cast_json_path("meta->>'age'", FieldType::Integer),
            "(meta->>'age')::numeric"
        );
        assert_eq!(
            Dialect::Postgres.cast_json_path("meta->>'name'", FieldType::String),
            "(meta->>'name')"
        );
        assert_eq!(
            Dialect::MySql.cast_json_path("meta->>'$.age'", FieldType::Number),
            "CAST(meta->>'$.age' AS DECIMAL)"
        );
        assert_eq!(
            Dialect::Sqlite.cast_json_path("json_extract(meta, '$.age')", FieldType::Number),
            "CAST(json_extract(meta, '$.age') AS REAL)"
        );
        assert_eq!(
            Dialect::MsSql.cast_json_path("JSON_VALUE(meta, '$.id')", FieldType::Uuid),
            "CAST(JSON_VALUE(meta, '$.id') AS UNIQUEIDENTIFIER)"
        );
    }

    #[test]
    fn test_null_check() {
        assert_eq!(
            Dialect::Postgres.null_check("\"deleted_at\"", false),
            "\"deleted_at\" IS NULL"
        );
        assert_eq!(
            Dialect::Postgres.null_check("\"deleted_at\"", true),
            "\"deleted_at\" IS NOT NULL"
        );
    }

    #[test]
    fn test_comparison_emission() {
        let mut ctx = CompileContext::new(PlaceholderStyle::Dollar);
        let sql = Dialect::Postgres
            .comparison(&mut ctx, "\"age\"", Operator::Gte, Value::Int(18))
            .unwrap();
        assert_eq!(sql, "\"age\" >= $1");
        assert_eq!(ctx.param_count(), 1);
    }

    #[test]
    fn test_between_emission() {
        let mut ctx = CompileContext::new(PlaceholderStyle::At);
        let sql = Dialect::MsSql
            .between(&mut ctx, "[age]", false, Value::Int(18), Value::Int(65))
            .unwrap();
        assert_eq!(sql, "[age] BETWEEN @p1 AND @p2");
    }

    #[test]
    fn test_in_identities() {
        let mut ctx = CompileContext::new(PlaceholderStyle::Dollar);
        let sql = Dialect::Postgres
            .in_op(&mut ctx, "\"status\"", false, vec![])
            .unwrap();
        assert_eq!(sql, "1=0");
        let sql = Dialect::Postgres
            .in_op(&mut ctx, "\"status\"", true, vec![])
            .unwrap();
        assert_eq!(sql, "1=1");
        assert_eq!(ctx.param_count(), 0);
    }

    #[test]
    fn test_in_emission() {
        let mut ctx = CompileContext::new(PlaceholderStyle::Question);
        let sql = Dialect::MySql
            .in_op(
                &mut ctx,
                "`status`",
                false,
                vec!["a".into(), "b".into(), "c".into()],
            )
            .unwrap();
        assert_eq!(sql, "`status` IN (?, ?, ?)");
        assert_eq!(ctx.param_count(), 3);
    }
}
