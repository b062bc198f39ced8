//! PostgreSQL emitters.
//!
//! PostgreSQL carries the full operator matrix: ILIKE, `~`/`~*` regex
//! matching, native array operators, and the JSONB containment/key family.
//! JSONB parameters are cast with `::jsonb`; under the positional `?`
//! placeholder style the document is pre-serialized to a JSON string because
//! positional drivers bind it as text.

use quern_schema::{FieldType, Operator};

use crate::context::CompileContext;
use crate::dialect::{into_list, wrap_pattern, Dialect};
use crate::error::{CompileError, CompileResult};
use crate::value::Value;

pub(super) fn string_op(
    dialect: &Dialect,
    ctx: &mut CompileContext,
    column: &str,
    op: Operator,
    value: Value,
    case_sensitive: bool,
) -> CompileResult<String> {
    match op {
        Operator::Regex => {
            let op_sql = if case_sensitive { "~" } else { "~*" };
            let placeholder = ctx.register(value)?;
            Ok(format!("{} {} {}", column, op_sql, placeholder))
        }
        Operator::Like => {
            let placeholder = ctx.register(value)?;
            Ok(format!("{} LIKE {}", column, placeholder))
        }
        Operator::Ilike => {
            let placeholder = ctx.register(value)?;
            Ok(format!("{} ILIKE {}", column, placeholder))
        }
        _ => {
            let keyword = if case_sensitive { "LIKE" } else { "ILIKE" };
            let pattern = wrap_pattern(dialect, op, value);
            let placeholder = ctx.register(pattern)?;
            Ok(format!("{} {} {}", column, keyword, placeholder))
        }
    }
}

pub(super) fn array_op(
    ctx: &mut CompileContext,
    column: &str,
    op: Operator,
    value: Value,
) -> CompileResult<String> {
    let jsonb = matches!(
        ctx.field_type,
        Some(FieldType::Json) | Some(FieldType::Jsonb)
    );
    match op {
        Operator::Contains => containment(ctx, column, "@>", jsonb, value),
        Operator::ContainedBy => containment(ctx, column, "<@", jsonb, value),
        Operator::Overlaps => overlaps(ctx, column, jsonb, value),
        // A candidate list against a multi-valued column means "any of these
        // appears": in/not_in are overlaps and its negation.
        Operator::In => overlaps(ctx, column, jsonb, value),
        Operator::NotIn => {
            let inner = overlaps(ctx, column, jsonb, value)?;
            Ok(format!("NOT ({})", inner))
        }
        Operator::AnyOf => any_of(ctx, column, jsonb, value, false),
        Operator::NotAnyOf => any_of(ctx, column, jsonb, value, true),
        Operator::AnyIlike => any_ilike(ctx, column, jsonb, value, false),
        Operator::NotAnyIlike => any_ilike(ctx, column, jsonb, value, true),
        other => Err(CompileError::unsupported(other, "postgresql")),
    }
}

pub(super) fn json_op(
    ctx: &mut CompileContext,
    column: &str,
    op: Operator,
    value: Value,
) -> CompileResult<String> {
    match op {
        Operator::JsonContains => {
            let placeholder = ctx.register(jsonb_param(ctx.placeholder_style(), value))?;
            Ok(format!("{} @> {}::jsonb", column, placeholder))
        }
        Operator::JsonHasKey => {
            let placeholder = ctx.register(value)?;
            Ok(format!("{} ? {}", column, placeholder))
        }
        Operator::JsonHasAnyKeys => {
            let keys = Value::List(into_list(value));
            let placeholder = ctx.register(keys)?;
            Ok(format!("{} ?| {}", column, placeholder))
        }
        other => Err(CompileError::unsupported(other, "postgresql")),
    }
}

/// `column @> param` / `column <@ param`, with `::jsonb` casting on document
/// columns.
fn containment(
    ctx: &mut CompileContext,
    column: &str,
    op_sql: &str,
    jsonb: bool,
    value: Value,
) -> CompileResult<String> {
    if jsonb {
        let placeholder = ctx.register(jsonb_param(ctx.placeholder_style(), value))?;
        Ok(format!("{} {} {}::jsonb", column, op_sql, placeholder))
    } else {
        let placeholder = ctx.register(value)?;
        Ok(format!("{} {} {}", column, op_sql, placeholder))
    }
}

/// Intersection test. Native arrays use `&&` with the whole list as one
/// parameter; jsonb arrays unnest to text and compare against one placeholder
/// per element.
fn overlaps(
    ctx: &mut CompileContext,
    column: &str,
    jsonb: bool,
    value: Value,
) -> CompileResult<String> {
    if jsonb {
        let items = into_list(value);
        let mut placeholders = Vec::with_capacity(items.len());
        for item in items {
            placeholders.push(ctx.register(item)?);
        }
        Ok(format!(
            "EXISTS (SELECT 1 FROM jsonb_array_elements_text({}) AS elem WHERE elem = ANY(ARRAY[{}]))",
            column,
            placeholders.join(", ")
        ))
    } else {
        let placeholder = ctx.register(Value::List(into_list(value)))?;
        Ok(format!("{} && {}", column, placeholder))
    }
}

/// Membership of a scalar in the column's elements.
fn any_of(
    ctx: &mut CompileContext,
    column: &str,
    jsonb: bool,
    value: Value,
    negated: bool,
) -> CompileResult<String> {
    if jsonb {
        let placeholder = ctx.register(value)?;
        let sql = format!(
            "EXISTS (SELECT 1 FROM jsonb_array_elements_text({}) AS elem WHERE elem = ANY(ARRAY[{}]))",
            column, placeholder
        );
        Ok(if negated { format!("NOT ({})", sql) } else { sql })
    } else {
        let placeholder = ctx.register(value)?;
        if negated {
            Ok(format!("{} <> ALL({})", placeholder, column))
        } else {
            Ok(format!("{} = ANY({})", placeholder, column))
        }
    }
}

/// Case-insensitive pattern match against the column's elements.
fn any_ilike(
    ctx: &mut CompileContext,
    column: &str,
    jsonb: bool,
    value: Value,
    negated: bool,
) -> CompileResult<String> {
    let placeholder = ctx.register(value)?;
    let keyword = if negated { "NOT EXISTS" } else { "EXISTS" };
    if jsonb {
        Ok(format!(
            "{} (SELECT 1 FROM jsonb_array_elements_text({}) AS elem WHERE elem ILIKE {})",
            keyword, column, placeholder
        ))
    } else {
        Ok(format!(
            "{} (SELECT 1 FROM unnest({}) AS x WHERE x ILIKE {})",
            keyword, column, placeholder
        ))
    }
}

/// Pre-serialize a JSONB parameter under positional placeholders.
fn jsonb_param(style: crate::dialect::PlaceholderStyle, value: Value) -> Value {
    if style == crate::dialect::PlaceholderStyle::Question {
        Value::String(value.to_json().to_string())
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PlaceholderStyle;
    use serde_json::json;

    fn ctx() -> CompileContext {
        CompileContext::new(PlaceholderStyle::Dollar)
    }

    #[test]
    fn test_contains_substring_escapes() {
        let mut ctx = ctx();
        let sql = string_op(
            &Dialect::Postgres,
            &mut ctx,
            "\"name\"",
            Operator::Contains,
            "50%_off".into(),
            false,
        )
        .unwrap();
        assert_eq!(sql, "\"name\" ILIKE $1");
        let (params, _) = ctx.into_params();
        assert_eq!(params.get("p1"), Some(&Value::String("%50\\%\\_off%".into())));
    }

    #[test]
    fn test_case_sensitive_uses_like() {
        let mut ctx = ctx();
        let sql = string_op(
            &Dialect::Postgres,
            &mut ctx,
            "\"name\"",
            Operator::StartsWith,
            "Al".into(),
            true,
        )
        .unwrap();
        assert_eq!(sql, "\"name\" LIKE $1");
        let (params, _) = ctx.into_params();
        assert_eq!(params.get("p1"), Some(&Value::String("Al%".into())));
    }

    #[test]
    fn test_regex_case_toggle() {
        let mut c = ctx();
        let sensitive = string_op(
            &Dialect::Postgres,
            &mut c,
            "\"name\"",
            Operator::Regex,
            "^a".into(),
            true,
        )
        .unwrap();
        assert_eq!(sensitive, "\"name\" ~ $1");
        let insensitive = string_op(
            &Dialect::Postgres,
            &mut c,
            "\"name\"",
            Operator::Regex,
            "^a".into(),
            false,
        )
        .unwrap();
        assert_eq!(insensitive, "\"name\" ~* $2");
    }

    #[test]
    fn test_like_passes_value_verbatim() {
        let mut c = ctx();
        let sql = string_op(
            &Dialect::Postgres,
            &mut c,
            "\"name\"",
            Operator::Like,
            "a%".into(),
            false,
        )
        .unwrap();
        assert_eq!(sql, "\"name\" LIKE $1");
        let (params, _) = c.into_params();
        assert_eq!(params.get("p1"), Some(&Value::String("a%".into())));
    }

    #[test]
    fn test_array_contains_native() {
        let mut c = ctx();
        c.field_type = Some(FieldType::Array);
        let sql = array_op(
            &mut c,
            "\"tags\"",
            Operator::Contains,
            Value::List(vec!["vip".into()]),
        )
        .unwrap();
        assert_eq!(sql, "\"tags\" @> $1");
    }

    #[test]
    fn test_array_contains_jsonb_casts() {
        let mut c = ctx();
        c.field_type = Some(FieldType::Jsonb);
        let sql = array_op(
            &mut c,
            "\"tags\"",
            Operator::Contains,
            Value::List(vec!["vip".into()]),
        )
        .unwrap();
        assert_eq!(sql, "\"tags\" @> $1::jsonb");
        // Dollar style keeps the structured value.
        let (params, _) = c.into_params();
        assert!(matches!(params.get("p1"), Some(Value::List(_))));
    }

    #[test]
    fn test_jsonb_param_preserialized_for_question_style() {
        let mut c = CompileContext::new(PlaceholderStyle::Question);
        c.field_type = Some(FieldType::Jsonb);
        array_op(
            &mut c,
            "\"tags\"",
            Operator::Contains,
            Value::List(vec!["vip".into()]),
        )
        .unwrap();
        let (params, _) = c.into_params();
        assert_eq!(params.get("p1"), Some(&Value::String("[\"vip\"]".into())));
    }

    #[test]
    fn test_overlaps_native() {
        let mut c = ctx();
        c.field_type = Some(FieldType::Array);
        let sql = array_op(
            &mut c,
            "\"tags\"",
            Operator::Overlaps,
            Value::List(vec!["a".into(), "b".into()]),
        )
        .unwrap();
        assert_eq!(sql, "\"tags\" && $1");
        assert_eq!(c.param_count(), 1);
    }

    #[test]
    fn test_overlaps_jsonb_expands_elements() {
        let mut c = ctx();
        c.field_type = Some(FieldType::Jsonb);
        let sql = array_op(
            &mut c,
            "\"tags\"",
            Operator::Overlaps,
            Value::List(vec!["a".into(), "b".into()]),
        )
        .unwrap();
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM jsonb_array_elements_text(\"tags\") AS elem WHERE elem = ANY(ARRAY[$1, $2]))"
        );
        assert_eq!(c.param_count(), 2);
    }

    #[test]
    fn test_in_reinterpreted_as_overlaps() {
        let mut c = ctx();
        c.field_type = Some(FieldType::Array);
        let sql = array_op(
            &mut c,
            "\"tags\"",
            Operator::In,
            Value::List(vec!["a".into()]),
        )
        .unwrap();
        assert_eq!(sql, "\"tags\" && $1");

        let negated = array_op(
            &mut c,
            "\"tags\"",
            Operator::NotIn,
            Value::List(vec!["a".into()]),
        )
        .unwrap();
        assert_eq!(negated, "NOT (\"tags\" && $2)");
    }

    #[test]
    fn test_any_of_native() {
        let mut c = ctx();
        c.field_type = Some(FieldType::Array);
        let sql = array_op(&mut c, "\"tags\"", Operator::AnyOf, "vip".into()).unwrap();
        assert_eq!(sql, "$1 = ANY(\"tags\")");
        let negated =
            array_op(&mut c, "\"tags\"", Operator::NotAnyOf, "vip".into()).unwrap();
        assert_eq!(negated, "$2 <> ALL(\"tags\")");
    }

    #[test]
    fn test_any_ilike() {
        let mut c = ctx();
        c.field_type = Some(FieldType::Array);
        let sql = array_op(&mut c, "\"tags\"", Operator::AnyIlike, "vip%".into()).unwrap();
        assert_eq!(
            sql,
            "EXISTS (SELECT 1 FROM unnest(\"tags\") AS x WHERE x ILIKE $1)"
        );
        let negated =
            array_op(&mut c, "\"tags\"", Operator::NotAnyIlike, "vip%".into()).unwrap();
        assert!(negated.starts_with("NOT EXISTS"));
    }

    #[test]
    fn test_json_contains() {
        let mut c = ctx();
        let sql = json_op(
            &mut c,
            "\"meta\"",
            Operator::JsonContains,
            Value::Json(json!({"rank": "gold"})),
        )
        .unwrap();
        assert_eq!(sql, "\"meta\" @> $1::jsonb");
    }

    #[test]
    fn test_json_has_key() {
        let mut c = ctx();
        let sql = json_op(&mut c, "\"meta\"", Operator::JsonHasKey, "rank".into()).unwrap();
        assert_eq!(sql, "\"meta\" ? $1");
    }

    #[test]
    fn test_json_has_any_keys() {
        let mut c = ctx();
        let sql = json_op(
            &mut c,
            "\"meta\"",
            Operator::JsonHasAnyKeys,
            Value::List(vec!["a".into(), "b".into()]),
        )
        .unwrap();
        assert_eq!(sql, "\"meta\" ?| $1");
        // The key list binds as one array parameter.
        assert_eq!(c.param_count(), 1);
    }
}
