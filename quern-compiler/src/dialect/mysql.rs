//! MySQL emitters.
//!
//! MySQL has no ILIKE; case-insensitivity rides on the column collation, so
//! every LIKE-family operator emits `LIKE`. Regex matching is `REGEXP`.
//! Multi-valued support is limited to `JSON_CONTAINS`, which also backs the
//! `json_contains` document operator; everything else in the array/jsonb
//! matrix is unsupported.

use quern_schema::Operator;

use crate::context::CompileContext;
use crate::dialect::{into_list, Dialect};
use crate::error::{CompileError, CompileResult};
use crate::value::Value;

pub(super) fn string_op(
    dialect: &Dialect,
    ctx: &mut CompileContext,
    column: &str,
    op: Operator,
    value: Value,
) -> CompileResult<String> {
    match op {
        Operator::Regex => {
            let placeholder = ctx.register(value)?;
            Ok(format!("{} REGEXP {}", column, placeholder))
        }
        Operator::Like | Operator::Ilike => {
            let placeholder = ctx.register(value)?;
            Ok(format!("{} LIKE {}", column, placeholder))
        }
        _ => {
            let pattern = super::wrap_pattern(dialect, op, value);
            let placeholder = ctx.register(pattern)?;
            Ok(format!("{} LIKE {}", column, placeholder))
        }
    }
}

pub(super) fn array_op(
    dialect: &Dialect,
    ctx: &mut CompileContext,
    column: &str,
    op: Operator,
    value: Value,
) -> CompileResult<String> {
    match op {
        Operator::In => dialect.in_op(ctx, column, false, into_list(value)),
        Operator::NotIn => dialect.in_op(ctx, column, true, into_list(value)),
        Operator::Contains => json_contains(ctx, column, value),
        other => Err(CompileError::unsupported(other, "mysql")),
    }
}

pub(super) fn json_op(
    ctx: &mut CompileContext,
    column: &str,
    op: Operator,
    value: Value,
) -> CompileResult<String> {
    match op {
        Operator::JsonContains => json_contains(ctx, column, value),
        other => Err(CompileError::unsupported(other, "mysql")),
    }
}

/// `JSON_CONTAINS(column, param)` with the candidate JSON-encoded, since the
/// function compares against a JSON document.
fn json_contains(ctx: &mut CompileContext, column: &str, value: Value) -> CompileResult<String> {
    let encoded = Value::String(value.to_json().to_string());
    let placeholder = ctx.register(encoded)?;
    Ok(format!("JSON_CONTAINS({}, {})", column, placeholder))
}
