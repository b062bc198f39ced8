//! SQLite emitters.
//!
//! SQLite's LIKE is case-insensitive for ASCII by default, so the LIKE-family
//! operators emit `LIKE` regardless of the case flag. `REGEXP` is emitted for
//! the regex operator; it requires the caller's connection to register a
//! `regexp()` function. Array and JSONB operator families are unsupported.

use quern_schema::Operator;

use crate::context::CompileContext;
use crate::dialect::Dialect;
use crate::error::CompileResult;
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
