//! Microsoft SQL Server emitters.
//!
//! MSSQL escapes LIKE wildcards with bracket classes rather than a backslash,
//! has no regex operator, and supports none of the array or JSONB operator
//! families: only plain membership survives.

use quern_schema::Operator;

use crate::context::CompileContext;
use crate::dialect::Dialect;
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
        Operator::Regex => Err(CompileError::unsupported(op, "mssql")),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PlaceholderStyle;

    #[test]
    fn test_contains_bracket_escaping() {
        let mut ctx = CompileContext::new(PlaceholderStyle::At);
        let sql = string_op(
            &Dialect::MsSql,
            &mut ctx,
            "[name]",
            Operator::Contains,
            "50%_off".into(),
        )
        .unwrap();
        assert_eq!(sql, "[name] LIKE @p1");
        let (params, _) = ctx.into_params();
        assert_eq!(
            params.get("p1"),
            Some(&Value::String("%50[%][_]off%".into()))
        );
    }

    #[test]
    fn test_regex_unsupported() {
        let mut ctx = CompileContext::new(PlaceholderStyle::At);
        let err = string_op(
            &Dialect::MsSql,
            &mut ctx,
            "[name]",
            Operator::Regex,
            "^a".into(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperator { .. }));
    }
}
