//! Transform rendering.
//!
//! A field's declared transforms render in two forms. The column form wraps
//! the SQL expression inside-out (`[lower, trim]` becomes
//! `TRIM(LOWER(col))`); the value form applies the equivalent string
//! operation to the parameter itself so both sides of a comparison
//! normalize identically. Only the text built-ins have a value form, and
//! custom templates never apply to values.

use quern_schema::{Transform, TEMPLATE_PLACEHOLDER};

use crate::dialect::Dialect;
use crate::error::{CompileError, CompileResult};
use crate::value::Value;

/// Wrap a column expression in the declared transforms, innermost first.
pub fn column_transform(
    dialect: Dialect,
    expression: String,
    transforms: &[Transform],
) -> CompileResult<String> {
    let mut expr = expression;
    for transform in transforms {
        expr = match transform {
            Transform::Lower => format!("LOWER({})", expr),
            Transform::Upper => format!("UPPER({})", expr),
            Transform::Trim => format!("TRIM({})", expr),
            Transform::Ltrim => format!("LTRIM({})", expr),
            Transform::Rtrim => format!("RTRIM({})", expr),
            Transform::Date => format!("DATE({})", expr),
            Transform::Year => date_part(dialect, "YEAR", &expr),
            Transform::Month => date_part(dialect, "MONTH", &expr),
            Transform::Day => date_part(dialect, "DAY", &expr),
            Transform::Unaccent => {
                if dialect != Dialect::Postgres {
                    return Err(CompileError::UnsupportedTransform {
                        transform: "unaccent".to_string(),
                        dialect: dialect.as_str().to_string(),
                    });
                }
                format!("unaccent({})", expr)
            }
            Transform::Custom(template) => template.replace(TEMPLATE_PLACEHOLDER, &expr),
        };
    }
    Ok(expr)
}

fn date_part(dialect: Dialect, unit: &str, expr: &str) -> String {
    match dialect {
        Dialect::MySql => format!("{}({})", unit, expr),
        _ => format!("EXTRACT({} FROM {})", unit, expr),
    }
}

/// Apply the text built-ins to a parameter value.
///
/// Non-string values and non-text transforms pass through untouched.
pub fn value_transform(transforms: &[Transform], value: Value) -> Value {
    let Value::String(mut s) = value else {
        return value;
    };
    for transform in transforms {
        s = match transform {
            Transform::Lower => s.to_lowercase(),
            Transform::Upper => s.to_uppercase(),
            Transform::Trim => s.trim().to_string(),
            Transform::Ltrim => s.trim_start().to_string(),
            Transform::Rtrim => s.trim_end().to_string(),
            _ => s,
        };
    }
    Value::String(s)
}
