//! Schema-directed validation.
//!
//! Every condition is checked against the declared field schema before any
//! SQL is emitted: the field must exist and be filterable, the operator must
//! be allowlisted, and the operand values must satisfy the field's type,
//! option, and constraint rules. Set operands recurse element-wise.
//!
//! Format regexes are compiled once into statics; no regex is built per call.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use quern_schema::{FieldDef, FieldType, Operator, Schema, Verdict};
use regex::Regex;

use crate::error::{CompileError, CompileResult};
use crate::operator::requires_list;
use crate::value::Value;

/// Canonical 8-4-4-4-12 UUID grammar, case-insensitive.
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

/// Anchored regexes for the recognized date formats, keyed by declaration
/// name.
static DATE_FORMATS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let table: &[(&str, &str)] = &[
        (
            "iso",
            r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$",
        ),
        ("date-only", r"^\d{4}-\d{2}-\d{2}$"),
        ("datetime", r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}$"),
        ("YYYY-MM-DD", r"^\d{4}-\d{2}-\d{2}$"),
        ("YYYY/MM/DD", r"^\d{4}/\d{2}/\d{2}$"),
        ("DD-MM-YYYY", r"^\d{2}-\d{2}-\d{4}$"),
        ("DD/MM/YYYY", r"^\d{2}/\d{2}/\d{4}$"),
        ("DD.MM.YYYY", r"^\d{2}\.\d{2}\.\d{4}$"),
        ("MM-DD-YYYY", r"^\d{2}-\d{2}-\d{4}$"),
        ("MM/DD/YYYY", r"^\d{2}/\d{2}/\d{4}$"),
        ("HH:mm", r"^\d{2}:\d{2}$"),
        ("HH:mm:ss", r"^\d{2}:\d{2}:\d{2}$"),
    ];
    table
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).unwrap()))
        .collect()
});

/// Look up the regex for a declared date format name.
pub fn date_format_regex(name: &str) -> Option<&'static Regex> {
    DATE_FORMATS
        .iter()
        .find(|(format, _)| *format == name)
        .map(|(_, regex)| regex)
}

/// Resolve a rule's field reference against the schema.
pub fn resolve_field<'a>(schema: &'a Schema, name: &str) -> CompileResult<&'a FieldDef> {
    let def = schema.field(name).ok_or_else(|| CompileError::UnknownField {
        field: name.to_string(),
    })?;
    if !def.filterable {
        return Err(CompileError::NotFilterable {
            field: name.to_string(),
        });
    }
    Ok(def)
}

/// Check an operator against the field's allowlist.
pub fn check_operator(field: &str, def: &FieldDef, op: Operator) -> CompileResult<()> {
    if def.allows(op) {
        Ok(())
    } else {
        Err(CompileError::operator_not_allowed(
            field,
            op,
            &def.allowed_operators,
        ))
    }
}

/// Validate one operand value for `op` on `field`.
///
/// List-taking operators recurse element-wise; everything else validates the
/// scalar directly.
pub fn check_value(field: &str, def: &FieldDef, op: Operator, value: &Value) -> CompileResult<()> {
    if requires_list(op) {
        let items = value.as_list().ok_or_else(|| {
            CompileError::invalid_value(field, op, "operator expects a list of values")
        })?;
        for item in items {
            check_element(field, def, op, item)?;
        }
        return Ok(());
    }

    if def.field_type == FieldType::Array {
        if let Value::List(items) = value {
            check_items_bounds(field, def, op, items.len())?;
            for item in items {
                check_element(field, def, op, item)?;
            }
            return Ok(());
        }
    }

    check_scalar(field, def, op, value)
}

/// Element of a set operand or of an array-typed value. Elements follow the
/// scalar rules, except that an array field's elements carry no declared
/// type of their own: they compare against the column's elements.
fn check_element(field: &str, def: &FieldDef, op: Operator, value: &Value) -> CompileResult<()> {
    if value.is_list() {
        return Err(CompileError::invalid_value(
            field,
            op,
            "nested lists are not valid operand elements",
        ));
    }
    check_scalar_with(field, def, op, value, def.field_type == FieldType::Array)
}

fn check_scalar(field: &str, def: &FieldDef, op: Operator, value: &Value) -> CompileResult<()> {
    check_scalar_with(field, def, op, value, false)
}

fn check_scalar_with(
    field: &str,
    def: &FieldDef,
    op: Operator,
    value: &Value,
    skip_type: bool,
) -> CompileResult<()> {
    if value.is_null() {
        if def.nullable {
            return Ok(());
        }
        return Err(CompileError::NullNotAllowed {
            field: field.to_string(),
        });
    }

    if let Some(options) = &def.options {
        if options.strict && !options.contains(&value.to_json()) {
            return Err(CompileError::invalid_value(
                field,
                op,
                "value is not in the allowed option set",
            ));
        }
    }

    // The any_of family compares the operand against *elements* of the
    // column, so an array field's declared type does not constrain it.
    let bypass_type = skip_type
        || def.field_type == FieldType::Array
            && matches!(
                op,
                Operator::AnyOf | Operator::NotAnyOf | Operator::AnyIlike | Operator::NotAnyIlike
            );
    if !bypass_type {
        check_type(field, def, op, value)?;
    }

    check_constraints(field, def, op, value)
}

fn check_type(field: &str, def: &FieldDef, op: Operator, value: &Value) -> CompileResult<()> {
    match def.field_type {
        FieldType::String | FieldType::Text => {
            if value.as_str().is_none() {
                return Err(CompileError::invalid_value(field, op, "expected a string"));
            }
        }
        FieldType::Number | FieldType::Decimal => match value.as_f64() {
            Some(f) if !f.is_nan() => {}
            _ => {
                return Err(CompileError::invalid_value(field, op, "expected a number"));
            }
        },
        FieldType::Integer => match value {
            Value::Int(_) => {}
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {}
            _ => {
                return Err(CompileError::invalid_value(field, op, "expected an integer"));
            }
        },
        FieldType::Boolean => {
            if !matches!(value, Value::Bool(_)) {
                return Err(CompileError::invalid_value(field, op, "expected a boolean"));
            }
        }
        FieldType::Uuid => {
            let ok = value.as_str().is_some_and(|s| UUID_RE.is_match(s));
            if !ok {
                return Err(CompileError::invalid_value(
                    field,
                    op,
                    "expected a UUID in 8-4-4-4-12 form",
                ));
            }
        }
        FieldType::Date | FieldType::Datetime | FieldType::Timestamp => {
            check_date(field, def, op, value)?;
        }
        FieldType::Array => {
            // A scalar reaching an array field outside the element paths
            // means the operand should have been a list.
            return Err(CompileError::invalid_value(field, op, "expected a list"));
        }
        FieldType::Json | FieldType::Jsonb => {}
    }
    Ok(())
}

fn check_date(field: &str, def: &FieldDef, op: Operator, value: &Value) -> CompileResult<()> {
    // Epoch milliseconds are accepted as a platform date value.
    if matches!(value, Value::Int(_)) {
        return Ok(());
    }
    let Some(s) = value.as_str() else {
        return Err(CompileError::invalid_value(
            field,
            op,
            "expected a date string",
        ));
    };

    if let Some(format) = &def.constraints.date_format {
        let regex = date_format_regex(format).ok_or_else(|| {
            CompileError::invalid_value(field, op, format!("unknown date format `{}`", format))
        })?;
        if !regex.is_match(s) {
            return Err(CompileError::invalid_value(
                field,
                op,
                format!("date does not match format `{}`", format),
            ));
        }
    }

    let parsed = parse_instant(s);
    if parsed.is_none() && def.constraints.date_format.is_none() {
        return Err(CompileError::invalid_value(
            field,
            op,
            "value is not a recognizable date",
        ));
    }

    if let Some(instant) = parsed {
        if let Some(min) = def.constraints.min_date {
            if instant < min.0 {
                return Err(CompileError::invalid_value(
                    field,
                    op,
                    format!("date is before the minimum {}", min),
                ));
            }
        }
        if let Some(max) = def.constraints.max_date {
            if instant > max.0 {
                return Err(CompileError::invalid_value(
                    field,
                    op,
                    format!("date is after the maximum {}", max),
                ));
            }
        }
    }
    Ok(())
}

/// Best-effort parse of a date string into a calendar instant.
fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn check_items_bounds(field: &str, def: &FieldDef, op: Operator, len: usize) -> CompileResult<()> {
    if let Some(min) = def.constraints.min_items {
        if len < min {
            return Err(CompileError::invalid_value(
                field,
                op,
                format!("list has {} items, minimum is {}", len, min),
            ));
        }
    }
    if let Some(max) = def.constraints.max_items {
        if len > max {
            return Err(CompileError::invalid_value(
                field,
                op,
                format!("list has {} items, maximum is {}", len, max),
            ));
        }
    }
    Ok(())
}

fn check_constraints(field: &str, def: &FieldDef, op: Operator, value: &Value) -> CompileResult<()> {
    let constraints = &def.constraints;

    if let Value::String(s) = value {
        let len = s.chars().count();
        if let Some(min) = constraints.min_length {
            if len < min {
                return Err(CompileError::invalid_value(
                    field,
                    op,
                    format!("string has {} characters, minimum is {}", len, min),
                ));
            }
        }
        if let Some(max) = constraints.max_length {
            if len > max {
                return Err(CompileError::invalid_value(
                    field,
                    op,
                    format!("string has {} characters, maximum is {}", len, max),
                ));
            }
        }
    }

    if let Some(pattern) = &constraints.pattern {
        let Some(s) = value.as_str() else {
            return Err(CompileError::InvalidParameter {
                message: format!("non-string value for `{}` reached a pattern check", field),
            });
        };
        if !pattern.is_match(s) {
            return Err(CompileError::invalid_value(
                field,
                op,
                format!("value does not match pattern `{}`", pattern.source()),
            ));
        }
    }

    if let Some(f) = value.as_f64() {
        if let Some(min) = constraints.min {
            if f < min {
                return Err(CompileError::invalid_value(
                    field,
                    op,
                    format!("value {} is below the minimum {}", f, min),
                ));
            }
        }
        if let Some(max) = constraints.max {
            if f > max {
                return Err(CompileError::invalid_value(
                    field,
                    op,
                    format!("value {} is above the maximum {}", f, max),
                ));
            }
        }
    }

    if let Some(predicate) = &constraints.validate {
        if let Verdict::Reject(message) = predicate.check(&value.to_json()) {
            return Err(CompileError::invalid_value(field, op, message));
        }
    }

    Ok(())
}
