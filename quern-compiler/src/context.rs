//! Per-compile mutable state.
//!
//! A [`CompileContext`] is created at the start of `compile` and discarded on
//! return. It owns the depth and condition counters, the insertion-ordered
//! parameter map, and the field-type slot the dialect emitters consult for
//! array/jsonb dispatch. Parameter indices are strictly monotonic within a
//! context and never reused across calls.

use indexmap::IndexMap;
use quern_schema::FieldType;

use crate::dialect::PlaceholderStyle;
use crate::error::{CompileError, CompileResult};
use crate::value::Value;

/// Mutable state threaded through one compilation.
#[derive(Debug)]
pub struct CompileContext {
    /// Current nesting depth of logical connectives.
    pub depth: usize,
    /// Conditions visited so far.
    pub condition_count: usize,
    /// Logical type of the field owning the condition being emitted.
    pub field_type: Option<FieldType>,
    params: IndexMap<String, Value>,
    placeholder_style: PlaceholderStyle,
}

impl CompileContext {
    /// Create a fresh context for one compile.
    pub fn new(placeholder_style: PlaceholderStyle) -> Self {
        Self {
            depth: 0,
            condition_count: 0,
            field_type: None,
            params: IndexMap::new(),
            placeholder_style,
        }
    }

    /// Index the next registered parameter will take (1-based).
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    /// Number of parameters registered so far.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// The active placeholder style.
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.placeholder_style
    }

    /// Register a parameter value and return the placeholder to splice into
    /// SQL.
    ///
    /// The stored key is always `p{i}`; the placeholder follows the dialect's
    /// style. String content containing a NUL byte is rejected: values are
    /// bound, never inlined, and drivers cannot transport NUL.
    pub fn register(&mut self, value: Value) -> CompileResult<String> {
        check_nul(&value)?;
        let index = self.next_index();
        self.params.insert(param_key(index), value);
        Ok(self.placeholder_style.placeholder(index))
    }

    /// Run `f` with the field-type slot set, restoring the previous value on
    /// every exit path.
    pub fn with_field_type<R>(
        &mut self,
        field_type: FieldType,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = self.field_type.replace(field_type);
        let result = f(self);
        self.field_type = saved;
        result
    }

    /// Consume the context, yielding the ordered parameter map and the
    /// positional array (index order).
    pub fn into_params(self) -> (IndexMap<String, Value>, Vec<Value>) {
        let array = self.params.values().cloned().collect();
        (self.params, array)
    }
}

/// The stable key a parameter is stored under.
pub fn param_key(index: usize) -> String {
    format!("p{}", index)
}

fn check_nul(value: &Value) -> CompileResult<()> {
    match value {
        Value::String(s) if s.contains('\0') => Err(CompileError::InvalidParameter {
            message: "string value contains a NUL byte".to_string(),
        }),
        Value::List(items) => items.iter().try_for_each(check_nul),
        Value::Json(json) => check_json_nul(json),
        _ => Ok(()),
    }
}

fn check_json_nul(json: &serde_json::Value) -> CompileResult<()> {
    match json {
        serde_json::Value::String(s) if s.contains('\0') => {
            Err(CompileError::InvalidParameter {
                message: "string value contains a NUL byte".to_string(),
            })
        }
        serde_json::Value::Array(items) => items.iter().try_for_each(check_json_nul),
        serde_json::Value::Object(map) => map.values().try_for_each(check_json_nul),
        _ => Ok(()),
    }
}
