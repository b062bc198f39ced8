//! Input sanitization.
//!
//! Rules arrive as arbitrary deserialized JSON. Before any parsing, the
//! sanitizer strips class-pollution keys carried over from dynamic-runtime
//! clients and refuses runaway structures. The output is structurally
//! identical to the input minus the prohibited entries.

use serde_json::{Map, Value as JsonValue};

use crate::error::{CompileError, CompileResult};

/// Keys dropped from every object. These are the class-pollution
/// identifiers of JavaScript clients; they can never name a field.
const PROHIBITED_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// Nesting ceiling for the sanitizer walk. A deserialized JSON value cannot
/// be cyclic, so exceeding this depth means the input is pathological in the
/// way a circular structure would be.
const MAX_NESTING: usize = 512;

/// Sanitize a deserialized rule.
///
/// Drops prohibited keys at every level, refuses nesting beyond the ceiling
/// with [`CompileError::CircularReference`], and rejects a root object that
/// is empty after stripping with [`CompileError::InvalidInput`].
pub fn sanitize(input: &JsonValue) -> CompileResult<JsonValue> {
    let out = walk(input, 0)?;
    match &out {
        JsonValue::Object(map) if map.is_empty() => Err(CompileError::InvalidInput),
        _ => Ok(out),
    }
}

fn walk(value: &JsonValue, depth: usize) -> CompileResult<JsonValue> {
    if depth > MAX_NESTING {
        return Err(CompileError::CircularReference);
    }
    match value {
        JsonValue::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                if PROHIBITED_KEYS.contains(&key.as_str()) {
                    continue;
                }
                out.insert(key.clone(), walk(child, depth + 1)?);
            }
            Ok(JsonValue::Object(out))
        }
        JsonValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(walk(item, depth + 1)?);
            }
            Ok(JsonValue::Array(out))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_passthrough() {
        let rule = json!({"==": [{"var": "status"}, "active"]});
        assert_eq!(sanitize(&rule).unwrap(), rule);
    }

    #[test]
    fn test_strips_prohibited_keys() {
        let rule = json!({
            "and": [
                {"==": [{"var": "a", "__proto__": {"polluted": true}}, 1]}
            ],
            "constructor": {}
        });
        let clean = sanitize(&rule).unwrap();
        assert_eq!(
            clean,
            json!({"and": [{"==": [{"var": "a"}, 1]}]})
        );
    }

    #[test]
    fn test_empty_after_strip() {
        let rule = json!({"__proto__": {"x": 1}});
        let err = sanitize(&rule).unwrap_err();
        assert!(matches!(err, CompileError::InvalidInput));
    }

    #[test]
    fn test_empty_object() {
        let err = sanitize(&json!({})).unwrap_err();
        assert!(matches!(err, CompileError::InvalidInput));
    }

    #[test]
    fn test_runaway_nesting() {
        let mut rule = json!({"==": [{"var": "a"}, 1]});
        for _ in 0..600 {
            rule = json!({"not": rule});
        }
        let err = sanitize(&rule).unwrap_err();
        assert!(matches!(err, CompileError::CircularReference));
    }

    #[test]
    fn test_shared_subtrees_allowed() {
        // The same subtree appearing on two sibling paths is fine.
        let shared = json!({"==": [{"var": "a"}, 1]});
        let rule = json!({"or": [shared.clone(), shared]});
        assert!(sanitize(&rule).is_ok());
    }
}
