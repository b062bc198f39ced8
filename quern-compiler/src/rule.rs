//! The rule tree.
//!
//! A sanitized JSON Logic value parses into a [`Rule`]: logical connectives
//! as structural nodes and conditions as leaves. Parsing is purely
//! syntactic: field resolution, operator canonicalization, and value
//! validation happen later in the compile walk, so a parse failure is always
//! a shape problem.

use serde_json::Value as JsonValue;
use smallvec::SmallVec;

use crate::error::{CompileError, CompileResult};
use crate::value::Value;

/// A leaf condition: an operator token applied to a field with 0-2 operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The surface operator token, canonicalized during compilation.
    pub token: String,
    /// The referenced field name.
    pub field: String,
    /// Literal operands, in order.
    pub values: SmallVec<[Value; 2]>,
}

/// A parsed boolean rule tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Conjunction of child rules.
    And(Vec<Rule>),
    /// Disjunction of child rules.
    Or(Vec<Rule>),
    /// Negation of a child rule.
    Not(Box<Rule>),
    /// A leaf condition.
    Cond(Condition),
}

impl Rule {
    /// Parse a sanitized JSON value into a rule tree.
    pub fn parse(json: &JsonValue) -> CompileResult<Self> {
        let map = json
            .as_object()
            .ok_or_else(|| CompileError::invalid_rule("rule must be an object"))?;

        let mut entries = map.iter();
        let (key, operand) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => return Err(CompileError::InvalidInput),
            _ => {
                return Err(CompileError::invalid_rule(
                    "rule objects carry exactly one operator key",
                ))
            }
        };

        match key.as_str() {
            "and" => Ok(Self::And(Self::parse_children(key, operand)?)),
            "or" => Ok(Self::Or(Self::parse_children(key, operand)?)),
            "not" | "!" => Ok(Self::Not(Box::new(Self::parse_negated(operand)?))),
            token => Ok(Self::Cond(Condition::parse(token, operand)?)),
        }
    }

    fn parse_children(key: &str, operand: &JsonValue) -> CompileResult<Vec<Rule>> {
        let items = operand.as_array().ok_or_else(|| {
            CompileError::invalid_rule(format!("`{}` expects an array of rules", key))
        })?;
        items.iter().map(Self::parse).collect()
    }

    /// `not` accepts either a rule object or a one-element array; JSON Logic
    /// sources emit both shapes.
    fn parse_negated(operand: &JsonValue) -> CompileResult<Rule> {
        match operand {
            JsonValue::Array(items) if items.len() == 1 => Self::parse(&items[0]),
            JsonValue::Array(_) => Err(CompileError::invalid_rule(
                "`not` expects exactly one child rule",
            )),
            other => Self::parse(other),
        }
    }

    /// Count the leaf conditions in this tree.
    pub fn condition_count(&self) -> usize {
        match self {
            Self::And(children) | Self::Or(children) => {
                children.iter().map(Rule::condition_count).sum()
            }
            Self::Not(inner) => inner.condition_count(),
            Self::Cond(_) => 1,
        }
    }
}

impl Condition {
    fn parse(token: &str, operand: &JsonValue) -> CompileResult<Self> {
        // A bare field reference is accepted as sugar for unary operators:
        // {"is_null": {"var": "deleted_at"}}.
        if let Some(field) = parse_var(operand) {
            return Ok(Self {
                token: token.to_string(),
                field,
                values: SmallVec::new(),
            });
        }

        let operands = operand.as_array().ok_or_else(|| {
            CompileError::invalid_rule(format!(
                "operator `{}` expects an array of operands",
                token
            ))
        })?;

        let mut iter = operands.iter();
        let field = iter
            .next()
            .and_then(parse_var)
            .ok_or_else(|| {
                CompileError::invalid_rule(format!(
                    "operator `{}` expects a field reference as its first operand",
                    token
                ))
            })?;

        if operands.len() > 3 {
            return Err(CompileError::invalid_rule(format!(
                "operator `{}` takes at most two value operands",
                token
            )));
        }

        let mut values = SmallVec::new();
        for item in iter {
            if parse_var(item).is_some() {
                return Err(CompileError::invalid_rule(
                    "field references are only valid as the first operand",
                ));
            }
            values.push(Value::from_json(item));
        }

        Ok(Self {
            token: token.to_string(),
            field,
            values,
        })
    }
}

/// Recognize the `{var: name}` field-reference marker.
fn parse_var(json: &JsonValue) -> Option<String> {
    let map = json.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get("var")?.as_str().map(str::to_string)
}
