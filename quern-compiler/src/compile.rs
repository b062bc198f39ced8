//! The compiler driver.
//!
//! `compile` walks a sanitized rule tree, delegating each condition to the
//! validator and the active dialect, and accumulates parameters in a single
//! shared context, which is what guarantees that parameter indices match the
//! textual left-to-right order of placeholders in the assembled SQL.
//!
//! # Examples
//!
//! ```rust
//! use quern_compiler::{Compiler, Value};
//! use quern_schema::{FieldDef, FieldType, Operator, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .field("status", FieldDef::new(FieldType::String, [Operator::Eq]))
//!     .build()
//!     .unwrap();
//!
//! let compiled = Compiler::new(&schema)
//!     .compile(&json!({"==": [{"var": "status"}, "active"]}))
//!     .unwrap();
//!
//! assert_eq!(compiled.sql, "\"status\" = $1");
//! assert_eq!(compiled.params_array, vec![Value::String("active".into())]);
//! ```

use indexmap::IndexMap;
use quern_schema::{FieldBacking, Operator, Schema};
use serde_json::Value as JsonValue;
use smallvec::SmallVec;
use tracing::debug;

use crate::context::CompileContext;
use crate::dialect::{into_list, Dialect, PlaceholderStyle};
use crate::error::{CompileError, CompileResult};
use crate::operator::{canonicalize, classify, OperatorClass};
use crate::rule::{Condition, Rule};
use crate::sanitize::sanitize;
use crate::transform::{column_transform, value_transform};
use crate::validate::{check_operator, check_value, resolve_field};
use crate::value::Value;

/// Compiler configuration.
///
/// Unset knobs fall back to the dialect default (placeholder style) or the
/// schema settings (depth and condition caps).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Target dialect.
    pub dialect: Dialect,
    /// Placeholder style override.
    pub placeholder_style: Option<PlaceholderStyle>,
    /// Depth-cap override.
    pub max_depth: Option<usize>,
    /// Condition-cap override.
    pub max_conditions: Option<usize>,
}

impl CompilerOptions {
    /// Options for a dialect with its defaults.
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    /// Override the placeholder style.
    pub fn placeholder_style(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder_style = Some(style);
        self
    }

    /// Override the maximum nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Override the maximum condition count.
    pub fn max_conditions(mut self, max_conditions: usize) -> Self {
        self.max_conditions = Some(max_conditions);
        self
    }
}

/// A compiled WHERE fragment with its ordered parameters.
///
/// The fragment does not include the `WHERE` keyword; callers splice it.
/// `params` is keyed `p1..pn` in registration order and `params_array` is the
/// same values positionally, which is the contract for `?` placeholder dialects.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// The SQL fragment.
    pub sql: String,
    /// Parameters keyed by `p{i}`.
    pub params: IndexMap<String, Value>,
    /// Parameters in index order.
    pub params_array: Vec<Value>,
}

/// Compiles rules against one schema.
///
/// The compiler borrows the schema read-only; one instance can serve any
/// number of sequential or concurrent compilations, each with its own
/// context.
#[derive(Debug, Clone)]
pub struct Compiler<'s> {
    schema: &'s Schema,
    options: CompilerOptions,
}

impl<'s> Compiler<'s> {
    /// Create a compiler targeting PostgreSQL with default options.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            options: CompilerOptions::default(),
        }
    }

    /// Create a compiler with explicit options.
    pub fn with_options(schema: &'s Schema, options: CompilerOptions) -> Self {
        Self { schema, options }
    }

    /// The target dialect.
    pub fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    /// Compile a rule into a WHERE fragment and its parameters.
    pub fn compile(&self, rule: &JsonValue) -> CompileResult<CompiledQuery> {
        let clean = sanitize(rule)?;
        let tree = Rule::parse(&clean)?;

        let style = self
            .options
            .placeholder_style
            .unwrap_or_else(|| self.options.dialect.default_placeholder_style());
        let mut ctx = CompileContext::new(style);

        let sql = self.visit(&tree, &mut ctx)?;
        let param_count = ctx.param_count();
        let (params, params_array) = ctx.into_params();
        debug!(
            sql_len = sql.len(),
            param_count,
            dialect = %self.options.dialect,
            "rule compiled"
        );
        Ok(CompiledQuery {
            sql,
            params,
            params_array,
        })
    }

    fn max_depth(&self) -> usize {
        self.options
            .max_depth
            .unwrap_or(self.schema.settings().max_depth)
    }

    fn max_conditions(&self) -> usize {
        self.options
            .max_conditions
            .unwrap_or(self.schema.settings().max_conditions)
    }

    fn visit(&self, rule: &Rule, ctx: &mut CompileContext) -> CompileResult<String> {
        match rule {
            Rule::And(children) => self.connective(children, "AND", "1=1", ctx),
            Rule::Or(children) => self.connective(children, "OR", "1=0", ctx),
            Rule::Not(inner) => {
                let inner_sql = self.visit(inner, ctx)?;
                Ok(format!("NOT ({})", inner_sql))
            }
            Rule::Cond(cond) => self.condition(cond, ctx),
        }
    }

    fn connective(
        &self,
        children: &[Rule],
        joiner: &str,
        identity: &str,
        ctx: &mut CompileContext,
    ) -> CompileResult<String> {
        ctx.depth += 1;
        if ctx.depth > self.max_depth() {
            return Err(CompileError::MaxDepthExceeded {
                max_depth: self.max_depth(),
            });
        }
        if children.is_empty() {
            ctx.depth -= 1;
            return Ok(identity.to_string());
        }

        // Children share `ctx`, so parameter indices grow monotonically in
        // textual order.
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            parts.push(format!("({})", self.visit(child, ctx)?));
        }
        ctx.depth -= 1;

        Ok(format!("({})", parts.join(&format!(" {} ", joiner))))
    }

    fn condition(&self, cond: &Condition, ctx: &mut CompileContext) -> CompileResult<String> {
        ctx.condition_count += 1;
        if ctx.condition_count > self.max_conditions() {
            return Err(CompileError::MaxConditionsExceeded {
                max_conditions: self.max_conditions(),
            });
        }

        let def = resolve_field(self.schema, &cond.field)?;
        let op = canonicalize(&cond.token)?;
        check_operator(&cond.field, def, op)?;

        let mut values: SmallVec<[Value; 2]> = cond.values.clone();

        // Range operands arrive either inline or as one two-element list.
        if op.is_range() && values.len() == 1 {
            if let Value::List(items) = &values[0] {
                if items.len() == 2 {
                    let items = items.clone();
                    values = items.into_iter().collect();
                }
            }
        }

        let dialect = self.options.dialect;
        let column = self.column_expression(&cond.field, def, dialect)?;

        // eq/ne against the null literal is a null check; the dialect never
        // sees a null comparison parameter.
        if matches!(op, Operator::Eq | Operator::Ne)
            && values.len() == 1
            && values[0].is_null()
        {
            return Ok(dialect.null_check(&column, op == Operator::Ne));
        }

        if op.is_unary() {
            return Ok(dialect.null_check(&column, op == Operator::IsNotNull));
        }

        if values.is_empty() || (op.is_range() && values.len() < 2) {
            return Err(CompileError::MissingOperand {
                field: cond.field.clone(),
                operator: op,
            });
        }

        for value in &values {
            check_value(&cond.field, def, op, value)?;
        }

        // Value transforms mirror the column transforms, and like them only
        // apply to regular columns.
        if def.backing().is_column() && !def.transform.input.is_empty() {
            values = values
                .into_iter()
                .map(|v| value_transform(&def.transform.input, v))
                .collect();
        }

        let case_sensitive = def.case_sensitive;
        let field_type = def.field_type;
        let class = classify(op, field_type);

        // Empty candidate lists collapse to their identity before any
        // dialect dispatch, for scalar and multi-valued fields alike.
        if matches!(op, Operator::In | Operator::NotIn) {
            if let Some(items) = values[0].as_list() {
                if items.is_empty() {
                    return Ok(if op == Operator::NotIn { "1=1" } else { "1=0" }.to_string());
                }
            }
        }

        let mut values = values.into_iter();
        let first = values.next().expect("arity checked above");

        ctx.with_field_type(field_type, |ctx| match class {
            OperatorClass::Comparison => dialect.comparison(ctx, &column, op, first),
            OperatorClass::Unary => Ok(dialect.null_check(&column, op == Operator::IsNotNull)),
            OperatorClass::Range => {
                let second = values.next().expect("arity checked above");
                dialect.between(ctx, &column, op == Operator::NotBetween, first, second)
            }
            OperatorClass::Set => {
                dialect.in_op(ctx, &column, op == Operator::NotIn, into_list(first))
            }
            OperatorClass::StringOp => {
                dialect.string_op(ctx, &column, op, first, case_sensitive)
            }
            OperatorClass::Array => dialect.array_op(ctx, &column, op, first),
            OperatorClass::Json => dialect.json_op(ctx, &column, op, first),
        })
    }

    /// Build the SQL expression a condition compares against.
    fn column_expression(
        &self,
        field: &str,
        def: &quern_schema::FieldDef,
        dialect: Dialect,
    ) -> CompileResult<String> {
        match def.backing() {
            FieldBacking::Computed(expression) => Ok(format!("({})", expression)),
            FieldBacking::JsonPath(path) => Ok(dialect.cast_json_path(&path, def.field_type)),
            FieldBacking::Column(column) => {
                let column = column.as_deref().unwrap_or(field);
                let quoted = dialect.quote_identifier(column)?;
                column_transform(dialect, quoted, &def.transform.input)
            }
        }
    }
}

/// Compile a rule in one call, without holding a [`Compiler`].
pub fn compile(
    schema: &Schema,
    rule: &JsonValue,
    options: CompilerOptions,
) -> CompileResult<CompiledQuery> {
    Compiler::with_options(schema, options).compile(rule)
}
