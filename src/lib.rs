//! # Quern
//!
//! Quern compiles declarative boolean rules, written in the JSON Logic
//! dialect, into parameterized SQL `WHERE` fragments for PostgreSQL, MySQL,
//! Microsoft SQL Server, and SQLite.
//!
//! Compilation is schema-driven: every field reference, operator, and value
//! is validated against a declared field schema before any SQL is emitted,
//! and the output is always a `(sql, ordered parameters)` pair in which
//! literals never appear inline.
//!
//! ## Quick start
//!
//! Declare a schema once, then compile rules against it:
//!
//! ```rust
//! use quern::{Compiler, FieldDef, FieldType, Operator, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .field("status", FieldDef::new(FieldType::String, [Operator::Eq, Operator::In]))
//!     .field("age", FieldDef::new(FieldType::Integer, [Operator::Gt, Operator::Between]))
//!     .build()
//!     .expect("valid schema");
//!
//! let compiled = Compiler::new(&schema)
//!     .compile(&json!({
//!         "and": [
//!             {"==": [{"var": "status"}, "active"]},
//!             {">": [{"var": "age"}, 18]}
//!         ]
//!     }))
//!     .expect("valid rule");
//!
//! assert_eq!(compiled.sql, r#"(("status" = $1) AND ("age" > $2))"#);
//! assert_eq!(compiled.params_array.len(), 2);
//! ```
//!
//! The fragment omits the `WHERE` keyword; splice it into your statement and
//! bind `params_array` positionally (or `params` by `p{i}` key).
//!
//! ## Crates
//!
//! - [`quern_schema`]: the field-schema model with types, operator allowlists,
//!   constraints, options, transforms, permissions.
//! - [`quern_compiler`]: the compiler pipeline and the select/sort/
//!   pagination helpers that share the schema contract.

pub use quern_compiler::{
    build_pagination, build_select, build_sort, compile, CompileError, CompileResult,
    CompiledQuery, Compiler, CompilerOptions, Dialect, ErrorKind, PageRequest, Pagination,
    PaginationOptions, PlaceholderStyle, SelectOptions, SortOrder, SortSpec, Value,
};
pub use quern_schema::{
    Constraints, FieldDef, FieldType, Operator, Options, Schema, SchemaBuilder, SchemaError,
    SchemaResult, SchemaSettings, Transform, TransformSpec,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use quern_compiler::prelude::*;
    pub use quern_schema::{SchemaError, SchemaResult, SchemaSettings};
}
