//! # quern-compiler
//!
//! Compiles JSON Logic boolean rule trees into parameterized SQL `WHERE`
//! fragments for PostgreSQL, MySQL, MSSQL, and SQLite.
//!
//! Compilation is schema-driven: every field reference, operator, and value
//! is checked against a declared [`quern_schema::Schema`] before any SQL is
//! emitted. The output is always a fragment plus ordered parameters;
//! literals never appear inline.
//!
//! The pipeline: input sanitization → rule parsing → schema-directed
//! validation → operator dispatch → dialect-specific synthesis. The entry
//! point is a pure function: no I/O, no locks, no caches; concurrent
//! compilations are safe because each owns its context and borrows the
//! schema read-only.
//!
//! ## Example
//!
//! ```rust
//! use quern_compiler::{Compiler, CompilerOptions, Dialect};
//! use quern_schema::{FieldDef, FieldType, Operator, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .field("status", FieldDef::new(FieldType::String, [Operator::Eq, Operator::In]))
//!     .field("age", FieldDef::new(FieldType::Integer, [Operator::Gt]))
//!     .build()
//!     .unwrap();
//!
//! let compiled = Compiler::new(&schema)
//!     .compile(&json!({
//!         "and": [
//!             {"==": [{"var": "status"}, "active"]},
//!             {">": [{"var": "age"}, 18]}
//!         ]
//!     }))
//!     .unwrap();
//!
//! assert_eq!(compiled.sql, r#"(("status" = $1) AND ("age" > $2))"#);
//! assert_eq!(compiled.params.len(), 2);
//! ```
//!
//! ## Dialects
//!
//! ```rust
//! use quern_compiler::{compile, CompilerOptions, Dialect};
//! # use quern_schema::{FieldDef, FieldType, Operator, Schema};
//! # use serde_json::json;
//! # let schema = Schema::builder()
//! #     .field("age", FieldDef::new(FieldType::Integer, [Operator::Between]))
//! #     .build()
//! #     .unwrap();
//!
//! let compiled = compile(
//!     &schema,
//!     &json!({"between": [{"var": "age"}, 18, 65]}),
//!     CompilerOptions::for_dialect(Dialect::MsSql),
//! )
//! .unwrap();
//! assert_eq!(compiled.sql, "[age] BETWEEN @p1 AND @p2");
//! ```

pub mod compile;
pub mod context;
pub mod dialect;
pub mod error;
pub mod operator;
pub mod pagination;
pub mod rule;
pub mod sanitize;
pub mod select;
pub mod sort;
pub mod transform;
pub mod validate;
pub mod value;

pub use compile::{compile, CompiledQuery, Compiler, CompilerOptions};
pub use context::{param_key, CompileContext};
pub use dialect::{Dialect, PlaceholderStyle};
pub use error::{CompileError, CompileResult, ErrorKind};
pub use operator::{canonicalize, classify, OperatorClass};
pub use pagination::{build_pagination, PageRequest, Pagination, PaginationOptions};
pub use rule::{Condition, Rule};
pub use sanitize::sanitize;
pub use select::{build_select, SelectOptions};
pub use sort::{build_sort, SortOrder, SortSpec};
pub use value::Value;

// Re-export the schema surface the compiler API exposes.
pub use quern_schema::{FieldDef, FieldType, Operator, Schema};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::compile::{compile, CompiledQuery, Compiler, CompilerOptions};
    pub use crate::dialect::{Dialect, PlaceholderStyle};
    pub use crate::error::{CompileError, CompileResult};
    pub use crate::pagination::{build_pagination, PageRequest, PaginationOptions};
    pub use crate::select::{build_select, SelectOptions};
    pub use crate::sort::{build_sort, SortOrder, SortSpec};
    pub use crate::value::Value;
    pub use quern_schema::{FieldDef, FieldType, Operator, Schema};
}
