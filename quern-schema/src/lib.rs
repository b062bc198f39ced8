//! # quern-schema
//!
//! Field-schema model for the Quern rule compiler.
//!
//! This crate provides:
//! - Field declarations: logical types, physical backings, permissions
//! - Operator allowlists shared with the compiler
//! - Constraint, option, and transform declarations
//! - Eager construction-time validation with diagnostic errors
//!
//! Schemas are constructed once and shared read-only across compilations.
//!
//! ## Example
//!
//! ```rust
//! use quern_schema::{FieldDef, FieldType, Operator, Schema};
//!
//! let schema = Schema::builder()
//!     .field("status", FieldDef::new(FieldType::String, [Operator::Eq, Operator::In]))
//!     .field("age", FieldDef::new(FieldType::Integer, [Operator::Gt, Operator::Lte]))
//!     .build()
//!     .expect("valid schema");
//! ```

pub mod constraints;
pub mod error;
pub mod field;
pub mod ident;
pub mod operator;
pub mod schema;
pub mod transform;
pub mod types;

pub use constraints::{Constraints, DateBound, Options, Pattern, Predicate, Verdict};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldBacking, FieldDef};
pub use ident::{check_identifier, is_valid_segment, MAX_IDENTIFIER_SEGMENTS};
pub use operator::{Operator, COMPARISON_OPERATORS};
pub use schema::{Schema, SchemaBuilder, SchemaSettings};
pub use transform::{Transform, TransformSpec, TEMPLATE_PLACEHOLDER};
pub use types::FieldType;
