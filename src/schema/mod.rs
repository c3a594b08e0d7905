//! Entity schema subsystem
//!
//! Explicit, static schemas replace any runtime field resolution: every
//! field a spec or result-set operation touches must be declared here,
//! and references are checked when the spec is built, not when it runs.

mod errors;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use types::{EntitySchema, FieldDef, FieldType, Relation};
