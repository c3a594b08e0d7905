//! Annotation spec subsystem
//!
//! Declarative inputs to the planner: predicates over child fields and the
//! two virtual-field spec kinds (aggregate, correlated top-1 projection).
//!
//! # Design Principles
//!
//! - Fail fast: every field reference is checked against the entity schema
//!   when the spec is built; execution never sees an unknown field.
//! - Pure data: specs are stateless declarations, cheap to clone and
//!   serializable for pushdown and cache fingerprinting.

mod errors;
mod predicate;
mod specs;

pub use errors::{SpecError, SpecErrorCode, SpecResult, Severity};
pub use predicate::{CompareOp, Predicate};
pub use specs::{
    validate_predicate, AggregateFunction, AggregateSpec, AnnotationSpec, CorrelatedSpec, OrderBy,
    SortDirection,
};
