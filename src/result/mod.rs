//! Annotated result set subsystem
//!
//! The product of one annotation pass, supporting filter/order/page over
//! native and virtual fields uniformly. All operations resolve against
//! the materialized annotation; no operation reissues source queries.

mod errors;
mod resultset;

pub use errors::{ResultError, ResultErrorCode, ResultResult, Severity};
pub use resultset::{AnnotatedResultSet, AnnotatedRow};
