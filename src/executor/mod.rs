//! Annotation executor subsystem
//!
//! Consumes plans and produces annotated result sets.
//!
//! # Execution Flow (strict order)
//!
//! 1. Issue the planned source operations (combined batch, or one per spec)
//! 2. Project correlated winners; degraded path scans once and ranks in
//!    process
//! 3. Join values onto parents: absent → null, COUNT → 0
//! 4. Return the result set, or abort the whole pass on the first failure
//!
//! # Invariants
//!
//! - Deterministic execution: same plan + same data = same results
//! - Round trips never exceed the plan's proven bound
//! - Partial annotation results are never returned

mod errors;
mod executor;

pub use errors::{ExecutorError, ExecutorResult};
pub use executor::AnnotationExecutor;
