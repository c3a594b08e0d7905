//! Annotation planner subsystem
//!
//! Compiles a set of annotation specs into a single batched execution plan
//! against the row source.
//!
//! # Design Principles
//!
//! - Deterministic: same inputs → same plan
//! - Bounded: the round-trip bound is independent of the number of parents
//! - Explicit: degraded paths are opt-in per caller policy, never silent
//!
//! # Access Path Selection (per spec)
//!
//! 1. Combined batch, when the source advertises it (whole set, one trip)
//! 2. Aggregate spec → one grouped aggregate query
//! 3. Correlated spec → one partitioned rank-1 query
//! 4. Correlated spec without partition support → degraded scan, only if
//!    the fallback policy allows it

mod errors;
mod explain;
mod plan;
mod planner;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::ExplainPlan;
pub use plan::{AccessPath, AnnotationPlan, PlannedSpec};
pub use planner::{AnnotationPlanner, FallbackPolicy};
