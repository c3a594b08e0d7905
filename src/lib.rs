//! annodb - A deterministic relational annotation engine
//!
//! Computes aggregate-derived and correlated virtual fields over a
//! one-to-many relation in one bounded pass, then exposes them uniformly
//! with native fields for filtering, ordering, and paging.

pub mod annotator;
pub mod cache;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod result;
pub mod schema;
pub mod source;
pub mod spec;
