//! The row source boundary
//!
//! The engine assumes exactly three capabilities of the external store:
//! `scan`, `group_aggregate`, and `partition_rank_select`. A source that
//! cannot rank within partitions reports so via `supports_partition_rank`,
//! and the planner decides (per caller policy) whether the degraded
//! scan-and-rank path is permitted.
//!
//! `batch_annotate` is an optional extension: a source that can compute a
//! whole spec set in one round trip advertises it via `supports_batch`.
//! The engine never requires it, only exploits it.

use serde_json::Value;
use std::collections::HashMap;

use crate::spec::{AggregateFunction, AnnotationSpec, OrderBy, Predicate};

use super::deadline::Deadline;
use super::errors::{SourceError, SourceResult};
use super::row::Row;

/// Capability names used in errors and explain output
pub mod capability {
    /// Partitioned rank-1 selection
    pub const PARTITION_RANK_SELECT: &str = "partition_rank_select";
    /// Combined multi-spec batch
    pub const BATCH_ANNOTATE: &str = "batch_annotate";
}

/// Abstraction over a tabular data store
pub trait RowSource {
    /// Returns rows of an entity type matching the filter.
    ///
    /// The filter is pushed down; implementations must not return
    /// non-matching rows.
    fn scan(
        &self,
        entity: &str,
        filter: Option<&Predicate>,
        deadline: Deadline,
    ) -> SourceResult<Vec<Row>>;

    /// Groups rows by `group_key`, restricted by `filter`, reduced by
    /// `function` over `field`.
    ///
    /// Groups with no contributing rows are absent from the mapping.
    fn group_aggregate(
        &self,
        entity: &str,
        group_key: &str,
        filter: Option<&Predicate>,
        function: AggregateFunction,
        field: &str,
        deadline: Deadline,
    ) -> SourceResult<HashMap<String, Value>>;

    /// Selects the rank-1 row per `partition_key` partition under
    /// `order_by`, among rows matching `filter`.
    ///
    /// On equal sort keys the row with the smaller key must win, so the
    /// selection is deterministic across runs.
    fn partition_rank_select(
        &self,
        entity: &str,
        partition_key: &str,
        filter: Option<&Predicate>,
        order_by: &OrderBy,
        deadline: Deadline,
    ) -> SourceResult<HashMap<String, Row>>;

    /// Whether this source can rank within partitions natively
    fn supports_partition_rank(&self) -> bool {
        true
    }

    /// Whether this source can compute a whole spec set in one round trip
    fn supports_batch(&self) -> bool {
        false
    }

    /// Computes every spec in one operation, returning
    /// partition key → {virtual field name → value}.
    ///
    /// Only called when `supports_batch` returns true.
    fn batch_annotate(
        &self,
        entity: &str,
        partition_key: &str,
        specs: &[AnnotationSpec],
        deadline: Deadline,
    ) -> SourceResult<HashMap<String, HashMap<String, Value>>> {
        let _ = (entity, partition_key, specs, deadline);
        Err(SourceError::unsupported_capability(
            capability::BATCH_ANNOTATE,
        ))
    }
}
