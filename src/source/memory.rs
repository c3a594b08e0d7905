//! In-memory row source
//!
//! Reference adapter over plain vectors of rows. Used by tests and by
//! callers whose data already lives in process. Every trait operation
//! counts as one round trip, and the counters can be read back, so
//! boundedness of an annotation pass is directly assertable.
//!
//! Capabilities are toggleable to exercise the planner's fallback and
//! batching logic.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::spec::{AggregateFunction, AnnotationSpec, OrderBy, Predicate};

use super::deadline::Deadline;
use super::errors::{SourceError, SourceResult};
use super::rank;
use super::row::Row;
use super::source::{capability, RowSource};

/// Snapshot of round trips issued against a memory source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpCounts {
    pub scans: u64,
    pub group_aggregates: u64,
    pub partition_rank_selects: u64,
    pub batch_annotates: u64,
}

impl OpCounts {
    /// Total round trips across all operations
    pub fn total(&self) -> u64 {
        self.scans + self.group_aggregates + self.partition_rank_selects + self.batch_annotates
    }
}

/// Row source backed by in-process tables
#[derive(Debug)]
pub struct MemoryRowSource {
    tables: HashMap<String, Vec<Row>>,
    partition_rank_enabled: bool,
    batch_enabled: bool,
    scans: AtomicU64,
    group_aggregates: AtomicU64,
    partition_rank_selects: AtomicU64,
    batch_annotates: AtomicU64,
}

impl MemoryRowSource {
    /// Creates an empty source with all three base capabilities
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            partition_rank_enabled: true,
            batch_enabled: false,
            scans: AtomicU64::new(0),
            group_aggregates: AtomicU64::new(0),
            partition_rank_selects: AtomicU64::new(0),
            batch_annotates: AtomicU64::new(0),
        }
    }

    /// Adds a table of rows
    pub fn with_table(mut self, entity: impl Into<String>, rows: Vec<Row>) -> Self {
        self.tables.insert(entity.into(), rows);
        self
    }

    /// Disables native partition ranking, forcing the degraded path
    pub fn without_partition_rank(mut self) -> Self {
        self.partition_rank_enabled = false;
        self
    }

    /// Enables the combined multi-spec batch extension
    pub fn with_batch(mut self) -> Self {
        self.batch_enabled = true;
        self
    }

    /// Inserts a row into a table
    pub fn insert(&mut self, entity: impl Into<String>, row: Row) {
        self.tables.entry(entity.into()).or_default().push(row);
    }

    /// Returns the round-trip counters
    pub fn ops(&self) -> OpCounts {
        OpCounts {
            scans: self.scans.load(Ordering::Relaxed),
            group_aggregates: self.group_aggregates.load(Ordering::Relaxed),
            partition_rank_selects: self.partition_rank_selects.load(Ordering::Relaxed),
            batch_annotates: self.batch_annotates.load(Ordering::Relaxed),
        }
    }

    /// Filtered rows of one table; errors on an unknown entity
    fn matching_rows(&self, entity: &str, filter: Option<&Predicate>) -> SourceResult<Vec<Row>> {
        let rows = self
            .tables
            .get(entity)
            .ok_or_else(|| SourceError::data_source(format!("Unknown entity '{}'", entity)))?;

        Ok(rows
            .iter()
            .filter(|row| filter.map(|p| p.matches(&row.body)).unwrap_or(true))
            .cloned()
            .collect())
    }
}

impl Default for MemoryRowSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RowSource for MemoryRowSource {
    fn scan(
        &self,
        entity: &str,
        filter: Option<&Predicate>,
        deadline: Deadline,
    ) -> SourceResult<Vec<Row>> {
        self.scans.fetch_add(1, Ordering::Relaxed);
        deadline.check(&format!("scan of '{}'", entity))?;
        self.matching_rows(entity, filter)
    }

    fn group_aggregate(
        &self,
        entity: &str,
        group_key: &str,
        filter: Option<&Predicate>,
        function: AggregateFunction,
        field: &str,
        deadline: Deadline,
    ) -> SourceResult<HashMap<String, Value>> {
        self.group_aggregates.fetch_add(1, Ordering::Relaxed);
        deadline.check(&format!("group_aggregate of '{}'", entity))?;
        let rows = self.matching_rows(entity, filter)?;
        Ok(rank::group_aggregate_rows(&rows, group_key, function, field))
    }

    fn partition_rank_select(
        &self,
        entity: &str,
        partition_key: &str,
        filter: Option<&Predicate>,
        order_by: &OrderBy,
        deadline: Deadline,
    ) -> SourceResult<HashMap<String, Row>> {
        self.partition_rank_selects.fetch_add(1, Ordering::Relaxed);
        deadline.check(&format!("partition_rank_select of '{}'", entity))?;
        if !self.partition_rank_enabled {
            return Err(SourceError::unsupported_capability(
                capability::PARTITION_RANK_SELECT,
            ));
        }
        let rows = self.matching_rows(entity, filter)?;
        Ok(rank::select_winners(&rows, partition_key, order_by))
    }

    fn supports_partition_rank(&self) -> bool {
        self.partition_rank_enabled
    }

    fn supports_batch(&self) -> bool {
        self.batch_enabled
    }

    fn batch_annotate(
        &self,
        entity: &str,
        partition_key: &str,
        specs: &[AnnotationSpec],
        deadline: Deadline,
    ) -> SourceResult<HashMap<String, HashMap<String, Value>>> {
        self.batch_annotates.fetch_add(1, Ordering::Relaxed);
        deadline.check(&format!("batch_annotate of '{}'", entity))?;
        if !self.batch_enabled {
            return Err(SourceError::unsupported_capability(
                capability::BATCH_ANNOTATE,
            ));
        }

        // One logical pass: every spec computed from the same tables
        // without further round trips.
        let mut out: HashMap<String, HashMap<String, Value>> = HashMap::new();
        for spec in specs {
            match spec {
                AnnotationSpec::Aggregate(agg) => {
                    let rows = self.matching_rows(entity, agg.filter.as_ref())?;
                    let grouped =
                        rank::group_aggregate_rows(&rows, partition_key, agg.function, &agg.field);
                    for (group, value) in grouped {
                        out.entry(group).or_default().insert(agg.name.clone(), value);
                    }
                }
                AnnotationSpec::Correlated(corr) => {
                    let rows = self.matching_rows(entity, corr.filter.as_ref())?;
                    let winners = rank::select_winners(&rows, partition_key, &corr.order_by);
                    for (group, row) in winners {
                        let value = row.field(&corr.project).cloned().unwrap_or(Value::Null);
                        out.entry(group).or_default().insert(corr.name.clone(), value);
                    }
                }
            }
        }
        Ok(out)
    }
}
