//! Immutable annotation plans
//!
//! A plan records, for every spec, which source primitive will compute it,
//! plus the proven round-trip bound for the whole pass. Plans carry no
//! runtime state; executing the same plan twice against the same data
//! yields identical results.

use crate::spec::AnnotationSpec;

/// How one spec's virtual field will be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPath {
    /// Computed inside the combined multi-spec batch
    BatchAnnotate,
    /// One grouped aggregate query
    GroupAggregate,
    /// One partitioned rank-1 selection query
    PartitionRankSelect,
    /// Degraded: scan matching children, rank in process (O(children))
    DegradedScan,
}

impl AccessPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessPath::BatchAnnotate => "BATCH_ANNOTATE",
            AccessPath::GroupAggregate => "GROUP_AGGREGATE",
            AccessPath::PartitionRankSelect => "PARTITION_RANK_SELECT",
            AccessPath::DegradedScan => "DEGRADED_SCAN",
        }
    }

    /// Returns true for the documented O(children) fallback
    pub fn is_degraded(&self) -> bool {
        matches!(self, AccessPath::DegradedScan)
    }
}

/// One spec with its chosen access path
#[derive(Debug, Clone)]
pub struct PlannedSpec {
    /// The spec to compute
    pub spec: AnnotationSpec,
    /// Chosen source primitive
    pub path: AccessPath,
}

/// Immutable plan for one annotation pass
#[derive(Debug, Clone)]
pub struct AnnotationPlan {
    /// Child entity type the pass reads
    pub child_entity: String,
    /// Child field holding the parent key
    pub foreign_key: String,
    /// Specs with chosen access paths, in declaration order
    pub specs: Vec<PlannedSpec>,
    /// Whether the whole set runs as one combined batch
    pub batched: bool,
    /// Upper bound on row source round trips for this pass.
    ///
    /// Independent of the number of parents: 1 when batched, otherwise
    /// one per spec.
    pub round_trip_bound: usize,
}

impl AnnotationPlan {
    /// Returns true if any spec takes the degraded scan path
    pub fn has_degraded_path(&self) -> bool {
        self.specs.iter().any(|p| p.path.is_degraded())
    }

    /// Returns the virtual field names in declaration order
    pub fn virtual_names(&self) -> Vec<String> {
        self.specs
            .iter()
            .map(|p| p.spec.name().to_string())
            .collect()
    }
}
