//! Annotator facade
//!
//! The caller-facing entry point: holds the row source, the parent schema,
//! the parent→child relation, and the pass configuration. One call to
//! [`Annotator::annotate`] plans and executes a complete annotation pass;
//! [`Annotator::annotate_cached`] routes the same pass through the shared
//! TTL cache.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::{AnnotationCache, CacheError, CacheKey};
use crate::executor::{AnnotationExecutor, ExecutorError};
use crate::observability::Logger;
use crate::planner::{AnnotationPlanner, ExplainPlan, FallbackPolicy, PlannerError};
use crate::result::AnnotatedResultSet;
use crate::schema::{EntitySchema, Relation};
use crate::source::{Deadline, Row, RowSource};
use crate::spec::AnnotationSpec;

/// Configuration for annotation passes
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// Per-pass wall-clock budget; `None` means no deadline
    pub timeout: Option<Duration>,
    /// What to do when the source lacks `partition_rank_select`
    pub fallback: FallbackPolicy,
    /// Time-to-live for cached results
    pub cache_ttl: Duration,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            fallback: FallbackPolicy::Deny,
            cache_ttl: Duration::from_secs(60),
        }
    }
}

/// Failure of one annotation request
#[derive(Debug, Clone)]
pub enum AnnotateError {
    /// Rejected before any round trip
    Planner(PlannerError),
    /// A round trip failed; the whole pass aborts
    Executor(ExecutorError),
}

impl AnnotateError {
    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            AnnotateError::Planner(e) => e.code().code(),
            AnnotateError::Executor(e) => e.code(),
        }
    }

    /// Returns whether a retry may succeed
    pub fn retryable(&self) -> bool {
        match self {
            AnnotateError::Planner(_) => false,
            AnnotateError::Executor(e) => e.retryable(),
        }
    }

    /// Returns the spec name that caused the failure, if attributable
    pub fn spec(&self) -> Option<&str> {
        match self {
            AnnotateError::Planner(e) => e.spec(),
            AnnotateError::Executor(e) => e.spec(),
        }
    }
}

impl fmt::Display for AnnotateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotateError::Planner(e) => write!(f, "{}", e),
            AnnotateError::Executor(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AnnotateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnnotateError::Planner(e) => Some(e),
            AnnotateError::Executor(e) => Some(e),
        }
    }
}

impl From<PlannerError> for AnnotateError {
    fn from(err: PlannerError) -> Self {
        AnnotateError::Planner(err)
    }
}

impl From<ExecutorError> for AnnotateError {
    fn from(err: ExecutorError) -> Self {
        AnnotateError::Executor(err)
    }
}

impl From<AnnotateError> for CacheError {
    fn from(err: AnnotateError) -> Self {
        match err {
            AnnotateError::Planner(e) => e.into(),
            AnnotateError::Executor(e) => e.into(),
        }
    }
}

/// Annotation engine entry point
pub struct Annotator<S: RowSource> {
    source: S,
    parent_schema: EntitySchema,
    relation: Relation,
    config: AnnotatorConfig,
}

impl<S: RowSource> Annotator<S> {
    /// Creates an annotator with default configuration
    pub fn new(source: S, parent_schema: EntitySchema, relation: Relation) -> Self {
        Self::with_config(source, parent_schema, relation, AnnotatorConfig::default())
    }

    /// Creates an annotator with explicit configuration
    pub fn with_config(
        source: S,
        parent_schema: EntitySchema,
        relation: Relation,
        config: AnnotatorConfig,
    ) -> Self {
        Self {
            source,
            parent_schema,
            relation,
            config,
        }
    }

    /// Returns the underlying row source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one annotation pass over the given parents.
    ///
    /// Plans first (rejections happen before any round trip), then
    /// executes with the configured deadline. Round trips are bounded by
    /// the spec count, never the parent count.
    pub fn annotate(
        &self,
        parents: &[Row],
        specs: &[AnnotationSpec],
    ) -> Result<AnnotatedResultSet, AnnotateError> {
        let planner = AnnotationPlanner::new(&self.parent_schema, &self.relation, self.config.fallback);
        let plan = planner.plan(&self.source, specs)?;

        let parent_count = parents.len().to_string();
        let spec_count = specs.len().to_string();
        Logger::info(
            "ANNOTATION_PASS_STARTED",
            &[
                ("child_entity", plan.child_entity.as_str()),
                ("parents", &parent_count),
                ("round_trip_bound", &plan.round_trip_bound.to_string()),
                ("specs", &spec_count),
            ],
        );

        let deadline = match self.config.timeout {
            Some(timeout) => Deadline::from_timeout(timeout),
            None => Deadline::none(),
        };

        let executor = AnnotationExecutor::new(&self.source);
        let result = executor.execute(&plan, parents, &self.parent_schema, deadline);

        match &result {
            Ok(set) => {
                let rows = set.len().to_string();
                Logger::info(
                    "ANNOTATION_PASS_COMPLETED",
                    &[
                        ("child_entity", plan.child_entity.as_str()),
                        ("rows", &rows),
                    ],
                );
            }
            Err(err) => {
                Logger::error(
                    "ANNOTATION_PASS_FAILED",
                    &[
                        ("code", err.code()),
                        ("spec", err.spec().unwrap_or("-")),
                    ],
                );
            }
        }

        Ok(result?)
    }

    /// Explains how a spec set would execute, without running it
    pub fn explain(&self, specs: &[AnnotationSpec]) -> ExplainPlan {
        let planner = AnnotationPlanner::new(&self.parent_schema, &self.relation, self.config.fallback);
        match planner.plan(&self.source, specs) {
            Ok(plan) => ExplainPlan::from_plan(&plan),
            Err(err) => ExplainPlan::from_error(&err),
        }
    }
}

impl<S: RowSource + Send + Sync + 'static> Annotator<S> {
    /// Runs an annotation pass through the shared TTL cache.
    ///
    /// The key covers the spec set, the parent key set, and `as_of`.
    /// Concurrent callers with the same key share one computation;
    /// failures are returned to every waiter and never cached.
    pub async fn annotate_cached(
        self: &Arc<Self>,
        cache: &AnnotationCache,
        parents: &[Row],
        specs: &[AnnotationSpec],
        as_of: DateTime<Utc>,
    ) -> Result<Arc<AnnotatedResultSet>, CacheError> {
        let parent_keys: Vec<&str> = parents.iter().map(|r| r.key()).collect();
        let key = CacheKey::fingerprint(specs, &parent_keys, as_of)?;

        let this = Arc::clone(self);
        let parents = parents.to_vec();
        let specs = specs.to_vec();
        cache
            .get_or_compute(key, self.config.cache_ttl, move || async move {
                this.annotate(&parents, &specs).map_err(CacheError::from)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use crate::source::MemoryRowSource;
    use crate::spec::{
        AggregateFunction, AggregateSpec, CorrelatedSpec, OrderBy, Predicate, SortDirection,
    };
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashMap;

    fn tour_schema() -> EntitySchema {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), FieldDef::required_string());
        fields.insert("band".to_string(), FieldDef::required_string());
        EntitySchema::new("tour", "id", fields).unwrap()
    }

    fn concert_relation() -> Relation {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), FieldDef::required_string());
        fields.insert("tour_id".to_string(), FieldDef::required_string());
        fields.insert("start".to_string(), FieldDef::required_timestamp());
        fields.insert("tix".to_string(), FieldDef::required_bool());
        let child = EntitySchema::new("concert", "id", fields).unwrap();
        Relation::new(child, "tour_id").unwrap()
    }

    fn concert(key: &str, tour: &str, start: &str, tix: bool) -> Row {
        Row::new(
            key,
            json!({"id": key, "tour_id": tour, "start": start, "tix": tix}),
        )
    }

    fn seeded_annotator() -> Annotator<MemoryRowSource> {
        let source = MemoryRowSource::new().with_table(
            "concert",
            vec![
                concert("c1", "t1", "2025-01-10T00:00:00Z", false),
                concert("c2", "t1", "2025-02-01T00:00:00Z", true),
            ],
        );
        Annotator::new(source, tour_schema(), concert_relation())
    }

    fn upcoming_specs(relation: &Relation) -> Vec<AnnotationSpec> {
        let after = Predicate::gt("start", json!("2025-01-15T00:00:00Z"));
        vec![
            AggregateSpec::new(
                "next_concert_start",
                AggregateFunction::Min,
                "start",
                Some(after.clone()),
                &relation.child,
            )
            .unwrap()
            .into(),
            CorrelatedSpec::new(
                "tix_status",
                Some(after),
                OrderBy::asc("start"),
                "tix",
                &relation.child,
            )
            .unwrap()
            .into(),
        ]
    }

    fn tours() -> Vec<Row> {
        vec![
            Row::new("t1", json!({"id": "t1", "band": "Alpha"})),
            Row::new("t2", json!({"id": "t2", "band": "Beta"})),
        ]
    }

    #[test]
    fn test_annotate_end_to_end() {
        let annotator = seeded_annotator();
        let relation = concert_relation();

        let result = annotator
            .annotate(&tours(), &upcoming_specs(&relation))
            .unwrap();

        let t1 = &result.rows()[0];
        assert_eq!(
            t1.field("next_concert_start"),
            Some(&json!("2025-02-01T00:00:00Z"))
        );
        assert_eq!(t1.field("tix_status"), Some(&json!(true)));

        // t2 has no concerts at all
        let t2 = &result.rows()[1];
        assert_eq!(t2.field("next_concert_start"), Some(&json!(null)));
        assert_eq!(t2.field("tix_status"), Some(&json!(null)));
    }

    #[test]
    fn test_annotate_then_order_and_page() {
        let annotator = seeded_annotator();
        let relation = concert_relation();

        let result = annotator
            .annotate(&tours(), &upcoming_specs(&relation))
            .unwrap()
            .order_by("next_concert_start", SortDirection::Asc)
            .unwrap()
            .page(1, 0);

        assert_eq!(result.len(), 1);
        assert_eq!(result.rows()[0].key(), "t1");
    }

    #[test]
    fn test_capability_rejection_surfaces_code() {
        let source = MemoryRowSource::new()
            .with_table("concert", vec![])
            .without_partition_rank();
        let annotator = Annotator::new(source, tour_schema(), concert_relation());
        let relation = concert_relation();

        let err = annotator
            .annotate(&tours(), &upcoming_specs(&relation))
            .unwrap_err();
        assert_eq!(err.code(), "ANNO_CAPABILITY_UNSUPPORTED");
        assert_eq!(err.spec(), Some("tix_status"));
        assert!(!err.retryable());

        // No round trip was issued for the rejected pass
        assert_eq!(annotator.source().ops().total(), 0);
    }

    #[test]
    fn test_explain_reports_paths() {
        let annotator = seeded_annotator();
        let relation = concert_relation();

        let explain = annotator.explain(&upcoming_specs(&relation));
        let output = format!("{}", explain);
        assert!(output.contains("GROUP_AGGREGATE"));
        assert!(output.contains("PARTITION_RANK_SELECT"));
    }

    #[tokio::test]
    async fn test_annotate_cached_shares_results() {
        let annotator = Arc::new(seeded_annotator());
        let cache = AnnotationCache::new();
        let relation = concert_relation();
        let specs = upcoming_specs(&relation);
        let as_of = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();

        let first = annotator
            .annotate_cached(&cache, &tours(), &specs, as_of)
            .await
            .unwrap();
        let second = annotator
            .annotate_cached(&cache, &tours(), &specs, as_of)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        // One pass: one round trip per spec, not per caller
        assert_eq!(annotator.source().ops().total(), 2);
    }
}
