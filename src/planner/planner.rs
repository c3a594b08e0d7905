//! Annotation planner
//!
//! Compiles a spec set into a single batched execution plan:
//!
//! 1. Validate the spec set (duplicate virtual names, collisions with
//!    native parent fields). Field references inside each spec were
//!    already validated at spec construction.
//! 2. Choose an access path per spec from the source's capabilities and
//!    the caller's fallback policy.
//! 3. Emit an immutable plan with a proven round-trip bound independent
//!    of the number of parents.
//!
//! Planning is deterministic: same inputs → same plan. Nothing is queried
//! here; the first round trip happens in the executor.

use std::collections::HashSet;

use crate::schema::{EntitySchema, Relation};
use crate::source::{capability, RowSource};
use crate::spec::AnnotationSpec;

use super::errors::{PlannerError, PlannerResult};
use super::plan::{AccessPath, AnnotationPlan, PlannedSpec};

/// What to do when the source lacks `partition_rank_select`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Reject the pass (default): no silent degradation
    #[default]
    Deny,
    /// Permit the documented O(children) scan-and-rank path
    AllowScan,
}

/// Compiles spec sets into annotation plans
pub struct AnnotationPlanner<'a> {
    parent_schema: &'a EntitySchema,
    relation: &'a Relation,
    policy: FallbackPolicy,
}

impl<'a> AnnotationPlanner<'a> {
    /// Creates a new planner
    pub fn new(
        parent_schema: &'a EntitySchema,
        relation: &'a Relation,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            parent_schema,
            relation,
            policy,
        }
    }

    /// Plans one annotation pass.
    ///
    /// Capabilities are probed on the source but nothing is queried.
    pub fn plan<S: RowSource>(
        &self,
        source: &S,
        specs: &[AnnotationSpec],
    ) -> PlannerResult<AnnotationPlan> {
        self.validate_names(specs)?;

        // A batch-capable source computes the whole set in one round trip;
        // otherwise exactly one round trip per spec.
        let batched = source.supports_batch() && !specs.is_empty();

        let mut planned = Vec::with_capacity(specs.len());
        for spec in specs {
            let path = if batched {
                AccessPath::BatchAnnotate
            } else {
                self.select_path(source, spec)?
            };
            planned.push(PlannedSpec {
                spec: spec.clone(),
                path,
            });
        }

        let round_trip_bound = if batched { 1 } else { planned.len() };

        Ok(AnnotationPlan {
            child_entity: self.relation.child_entity().to_string(),
            foreign_key: self.relation.foreign_key.clone(),
            specs: planned,
            batched,
            round_trip_bound,
        })
    }

    /// Rejects duplicate virtual names and collisions with native fields
    fn validate_names(&self, specs: &[AnnotationSpec]) -> PlannerResult<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for spec in specs {
            let name = spec.name();
            if !seen.insert(name) {
                return Err(PlannerError::duplicate_field(name));
            }
            if self.parent_schema.has_field(name) {
                return Err(PlannerError::field_collision(name, &self.parent_schema.name));
            }
        }
        Ok(())
    }

    /// Chooses the per-spec primitive for a non-batched pass
    fn select_path<S: RowSource>(
        &self,
        source: &S,
        spec: &AnnotationSpec,
    ) -> PlannerResult<AccessPath> {
        match spec {
            AnnotationSpec::Aggregate(_) => Ok(AccessPath::GroupAggregate),
            AnnotationSpec::Correlated(_) => {
                if source.supports_partition_rank() {
                    Ok(AccessPath::PartitionRankSelect)
                } else {
                    match self.policy {
                        FallbackPolicy::AllowScan => Ok(AccessPath::DegradedScan),
                        FallbackPolicy::Deny => Err(PlannerError::capability_unsupported(
                            spec.name(),
                            capability::PARTITION_RANK_SELECT,
                        )),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use crate::source::MemoryRowSource;
    use crate::spec::{AggregateFunction, AggregateSpec, CorrelatedSpec, OrderBy};
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

    fn sample_specs(relation: &Relation) -> Vec<AnnotationSpec> {
        vec![
            AggregateSpec::new(
                "concert_count",
                AggregateFunction::Count,
                "id",
                None,
                &relation.child,
            )
            .unwrap()
            .into(),
            CorrelatedSpec::new(
                "tix_status",
                None,
                OrderBy::asc("start"),
                "tix",
                &relation.child,
            )
            .unwrap()
            .into(),
        ]
    }

    #[test]
    fn test_plan_one_round_trip_per_spec() {
        let parent = tour_schema();
        let relation = concert_relation();
        let source = MemoryRowSource::new();
        let planner = AnnotationPlanner::new(&parent, &relation, FallbackPolicy::Deny);

        let plan = planner.plan(&source, &sample_specs(&relation)).unwrap();

        assert!(!plan.batched);
        assert_eq!(plan.round_trip_bound, 2);
        assert_eq!(plan.specs[0].path, AccessPath::GroupAggregate);
        assert_eq!(plan.specs[1].path, AccessPath::PartitionRankSelect);
        assert!(!plan.has_degraded_path());
    }

    #[test]
    fn test_plan_batched_source_single_round_trip() {
        let parent = tour_schema();
        let relation = concert_relation();
        let source = MemoryRowSource::new().with_batch();
        let planner = AnnotationPlanner::new(&parent, &relation, FallbackPolicy::Deny);

        let plan = planner.plan(&source, &sample_specs(&relation)).unwrap();

        assert!(plan.batched);
        assert_eq!(plan.round_trip_bound, 1);
        assert!(plan.specs.iter().all(|p| p.path == AccessPath::BatchAnnotate));
    }

    #[test]
    fn test_missing_partition_rank_denied_by_default() {
        let parent = tour_schema();
        let relation = concert_relation();
        let source = MemoryRowSource::new().without_partition_rank();
        let planner = AnnotationPlanner::new(&parent, &relation, FallbackPolicy::Deny);

        let err = planner.plan(&source, &sample_specs(&relation)).unwrap_err();
        assert_eq!(err.code().code(), "ANNO_CAPABILITY_UNSUPPORTED");
        assert_eq!(err.spec(), Some("tix_status"));
    }

    #[test]
    fn test_missing_partition_rank_with_fallback_allowed() {
        let parent = tour_schema();
        let relation = concert_relation();
        let source = MemoryRowSource::new().without_partition_rank();
        let planner = AnnotationPlanner::new(&parent, &relation, FallbackPolicy::AllowScan);

        let plan = planner.plan(&source, &sample_specs(&relation)).unwrap();
        assert_eq!(plan.specs[1].path, AccessPath::DegradedScan);
        assert!(plan.has_degraded_path());
        // Still one round trip per spec
        assert_eq!(plan.round_trip_bound, 2);
    }

    #[test]
    fn test_duplicate_virtual_name_rejected() {
        let parent = tour_schema();
        let relation = concert_relation();
        let source = MemoryRowSource::new();
        let planner = AnnotationPlanner::new(&parent, &relation, FallbackPolicy::Deny);

        let spec: AnnotationSpec = AggregateSpec::new(
            "concert_count",
            AggregateFunction::Count,
            "id",
            None,
            &relation.child,
        )
        .unwrap()
        .into();

        let err = planner.plan(&source, &[spec.clone(), spec]).unwrap_err();
        assert_eq!(err.code().code(), "ANNO_DUPLICATE_FIELD");
    }

    #[test]
    fn test_native_field_collision_rejected() {
        let parent = tour_schema();
        let relation = concert_relation();
        let source = MemoryRowSource::new();
        let planner = AnnotationPlanner::new(&parent, &relation, FallbackPolicy::Deny);

        // "band" is a native parent field
        let spec: AnnotationSpec = AggregateSpec::new(
            "band",
            AggregateFunction::Count,
            "id",
            None,
            &relation.child,
        )
        .unwrap()
        .into();

        let err = planner.plan(&source, &[spec]).unwrap_err();
        assert_eq!(err.code().code(), "ANNO_DUPLICATE_FIELD");
        assert!(err.message().contains("native"));
    }

    #[test]
    fn test_empty_spec_set_plans_zero_round_trips() {
        let parent = tour_schema();
        let relation = concert_relation();
        let source = MemoryRowSource::new().with_batch();
        let planner = AnnotationPlanner::new(&parent, &relation, FallbackPolicy::Deny);

        let plan = planner.plan(&source, &[]).unwrap();
        assert_eq!(plan.round_trip_bound, 0);
        assert!(!plan.batched);
    }

    #[test]
    fn test_planning_is_deterministic() {
        let parent = tour_schema();
        let relation = concert_relation();
        let source = MemoryRowSource::new();
        let planner = AnnotationPlanner::new(&parent, &relation, FallbackPolicy::Deny);
        let specs = sample_specs(&relation);

        let plan1 = planner.plan(&source, &specs).unwrap();
        let plan2 = planner.plan(&source, &specs).unwrap();

        assert_eq!(plan1.round_trip_bound, plan2.round_trip_bound);
        for (a, b) in plan1.specs.iter().zip(plan2.specs.iter()) {
            assert_eq!(a.path, b.path);
            assert_eq!(a.spec.name(), b.spec.name());
        }
    }
}
