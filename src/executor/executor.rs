//! Annotation executor
//!
//! Executes an annotation plan against a row source, producing an
//! annotated result set.
//!
//! Execution flow (strict order):
//! 1. Issue the planned source operations: the combined batch, or one
//!    operation per spec
//! 2. For correlated specs, project the declared field from each winning
//!    row (degraded path: scan once, rank in process)
//! 3. Join computed values onto parents by key: absent → null, COUNT → 0
//! 4. Return the result set; any failure aborts the pass with the spec
//!    name attached

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::observability::Logger;
use crate::planner::{AccessPath, AnnotationPlan};
use crate::result::{AnnotatedResultSet, AnnotatedRow};
use crate::schema::EntitySchema;
use crate::source::{rank, Deadline, Row, RowSource};
use crate::spec::{AggregateFunction, AnnotationSpec};

use super::errors::{ExecutorError, ExecutorResult};

/// Executes annotation plans against a row source
pub struct AnnotationExecutor<'a, S: RowSource> {
    source: &'a S,
}

impl<'a, S: RowSource> AnnotationExecutor<'a, S> {
    /// Creates a new executor
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Executes a plan for the given parents.
    ///
    /// Deterministic: same plan + same data = same result set. Round
    /// trips never exceed `plan.round_trip_bound`.
    pub fn execute(
        &self,
        plan: &AnnotationPlan,
        parents: &[Row],
        parent_schema: &EntitySchema,
        deadline: Deadline,
    ) -> ExecutorResult<AnnotatedResultSet> {
        // Spec name → (parent key → computed value)
        let mut computed: HashMap<String, HashMap<String, Value>> = HashMap::new();

        if plan.batched {
            let specs: Vec<AnnotationSpec> =
                plan.specs.iter().map(|p| p.spec.clone()).collect();
            let by_parent = self
                .source
                .batch_annotate(&plan.child_entity, &plan.foreign_key, &specs, deadline)
                .map_err(ExecutorError::pass_failed)?;

            for (parent_key, values) in by_parent {
                for (spec_name, value) in values {
                    computed
                        .entry(spec_name)
                        .or_default()
                        .insert(parent_key.clone(), value);
                }
            }
        } else {
            for planned in &plan.specs {
                let values = self.execute_spec(plan, planned.path, &planned.spec, deadline)?;
                computed.insert(planned.spec.name().to_string(), values);
            }
        }

        // Join onto parents; unmatched parents get null (0 for COUNT).
        let virtual_names = plan.virtual_names();
        let rows = parents
            .iter()
            .map(|parent| {
                let mut virtuals = BTreeMap::new();
                for planned in &plan.specs {
                    let name = planned.spec.name();
                    let value = computed
                        .get(name)
                        .and_then(|m| m.get(parent.key()))
                        .cloned()
                        .unwrap_or_else(|| absent_value(&planned.spec));
                    virtuals.insert(name.to_string(), value);
                }
                AnnotatedRow::new(parent.clone(), virtuals)
            })
            .collect();

        Ok(AnnotatedResultSet::new(
            rows,
            parent_schema.clone(),
            virtual_names,
        ))
    }

    /// Runs one spec's single source operation
    fn execute_spec(
        &self,
        plan: &AnnotationPlan,
        path: AccessPath,
        spec: &AnnotationSpec,
        deadline: Deadline,
    ) -> ExecutorResult<HashMap<String, Value>> {
        let fail = |e| ExecutorError::annotation_failed(spec.name(), e);

        match (path, spec) {
            (AccessPath::GroupAggregate, AnnotationSpec::Aggregate(agg)) => self
                .source
                .group_aggregate(
                    &plan.child_entity,
                    &plan.foreign_key,
                    agg.filter.as_ref(),
                    agg.function,
                    &agg.field,
                    deadline,
                )
                .map_err(fail),
            (AccessPath::PartitionRankSelect, AnnotationSpec::Correlated(corr)) => {
                let winners = self
                    .source
                    .partition_rank_select(
                        &plan.child_entity,
                        &plan.foreign_key,
                        corr.filter.as_ref(),
                        &corr.order_by,
                        deadline,
                    )
                    .map_err(fail)?;
                Ok(project_winners(winners, &corr.project))
            }
            (AccessPath::DegradedScan, AnnotationSpec::Correlated(corr)) => {
                Logger::warn(
                    "ANNOTATION_DEGRADED_SCAN",
                    &[
                        ("entity", plan.child_entity.as_str()),
                        ("spec", spec.name()),
                    ],
                );
                let rows = self
                    .source
                    .scan(&plan.child_entity, corr.filter.as_ref(), deadline)
                    .map_err(fail)?;
                let winners = rank::select_winners(&rows, &plan.foreign_key, &corr.order_by);
                Ok(project_winners(winners, &corr.project))
            }
            // The planner never pairs an aggregate with a rank path or
            // vice versa; reaching here means the plan was hand-built.
            _ => Err(ExecutorError::annotation_failed(
                spec.name(),
                crate::source::SourceError::data_source(format!(
                    "Access path {} does not match spec kind {}",
                    path.as_str(),
                    spec.kind()
                )),
            )),
        }
    }
}

/// Projects one field out of each partition's winning row
fn project_winners(winners: HashMap<String, Row>, project: &str) -> HashMap<String, Value> {
    winners
        .into_iter()
        .map(|(group, row)| {
            let value = row.field(project).cloned().unwrap_or(Value::Null);
            (group, value)
        })
        .collect()
}

/// Value for a parent with no qualifying children
fn absent_value(spec: &AnnotationSpec) -> Value {
    match spec {
        AnnotationSpec::Aggregate(agg) if agg.function == AggregateFunction::Count => {
            Value::from(0i64)
        }
        _ => Value::Null,
    }
}
