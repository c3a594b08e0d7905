//! Explain output for annotation plans
//!
//! Deterministic, human-readable description of how a pass will run:
//! one line per spec with its access path, plus the round-trip bound.

use std::fmt;

use super::errors::PlannerError;
use super::plan::AnnotationPlan;

/// Explain output for one planned (or rejected) pass
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// Child entity read by the pass
    pub child_entity: Option<String>,
    /// Per-spec lines: (name, kind, access path)
    pub specs: Vec<(String, String, String)>,
    /// Whether the pass runs as one combined batch
    pub batched: bool,
    /// Proven round-trip bound
    pub round_trip_bound: Option<usize>,
    /// Whether any spec takes the degraded scan path
    pub degraded: bool,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates explain output from a successful plan
    pub fn from_plan(plan: &AnnotationPlan) -> Self {
        let specs = plan
            .specs
            .iter()
            .map(|p| {
                (
                    p.spec.name().to_string(),
                    p.spec.kind().to_string(),
                    p.path.as_str().to_string(),
                )
            })
            .collect();

        Self {
            accepted: true,
            child_entity: Some(plan.child_entity.clone()),
            specs,
            batched: plan.batched,
            round_trip_bound: Some(plan.round_trip_bound),
            degraded: plan.has_degraded_path(),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates explain output from a planning error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            child_entity: None,
            specs: Vec::new(),
            batched: false,
            round_trip_bound: None,
            degraded: false,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN ANNOTATION ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(entity) = &self.child_entity {
                writeln!(f, "Child Entity: {}", entity)?;
            }
            writeln!(f, "Batched: {}", if self.batched { "yes" } else { "no" })?;
            if !self.specs.is_empty() {
                writeln!(f, "Specs:")?;
                for (name, kind, path) in &self.specs {
                    writeln!(f, "  - {} ({}) via {}", name, kind, path)?;
                }
            }
            if let Some(bound) = self.round_trip_bound {
                writeln!(f, "Round Trips: at most {}", bound)?;
            }
            if self.degraded {
                writeln!(f, "Warning: degraded scan path in use")?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{AnnotationPlanner, FallbackPolicy};
    use crate::schema::{EntitySchema, FieldDef, Relation};
    use crate::source::MemoryRowSource;
    use crate::spec::{AggregateFunction, AggregateSpec, AnnotationSpec};
    use std::collections::HashMap;

    fn setup() -> (EntitySchema, Relation) {
        let mut parent_fields = HashMap::new();
        parent_fields.insert("id".to_string(), FieldDef::required_string());
        let parent = EntitySchema::new("tour", "id", parent_fields).unwrap();

        let mut child_fields = HashMap::new();
        child_fields.insert("id".to_string(), FieldDef::required_string());
        child_fields.insert("tour_id".to_string(), FieldDef::required_string());
        let child = EntitySchema::new("concert", "id", child_fields).unwrap();

        (parent, Relation::new(child, "tour_id").unwrap())
    }

    #[test]
    fn test_explain_accepted_plan() {
        let (parent, relation) = setup();
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

        let plan = planner.plan(&source, &[spec]).unwrap();
        let explain = ExplainPlan::from_plan(&plan);

        assert!(explain.accepted);
        assert_eq!(explain.round_trip_bound, Some(1));

        let output = format!("{}", explain);
        assert!(output.contains("ACCEPTED"));
        assert!(output.contains("concert_count"));
        assert!(output.contains("GROUP_AGGREGATE"));
    }

    #[test]
    fn test_explain_rejected_plan() {
        let err = PlannerError::duplicate_field("tix_status");
        let explain = ExplainPlan::from_error(&err);

        assert!(!explain.accepted);
        assert_eq!(explain.rejection_code, Some("ANNO_DUPLICATE_FIELD".into()));

        let output = format!("{}", explain);
        assert!(output.contains("REJECTED"));
        assert!(output.contains("ANNO_DUPLICATE_FIELD"));
    }

    #[test]
    fn test_explain_deterministic() {
        let (parent, relation) = setup();
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

        let plan = planner.plan(&source, &[spec]).unwrap();
        let explain1 = format!("{}", ExplainPlan::from_plan(&plan));
        let explain2 = format!("{}", ExplainPlan::from_plan(&plan));
        assert_eq!(explain1, explain2);
    }
}
