//! Annotation Pass Invariant Tests
//!
//! Tests must prove that the core pass invariants hold:
//! 1. Round trips are bounded by the spec count, never the parent count
//! 2. Zero qualifying children yield null (0 for COUNT), never a missing
//!    field
//! 3. A failure aborts the whole pass; no partial annotation escapes
//! 4. The degraded scan path yields the same values as the native path
//! 5. Repeated passes over the same data yield identical results

use serde_json::{json, Value};
use std::collections::HashMap;

use annodb::annotator::{Annotator, AnnotatorConfig};
use annodb::planner::FallbackPolicy;
use annodb::schema::{EntitySchema, FieldDef, Relation};
use annodb::source::{MemoryRowSource, Row};
use annodb::spec::{
    AggregateFunction, AggregateSpec, AnnotationSpec, CorrelatedSpec, OrderBy, Predicate,
};

// =============================================================================
// FIXTURES: tours (parents) and concerts (children)
// =============================================================================

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
    fields.insert("attendance".to_string(), FieldDef::optional_int());
    let child = EntitySchema::new("concert", "id", fields).unwrap();
    Relation::new(child, "tour_id").unwrap()
}

fn concert(key: &str, tour: &str, start: &str, tix: bool) -> Row {
    Row::new(
        key,
        json!({"id": key, "tour_id": tour, "start": start, "tix": tix}),
    )
}

fn tour(key: &str, band: &str) -> Row {
    Row::new(key, json!({"id": key, "band": band}))
}

fn seeded_source() -> MemoryRowSource {
    MemoryRowSource::new().with_table(
        "concert",
        vec![
            concert("c1", "t1", "2025-01-10T00:00:00Z", false),
            concert("c2", "t1", "2025-02-01T00:00:00Z", true),
            concert("c3", "t3", "2025-03-01T00:00:00Z", false),
        ],
    )
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

// =============================================================================
// UPCOMING-CONCERT SCENARIO
// =============================================================================

/// Test: a tour with concerts on both sides of the reference instant gets
/// the earliest upcoming start and that concert's ticket flag; a tour with
/// no upcoming concerts gets nulls.
#[test]
fn test_upcoming_concert_annotation() {
    let relation = concert_relation();
    let annotator = Annotator::new(seeded_source(), tour_schema(), concert_relation());

    let parents = vec![tour("t1", "Alpha"), tour("t2", "Beta")];
    let result = annotator
        .annotate(&parents, &upcoming_specs(&relation))
        .unwrap();

    let t1 = &result.rows()[0];
    assert_eq!(
        t1.field("next_concert_start"),
        Some(&json!("2025-02-01T00:00:00Z"))
    );
    assert_eq!(t1.field("tix_status"), Some(&json!(true)));

    let t2 = &result.rows()[1];
    assert_eq!(t2.field("next_concert_start"), Some(&json!(null)));
    assert_eq!(t2.field("tix_status"), Some(&json!(null)));
}

/// Test: the correlated projection follows the winning row, not any
/// aggregate over the field. The earliest upcoming concert has tix=true
/// even though an earlier (past) concert has tix=false.
#[test]
fn test_correlated_projection_tracks_winning_row() {
    let relation = concert_relation();
    let annotator = Annotator::new(seeded_source(), tour_schema(), concert_relation());

    // No filter: the overall earliest concert for t1 is c1 (tix=false)
    let spec: AnnotationSpec = CorrelatedSpec::new(
        "first_tix",
        None,
        OrderBy::asc("start"),
        "tix",
        &relation.child,
    )
    .unwrap()
    .into();

    let result = annotator.annotate(&[tour("t1", "Alpha")], &[spec]).unwrap();
    assert_eq!(result.rows()[0].field("first_tix"), Some(&json!(false)));
}

// =============================================================================
// ROUND-TRIP BOUNDEDNESS
// =============================================================================

/// Test: annotating many parents costs the same number of source
/// operations as annotating one. One operation per spec, independent of
/// parent count.
#[test]
fn test_round_trips_bounded_by_spec_count() {
    let relation = concert_relation();
    let annotator = Annotator::new(seeded_source(), tour_schema(), concert_relation());

    let parents: Vec<Row> = (0..250)
        .map(|i| tour(&format!("t{}", i), "Band"))
        .collect();

    annotator
        .annotate(&parents, &upcoming_specs(&relation))
        .unwrap();

    let ops = annotator.source().ops();
    assert_eq!(ops.total(), 2);
    assert_eq!(ops.group_aggregates, 1);
    assert_eq!(ops.partition_rank_selects, 1);
    assert_eq!(ops.scans, 0);
}

/// Test: a batch-capable source computes the whole spec set in exactly
/// one operation.
#[test]
fn test_batched_source_single_round_trip() {
    let relation = concert_relation();
    let source = seeded_source().with_batch();
    let annotator = Annotator::new(source, tour_schema(), concert_relation());

    let parents = vec![tour("t1", "Alpha"), tour("t2", "Beta")];
    let result = annotator
        .annotate(&parents, &upcoming_specs(&relation))
        .unwrap();

    assert_eq!(annotator.source().ops().total(), 1);
    assert_eq!(annotator.source().ops().batch_annotates, 1);

    // Same values as the unbatched pass
    let t1 = &result.rows()[0];
    assert_eq!(
        t1.field("next_concert_start"),
        Some(&json!("2025-02-01T00:00:00Z"))
    );
    assert_eq!(t1.field("tix_status"), Some(&json!(true)));
}

// =============================================================================
// ZERO-CHILDREN AND NULL SEMANTICS
// =============================================================================

/// Test: COUNT over zero qualifying rows is 0; MIN/MAX/SUM and correlated
/// projections are null. The virtual field itself is always present.
#[test]
fn test_zero_children_defaults() {
    let relation = concert_relation();
    let annotator = Annotator::new(seeded_source(), tour_schema(), concert_relation());

    let specs: Vec<AnnotationSpec> = vec![
        AggregateSpec::new(
            "concert_count",
            AggregateFunction::Count,
            "id",
            None,
            &relation.child,
        )
        .unwrap()
        .into(),
        AggregateSpec::new(
            "first_start",
            AggregateFunction::Min,
            "start",
            None,
            &relation.child,
        )
        .unwrap()
        .into(),
        AggregateSpec::new(
            "total_attendance",
            AggregateFunction::Sum,
            "attendance",
            None,
            &relation.child,
        )
        .unwrap()
        .into(),
    ];

    let result = annotator.annotate(&[tour("t9", "Nobody")], &specs).unwrap();
    let row = &result.rows()[0];

    assert_eq!(row.field("concert_count"), Some(&json!(0)));
    assert_eq!(row.field("first_start"), Some(&json!(null)));
    assert_eq!(row.field("total_attendance"), Some(&json!(null)));
}

/// Test: COUNT counts rows whose field is non-null; rows where the field
/// is null or missing do not contribute.
#[test]
fn test_count_skips_null_fields() {
    let relation = concert_relation();
    let source = MemoryRowSource::new().with_table(
        "concert",
        vec![
            Row::new(
                "c1",
                json!({"id": "c1", "tour_id": "t1", "start": "2025-01-10T00:00:00Z", "tix": true, "attendance": 500}),
            ),
            Row::new(
                "c2",
                json!({"id": "c2", "tour_id": "t1", "start": "2025-02-01T00:00:00Z", "tix": true, "attendance": null}),
            ),
            Row::new(
                "c3",
                json!({"id": "c3", "tour_id": "t1", "start": "2025-03-01T00:00:00Z", "tix": true}),
            ),
        ],
    );
    let annotator = Annotator::new(source, tour_schema(), concert_relation());

    let spec: AnnotationSpec = AggregateSpec::new(
        "attended_count",
        AggregateFunction::Count,
        "attendance",
        None,
        &relation.child,
    )
    .unwrap()
    .into();

    let result = annotator.annotate(&[tour("t1", "Alpha")], &[spec]).unwrap();
    assert_eq!(result.rows()[0].field("attended_count"), Some(&json!(1)));
}

/// Test: a null or missing child field never satisfies a predicate, not
/// even `!=`.
#[test]
fn test_null_never_matches_predicates() {
    let relation = concert_relation();
    let source = MemoryRowSource::new().with_table(
        "concert",
        vec![Row::new(
            "c1",
            json!({"id": "c1", "tour_id": "t1", "start": "2025-01-10T00:00:00Z", "tix": true, "attendance": null}),
        )],
    );
    let annotator = Annotator::new(source, tour_schema(), concert_relation());

    let spec: AnnotationSpec = AggregateSpec::new(
        "odd_count",
        AggregateFunction::Count,
        "id",
        Some(Predicate::ne("attendance", json!(100))),
        &relation.child,
    )
    .unwrap()
    .into();

    let result = annotator.annotate(&[tour("t1", "Alpha")], &[spec]).unwrap();
    assert_eq!(result.rows()[0].field("odd_count"), Some(&json!(0)));
}

// =============================================================================
// WHOLE-PASS ABORT
// =============================================================================

/// Test: if any spec's operation fails, the pass returns an error naming
/// the failing spec. No result set with partial annotations is produced.
#[test]
fn test_failure_aborts_whole_pass() {
    let relation = concert_relation();
    // "concert" table missing: every operation against it fails
    let source = MemoryRowSource::new();
    let annotator = Annotator::new(source, tour_schema(), concert_relation());

    let err = annotator
        .annotate(&[tour("t1", "Alpha")], &upcoming_specs(&relation))
        .unwrap_err();

    assert_eq!(err.code(), "ANNO_SOURCE_FAILED");
    assert_eq!(err.spec(), Some("next_concert_start"));
    assert!(!err.retryable());
}

/// Test: a deadline of zero surfaces as a retryable timeout, never as a
/// partial result.
#[test]
fn test_timeout_is_retryable() {
    let relation = concert_relation();
    let config = AnnotatorConfig {
        timeout: Some(std::time::Duration::ZERO),
        ..AnnotatorConfig::default()
    };
    let annotator =
        Annotator::with_config(seeded_source(), tour_schema(), concert_relation(), config);

    let err = annotator
        .annotate(&[tour("t1", "Alpha")], &upcoming_specs(&relation))
        .unwrap_err();

    assert_eq!(err.code(), "ANNO_SOURCE_TIMEOUT");
    assert!(err.retryable());
}

// =============================================================================
// DEGRADED PATH EQUIVALENCE
// =============================================================================

/// Test: when the source cannot rank natively and the fallback is
/// permitted, the scan-and-rank path produces exactly the values the
/// native path would.
#[test]
fn test_degraded_path_matches_native_path() {
    let relation = concert_relation();
    let parents = vec![tour("t1", "Alpha"), tour("t2", "Beta"), tour("t3", "Gamma")];
    let specs = upcoming_specs(&relation);

    let native = Annotator::new(seeded_source(), tour_schema(), concert_relation())
        .annotate(&parents, &specs)
        .unwrap();

    let config = AnnotatorConfig {
        fallback: FallbackPolicy::AllowScan,
        ..AnnotatorConfig::default()
    };
    let degraded_source = seeded_source().without_partition_rank();
    let annotator =
        Annotator::with_config(degraded_source, tour_schema(), concert_relation(), config);
    let degraded = annotator.annotate(&parents, &specs).unwrap();

    // Fallback used one scan instead of one rank operation
    assert_eq!(annotator.source().ops().scans, 1);
    assert_eq!(annotator.source().ops().partition_rank_selects, 0);

    for (a, b) in native.iter().zip(degraded.iter()) {
        assert_eq!(a.key(), b.key());
        for name in ["next_concert_start", "tix_status"] {
            assert_eq!(a.field(name), b.field(name));
        }
    }
}

/// Test: without the fallback policy, a rank-incapable source is rejected
/// at plan time, before any round trip.
#[test]
fn test_fallback_denied_by_default() {
    let relation = concert_relation();
    let source = seeded_source().without_partition_rank();
    let annotator = Annotator::new(source, tour_schema(), concert_relation());

    let err = annotator
        .annotate(&[tour("t1", "Alpha")], &upcoming_specs(&relation))
        .unwrap_err();

    assert_eq!(err.code(), "ANNO_CAPABILITY_UNSUPPORTED");
    assert_eq!(annotator.source().ops().total(), 0);
}

// =============================================================================
// DETERMINISM
// =============================================================================

/// Test: repeated passes over identical data produce identical rows and
/// values.
#[test]
fn test_repeated_passes_identical() {
    let relation = concert_relation();
    let annotator = Annotator::new(seeded_source(), tour_schema(), concert_relation());
    let parents = vec![tour("t1", "Alpha"), tour("t2", "Beta"), tour("t3", "Gamma")];
    let specs = upcoming_specs(&relation);

    let first = annotator.annotate(&parents, &specs).unwrap();
    let second = annotator.annotate(&parents, &specs).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.key(), b.key());
        for name in ["next_concert_start", "tix_status"] {
            assert_eq!(a.field(name), b.field(name));
        }
    }
}

/// Test: when two children tie on the ordering field, the one with the
/// smaller row key wins, on both the native and the degraded path.
#[test]
fn test_tie_break_on_child_key() {
    let relation = concert_relation();
    let tied_rows = || {
        vec![
            Row::new(
                "c9",
                json!({"id": "c9", "tour_id": "t1", "start": "2025-02-01T00:00:00Z", "tix": false}),
            ),
            Row::new(
                "c2",
                json!({"id": "c2", "tour_id": "t1", "start": "2025-02-01T00:00:00Z", "tix": true}),
            ),
        ]
    };
    let spec = |relation: &Relation| -> AnnotationSpec {
        CorrelatedSpec::new(
            "winner_tix",
            None,
            OrderBy::asc("start"),
            "tix",
            &relation.child,
        )
        .unwrap()
        .into()
    };

    let native = Annotator::new(
        MemoryRowSource::new().with_table("concert", tied_rows()),
        tour_schema(),
        concert_relation(),
    );
    let result = native
        .annotate(&[tour("t1", "Alpha")], &[spec(&relation)])
        .unwrap();
    assert_eq!(result.rows()[0].field("winner_tix"), Some(&json!(true)));

    let config = AnnotatorConfig {
        fallback: FallbackPolicy::AllowScan,
        ..AnnotatorConfig::default()
    };
    let degraded = Annotator::with_config(
        MemoryRowSource::new()
            .with_table("concert", tied_rows())
            .without_partition_rank(),
        tour_schema(),
        concert_relation(),
        config,
    );
    let result = degraded
        .annotate(&[tour("t1", "Alpha")], &[spec(&relation)])
        .unwrap();
    assert_eq!(result.rows()[0].field("winner_tix"), Some(&json!(true)));
}

// =============================================================================
// SUM SEMANTICS
// =============================================================================

/// Test: SUM stays an integer while every contributing value is an
/// integer.
#[test]
fn test_sum_integer_exact() {
    let relation = concert_relation();
    let source = MemoryRowSource::new().with_table(
        "concert",
        vec![
            Row::new(
                "c1",
                json!({"id": "c1", "tour_id": "t1", "start": "2025-01-10T00:00:00Z", "tix": true, "attendance": 400}),
            ),
            Row::new(
                "c2",
                json!({"id": "c2", "tour_id": "t1", "start": "2025-02-01T00:00:00Z", "tix": true, "attendance": 350}),
            ),
        ],
    );
    let annotator = Annotator::new(source, tour_schema(), concert_relation());

    let spec: AnnotationSpec = AggregateSpec::new(
        "total_attendance",
        AggregateFunction::Sum,
        "attendance",
        None,
        &relation.child,
    )
    .unwrap()
    .into();

    let result = annotator.annotate(&[tour("t1", "Alpha")], &[spec]).unwrap();
    let value = result.rows()[0].field("total_attendance").unwrap();
    assert_eq!(value, &Value::from(750i64));
    assert!(value.is_i64());
}
