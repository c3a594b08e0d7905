//! In-process grouping, ranking, and aggregation over rows
//!
//! Building blocks shared by the in-memory adapter and the executor's
//! degraded scan path. Any adapter whose backing store lacks a native
//! partition-rank primitive can reuse these to honor the contract.
//!
//! Determinism: winner selection uses a total order (sort field under the
//! requested direction, then ascending row key on ties), so the result is
//! independent of input iteration order.

use serde_json::Value;
use std::collections::HashMap;

use crate::spec::{AggregateFunction, OrderBy, SortDirection};

use super::row::{compare_values, Row};

/// Selects the rank-1 row per partition under the ordering rule.
///
/// Rows with no usable partition key are skipped. On equal sort keys, the
/// row with the smaller key wins.
pub fn select_winners(rows: &[Row], partition_key: &str, order_by: &OrderBy) -> HashMap<String, Row> {
    let mut winners: HashMap<String, Row> = HashMap::new();

    for row in rows {
        let group = match row.key_string(partition_key) {
            Some(g) => g,
            None => continue,
        };

        match winners.get(&group) {
            Some(current) if !beats(row, current, order_by) => {}
            _ => {
                winners.insert(group, row.clone());
            }
        }
    }

    winners
}

/// Returns true if `candidate` ranks before `current`
fn beats(candidate: &Row, current: &Row, order_by: &OrderBy) -> bool {
    let ordering = compare_values(
        candidate.field(&order_by.field),
        current.field(&order_by.field),
    );
    let ordering = match order_by.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };

    match ordering {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        // Deterministic tie-break: smaller row key wins
        std::cmp::Ordering::Equal => candidate.key < current.key,
    }
}

/// Reduces rows per group with an aggregate function over one field.
///
/// Rows with a missing or null field value do not contribute. Groups with
/// no contributing rows are absent from the result; the join layer turns
/// absence into null (or 0 for COUNT).
pub fn group_aggregate_rows(
    rows: &[Row],
    group_key: &str,
    function: AggregateFunction,
    field: &str,
) -> HashMap<String, Value> {
    let mut groups: HashMap<String, Vec<&Value>> = HashMap::new();

    for row in rows {
        let group = match row.key_string(group_key) {
            Some(g) => g,
            None => continue,
        };
        let value = match row.field(field) {
            Some(v) if !v.is_null() => v,
            _ => continue,
        };
        groups.entry(group).or_default().push(value);
    }

    groups
        .into_iter()
        .filter_map(|(group, values)| reduce(function, &values).map(|v| (group, v)))
        .collect()
}

/// Applies one aggregate function to a non-empty value list
fn reduce(function: AggregateFunction, values: &[&Value]) -> Option<Value> {
    match function {
        AggregateFunction::Count => Some(Value::from(values.len() as i64)),
        AggregateFunction::Min => values
            .iter()
            .copied()
            .min_by(|a, b| compare_values(Some(a), Some(b)))
            .cloned(),
        AggregateFunction::Max => values
            .iter()
            .copied()
            .max_by(|a, b| compare_values(Some(a), Some(b)))
            .cloned(),
        AggregateFunction::Sum => sum_values(values),
    }
}

/// Sums numeric values; integer arithmetic unless a float appears
fn sum_values(values: &[&Value]) -> Option<Value> {
    let mut int_sum: i64 = 0;
    let mut float_sum: f64 = 0.0;
    let mut saw_float = false;
    let mut saw_any = false;

    for value in values {
        let n = match value {
            Value::Number(n) => n,
            _ => continue, // Non-numeric values do not contribute
        };
        saw_any = true;
        if let Some(i) = n.as_i64() {
            int_sum = int_sum.wrapping_add(i);
            float_sum += i as f64;
        } else if let Some(f) = n.as_f64() {
            saw_float = true;
            float_sum += f;
        }
    }

    if !saw_any {
        return None;
    }
    if saw_float {
        Some(Value::from(float_sum))
    } else {
        Some(Value::from(int_sum))
    }
}
