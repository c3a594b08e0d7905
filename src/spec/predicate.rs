//! Predicates over entity fields
//!
//! A predicate is a boolean condition built from leaf comparisons combined
//! with AND/OR. Evaluation is strict, matching the filter rules the rest of
//! the engine relies on: no type coercion, and a missing field or JSON null
//! never matches any comparison (including `!=`).
//!
//! Predicates serialize with serde so a row source can translate them into
//! its own filter mechanism and so the cache can fingerprint spec sets.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operators for leaf predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    /// Equality: field = value
    Eq,
    /// Inequality: field != value
    Ne,
    /// Less than: field < value
    Lt,
    /// Less than or equal: field <= value
    Lte,
    /// Greater than: field > value
    Gt,
    /// Greater than or equal: field >= value
    Gte,
}

impl CompareOp {
    /// Returns the operator name for explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
        }
    }
}

/// A boolean condition over entity fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Predicate {
    /// Leaf comparison: field op literal
    Compare {
        /// Field name
        field: String,
        /// Comparison operator
        op: CompareOp,
        /// Literal to compare against
        value: Value,
    },
    /// All sub-predicates must match
    And {
        /// Sub-predicates
        children: Vec<Predicate>,
    },
    /// At least one sub-predicate must match
    Or {
        /// Sub-predicates
        children: Vec<Predicate>,
    },
}

impl Predicate {
    /// Create an equality predicate
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Create an inequality predicate
    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// Create a less-than predicate
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// Create a less-than-or-equal predicate
    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    /// Create a greater-than predicate
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// Create a greater-than-or-equal predicate
    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// Create a leaf comparison
    pub fn compare(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value,
        }
    }

    /// Combine with another predicate under AND
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And { mut children } => {
                children.push(other);
                Predicate::And { children }
            }
            first => Predicate::And {
                children: vec![first, other],
            },
        }
    }

    /// Combine with another predicate under OR
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Or { mut children } => {
                children.push(other);
                Predicate::Or { children }
            }
            first => Predicate::Or {
                children: vec![first, other],
            },
        }
    }

    /// Collects every field name referenced by this predicate
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Compare { field, .. } => out.push(field),
            Predicate::And { children } | Predicate::Or { children } => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }

    /// Evaluates this predicate against a row body (JSON object)
    pub fn matches(&self, body: &Value) -> bool {
        self.eval(&|field| body.get(field))
    }

    /// Evaluates this predicate with an arbitrary field lookup.
    ///
    /// Used by the result set, where a name may resolve to either a native
    /// or a virtual field.
    pub fn eval<'a>(&self, get: &dyn Fn(&str) -> Option<&'a Value>) -> bool {
        match self {
            Predicate::Compare { field, op, value } => {
                let actual = match get(field) {
                    Some(v) => v,
                    None => return false, // Missing field = no match
                };
                // Null values never match
                if actual.is_null() {
                    return false;
                }
                Self::compare_match(actual, *op, value)
            }
            Predicate::And { children } => children.iter().all(|c| c.eval(get)),
            Predicate::Or { children } => children.iter().any(|c| c.eval(get)),
        }
    }

    /// Applies a single comparison (no coercion)
    fn compare_match(actual: &Value, op: CompareOp, expected: &Value) -> bool {
        match op {
            CompareOp::Eq => actual == expected,
            CompareOp::Ne => actual != expected,
            CompareOp::Lt => Self::ordered(actual, expected)
                .map(|o| o == Ordering::Less)
                .unwrap_or(false),
            CompareOp::Lte => Self::ordered(actual, expected)
                .map(|o| o != Ordering::Greater)
                .unwrap_or(false),
            CompareOp::Gt => Self::ordered(actual, expected)
                .map(|o| o == Ordering::Greater)
                .unwrap_or(false),
            CompareOp::Gte => Self::ordered(actual, expected)
                .map(|o| o != Ordering::Less)
                .unwrap_or(false),
        }
    }

    /// Orders two same-typed scalar values; mixed types do not order
    fn ordered(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Number(an), Value::Number(bn)) => {
                if let (Some(ai), Some(bi)) = (an.as_i64(), bn.as_i64()) {
                    return Some(ai.cmp(&bi));
                }
                let (af, bf) = (an.as_f64()?, bn.as_f64()?);
                af.partial_cmp(&bf)
            }
            (Value::String(a_s), Value::String(b_s)) => Some(a_s.cmp(b_s)),
            _ => None,
        }
    }
}
