//! Row value model
//!
//! Rows carry a string key and a JSON object body. Parent and child rows
//! share the same shape; the child body holds the parent key in a declared
//! foreign-key field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A single row from a tabular source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Unique row key
    pub key: String,
    /// Row body as a JSON object
    pub body: Value,
}

impl Row {
    /// Creates a new row
    pub fn new(key: impl Into<String>, body: Value) -> Self {
        Self {
            key: key.into(),
            body,
        }
    }

    /// Returns the row key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns a field value from the body
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Returns the field rendered as a grouping key string.
    ///
    /// Strings are used as-is; numbers and bools via their canonical text
    /// form. Null, missing, and structured values have no key.
    pub fn key_string(&self, field: &str) -> Option<String> {
        match self.field(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Compares two optional field values for sorting and ranking.
///
/// Ordering rules:
/// - absent < null < bool < number < string
/// - For same types, natural ordering
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            // Compare by type first
            let type_order = |v: &Value| -> u8 {
                match v {
                    Value::Null => 0,
                    Value::Bool(_) => 1,
                    Value::Number(_) => 2,
                    Value::String(_) => 3,
                    Value::Array(_) => 4,
                    Value::Object(_) => 5,
                }
            };

            let a_type = type_order(a_val);
            let b_type = type_order(b_val);

            if a_type != b_type {
                return a_type.cmp(&b_type);
            }

            // Same type, compare values
            match (a_val, b_val) {
                (Value::Null, Value::Null) => Ordering::Equal,
                (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                (Value::Number(a_n), Value::Number(b_n)) => {
                    if let (Some(ai), Some(bi)) = (a_n.as_i64(), b_n.as_i64()) {
                        return ai.cmp(&bi);
                    }
                    let a_f = a_n.as_f64().unwrap_or(0.0);
                    let b_f = b_n.as_f64().unwrap_or(0.0);
                    a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                }
                (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                _ => Ordering::Equal, // Arrays and objects not compared
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_field_access() {
        let row = Row::new("c1", json!({"id": "c1", "start": "2025-01-10T00:00:00Z"}));
        assert_eq!(row.key(), "c1");
        assert_eq!(row.field("start"), Some(&json!("2025-01-10T00:00:00Z")));
        assert_eq!(row.field("venue"), None);
    }

    #[test]
    fn test_key_string_rendering() {
        let row = Row::new("c1", json!({"tour_id": "t1", "rank": 3, "sold_out": true, "note": null}));
        assert_eq!(row.key_string("tour_id"), Some("t1".to_string()));
        assert_eq!(row.key_string("rank"), Some("3".to_string()));
        assert_eq!(row.key_string("sold_out"), Some("true".to_string()));
        assert_eq!(row.key_string("note"), None);
        assert_eq!(row.key_string("missing"), None);
    }

    #[test]
    fn test_compare_values_ordering() {
        assert_eq!(
            compare_values(Some(&json!(1)), Some(&json!(2))),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Some(&json!("b")), Some(&json!("a"))),
            Ordering::Greater
        );
        assert_eq!(compare_values(None, Some(&json!(0))), Ordering::Less);
        assert_eq!(
            compare_values(Some(&Value::Null), Some(&json!(false))),
            Ordering::Less
        );
    }

    #[test]
    fn test_integer_comparison_is_exact() {
        // Large i64 values that would collide as f64
        let a = json!(9_007_199_254_740_993_i64);
        let b = json!(9_007_199_254_740_992_i64);
        assert_eq!(compare_values(Some(&a), Some(&b)), Ordering::Greater);
    }
}
