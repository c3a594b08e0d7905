//! Annotated result sets
//!
//! The output of one annotation pass: parent rows plus their computed
//! virtual fields. Native and virtual fields read uniformly; filtering,
//! ordering, and paging all resolve against the materialized annotation,
//! never by reissuing per-row queries.
//!
//! Virtual field values are computed once per pass and immutable here;
//! a parent with no qualifying children carries null (0 for COUNT).

use serde_json::Value;
use std::collections::BTreeMap;

use crate::schema::EntitySchema;
use crate::source::{compare_values, Row};
use crate::spec::{Predicate, SortDirection};

use super::errors::{ResultError, ResultResult};

/// One parent row with its virtual fields
#[derive(Debug, Clone)]
pub struct AnnotatedRow {
    /// The parent row
    pub parent: Row,
    /// Virtual field name → computed value
    virtuals: BTreeMap<String, Value>,
}

impl AnnotatedRow {
    /// Creates an annotated row
    pub fn new(parent: Row, virtuals: BTreeMap<String, Value>) -> Self {
        Self { parent, virtuals }
    }

    /// Returns the parent key
    pub fn key(&self) -> &str {
        self.parent.key()
    }

    /// Returns a field value, virtual fields first.
    ///
    /// Virtual names cannot collide with native names (the planner
    /// rejects that), so precedence never changes a result.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.virtuals.get(name).or_else(|| self.parent.field(name))
    }

    /// Returns a virtual field value only
    pub fn virtual_field(&self, name: &str) -> Option<&Value> {
        self.virtuals.get(name)
    }
}

/// Parent rows plus computed virtual fields
#[derive(Debug, Clone)]
pub struct AnnotatedResultSet {
    rows: Vec<AnnotatedRow>,
    parent_schema: EntitySchema,
    virtual_names: Vec<String>,
}

impl AnnotatedResultSet {
    /// Creates a result set from one pass's output
    pub fn new(
        rows: Vec<AnnotatedRow>,
        parent_schema: EntitySchema,
        virtual_names: Vec<String>,
    ) -> Self {
        Self {
            rows,
            parent_schema,
            virtual_names,
        }
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows remain
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows
    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedRow> {
        self.rows.iter()
    }

    /// Returns the rows in order
    pub fn rows(&self) -> &[AnnotatedRow] {
        &self.rows
    }

    /// Returns the declared virtual field names
    pub fn virtual_names(&self) -> &[String] {
        &self.virtual_names
    }

    /// Checks whether a name is a native or virtual field
    fn knows_field(&self, name: &str) -> bool {
        self.parent_schema.has_field(name) || self.virtual_names.iter().any(|v| v == name)
    }

    /// Errors unless every referenced field is native or virtual
    fn validate_fields<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> ResultResult<()> {
        for field in fields {
            if !self.knows_field(field) {
                return Err(ResultError::unknown_field(field));
            }
        }
        Ok(())
    }

    /// Keeps rows matching the predicate over native ∪ virtual fields.
    ///
    /// Virtual comparisons operate on the values materialized by the
    /// pass; children are never re-queried.
    pub fn filter(mut self, predicate: &Predicate) -> ResultResult<Self> {
        self.validate_fields(predicate.fields())?;
        self.rows.retain(|row| predicate.eval(&|name| row.field(name)));
        Ok(self)
    }

    /// Sorts rows by a native or virtual field.
    ///
    /// Stable, with a final tie-break on parent key so repeated runs
    /// produce identical order.
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> ResultResult<Self> {
        self.validate_fields([field])?;
        self.rows.sort_by(|a, b| {
            let ordering = compare_values(a.field(field), b.field(field));
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.key().cmp(b.key()))
        });
        Ok(self)
    }

    /// Keeps at most `limit` rows starting at `offset`
    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        if offset >= self.rows.len() {
            self.rows.clear();
            return self;
        }
        self.rows.drain(..offset);
        self.rows.truncate(limit);
        self
    }
}
