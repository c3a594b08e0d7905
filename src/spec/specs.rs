//! Annotation spec declarations
//!
//! Two kinds of virtual field can be attached to a parent entity:
//!
//! - `AggregateSpec`: an aggregate function (MIN/MAX/COUNT/SUM) over one
//!   child field, restricted by a predicate.
//! - `CorrelatedSpec`: pick the single child row that ranks first under an
//!   ordering rule among rows matching a predicate, then project one field
//!   from it.
//!
//! Specs are pure declarations, stateless and serializable. Every field
//! reference is validated against the child schema at construction.

use serde::{Deserialize, Serialize};

use crate::schema::EntitySchema;

use super::errors::{SpecError, SpecResult};
use super::predicate::Predicate;

/// Aggregate function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    /// Smallest value of the field among matching rows
    Min,
    /// Largest value of the field among matching rows
    Max,
    /// Number of matching rows with a non-null field value
    Count,
    /// Sum of the field over matching rows
    Sum,
}

impl AggregateFunction {
    /// Returns the function name for explain output
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Ordering rule for picking the winning child row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to order by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Declares an aggregate-derived virtual field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    /// Virtual field name on the parent
    pub name: String,
    /// Aggregate function
    pub function: AggregateFunction,
    /// Child field the function reduces over
    pub field: String,
    /// Restriction on candidate child rows
    pub filter: Option<Predicate>,
}

impl AggregateSpec {
    /// Creates an aggregate spec, validating every field reference
    /// against the child schema.
    pub fn new(
        name: impl Into<String>,
        function: AggregateFunction,
        field: impl Into<String>,
        filter: Option<Predicate>,
        child: &EntitySchema,
    ) -> SpecResult<Self> {
        let name = name.into();
        let field = field.into();

        if name.is_empty() {
            return Err(SpecError::invalid("Virtual field name must not be empty"));
        }
        child.require_field(&field)?;
        if let Some(pred) = &filter {
            validate_predicate(pred, child)?;
        }

        Ok(Self {
            name,
            function,
            field,
            filter,
        })
    }
}

/// Declares a correlated top-1 projection virtual field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedSpec {
    /// Virtual field name on the parent
    pub name: String,
    /// Restriction on candidate child rows
    pub filter: Option<Predicate>,
    /// Ordering rule picking the winning row per parent
    pub order_by: OrderBy,
    /// Field projected from the winning row
    pub project: String,
}

impl CorrelatedSpec {
    /// Creates a correlated spec, validating every field reference
    /// against the child schema.
    pub fn new(
        name: impl Into<String>,
        filter: Option<Predicate>,
        order_by: OrderBy,
        project: impl Into<String>,
        child: &EntitySchema,
    ) -> SpecResult<Self> {
        let name = name.into();
        let project = project.into();

        if name.is_empty() {
            return Err(SpecError::invalid("Virtual field name must not be empty"));
        }
        child.require_field(&order_by.field)?;
        child.require_field(&project)?;
        if let Some(pred) = &filter {
            validate_predicate(pred, child)?;
        }

        Ok(Self {
            name,
            filter,
            order_by,
            project,
        })
    }
}

/// Either kind of annotation spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "spec", rename_all = "lowercase")]
pub enum AnnotationSpec {
    /// Aggregate-derived virtual field
    Aggregate(AggregateSpec),
    /// Correlated top-1 projection
    Correlated(CorrelatedSpec),
}

impl AnnotationSpec {
    /// Returns the virtual field name this spec produces
    pub fn name(&self) -> &str {
        match self {
            AnnotationSpec::Aggregate(s) => &s.name,
            AnnotationSpec::Correlated(s) => &s.name,
        }
    }

    /// Returns the spec kind for explain output
    pub fn kind(&self) -> &'static str {
        match self {
            AnnotationSpec::Aggregate(_) => "aggregate",
            AnnotationSpec::Correlated(_) => "correlated",
        }
    }

    /// Returns the candidate row restriction, if any
    pub fn filter(&self) -> Option<&Predicate> {
        match self {
            AnnotationSpec::Aggregate(s) => s.filter.as_ref(),
            AnnotationSpec::Correlated(s) => s.filter.as_ref(),
        }
    }
}

impl From<AggregateSpec> for AnnotationSpec {
    fn from(spec: AggregateSpec) -> Self {
        AnnotationSpec::Aggregate(spec)
    }
}

impl From<CorrelatedSpec> for AnnotationSpec {
    fn from(spec: CorrelatedSpec) -> Self {
        AnnotationSpec::Correlated(spec)
    }
}

/// Validates every field a predicate references against a schema
pub fn validate_predicate(pred: &Predicate, schema: &EntitySchema) -> SpecResult<()> {
    for field in pred.fields() {
        schema.require_field(field)?;
    }
    Ok(())
}
