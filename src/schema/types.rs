//! Entity schema definitions
//!
//! Every entity the engine touches has an explicit schema: a static mapping
//! from field name to type, validated when specs are constructed. There is
//! no runtime field resolution and no global registry; schemas are plain
//! values passed by the caller.
//!
//! Supported types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - bool: Boolean
//! - float: 64-bit floating point
//! - timestamp: RFC 3339 string (sorts lexicographically)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::{SchemaError, SchemaResult};

/// Supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// 64-bit floating point
    Float,
    /// RFC 3339 timestamp, stored as a string
    Timestamp,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Float => "float",
            FieldType::Timestamp => "timestamp",
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether field must be present and non-null
    pub required: bool,
}

impl FieldDef {
    /// Create a required string field
    pub fn required_string() -> Self {
        Self {
            field_type: FieldType::String,
            required: true,
        }
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self {
            field_type: FieldType::String,
            required: false,
        }
    }

    /// Create a required int field
    pub fn required_int() -> Self {
        Self {
            field_type: FieldType::Int,
            required: true,
        }
    }

    /// Create an optional int field
    pub fn optional_int() -> Self {
        Self {
            field_type: FieldType::Int,
            required: false,
        }
    }

    /// Create a required bool field
    pub fn required_bool() -> Self {
        Self {
            field_type: FieldType::Bool,
            required: true,
        }
    }

    /// Create an optional bool field
    pub fn optional_bool() -> Self {
        Self {
            field_type: FieldType::Bool,
            required: false,
        }
    }

    /// Create a required float field
    pub fn required_float() -> Self {
        Self {
            field_type: FieldType::Float,
            required: true,
        }
    }

    /// Create a required timestamp field
    pub fn required_timestamp() -> Self {
        Self {
            field_type: FieldType::Timestamp,
            required: true,
        }
    }

    /// Create an optional timestamp field
    pub fn optional_timestamp() -> Self {
        Self {
            field_type: FieldType::Timestamp,
            required: false,
        }
    }
}

/// Schema for one entity type (parent or child)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity type name
    pub name: String,
    /// Name of the unique key field
    pub key_field: String,
    /// Declared fields
    pub fields: HashMap<String, FieldDef>,
}

impl EntitySchema {
    /// Creates a new entity schema.
    ///
    /// The key field must be declared in `fields`.
    pub fn new(
        name: impl Into<String>,
        key_field: impl Into<String>,
        fields: HashMap<String, FieldDef>,
    ) -> SchemaResult<Self> {
        let name = name.into();
        let key_field = key_field.into();

        if name.is_empty() {
            return Err(SchemaError::invalid("Entity name must not be empty"));
        }
        if !fields.contains_key(&key_field) {
            return Err(SchemaError::invalid(format!(
                "Key field '{}' is not declared on entity '{}'",
                key_field, name
            )));
        }

        Ok(Self {
            name,
            key_field,
            fields,
        })
    }

    /// Checks if a field is declared
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the type of a declared field
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).map(|def| def.field_type)
    }

    /// Returns the field definition, or an unknown field error.
    ///
    /// This is the fail-fast check every spec constructor goes through.
    pub fn require_field(&self, field: &str) -> SchemaResult<&FieldDef> {
        self.fields
            .get(field)
            .ok_or_else(|| SchemaError::unknown_field(&self.name, field))
    }
}

/// A one-to-many relation from a parent entity to a child entity.
///
/// The foreign key is a declared child field holding the parent key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Child entity schema
    pub child: EntitySchema,
    /// Child field referencing the parent key
    pub foreign_key: String,
}

impl Relation {
    /// Creates a relation, validating the foreign key is declared.
    pub fn new(child: EntitySchema, foreign_key: impl Into<String>) -> SchemaResult<Self> {
        let foreign_key = foreign_key.into();
        child.require_field(&foreign_key)?;
        Ok(Self { child, foreign_key })
    }

    /// Returns the child entity name
    pub fn child_entity(&self) -> &str {
        &self.child.name
    }
}
