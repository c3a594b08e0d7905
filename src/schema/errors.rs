//! Schema error types
//!
//! Error codes:
//! - ANNO_UNKNOWN_FIELD (REJECT)
//! - ANNO_SCHEMA_INVALID (REJECT)
//!
//! All schema errors surface at construction time, never during an
//! annotation pass.

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller input rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Field not declared in the entity schema
    AnnoUnknownField,
    /// Malformed schema definition
    AnnoSchemaInvalid,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::AnnoUnknownField => "ANNO_UNKNOWN_FIELD",
            SchemaErrorCode::AnnoSchemaInvalid => "ANNO_SCHEMA_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Field name if applicable
    field: Option<String>,
}

impl SchemaError {
    /// Create an unknown field error
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: SchemaErrorCode::AnnoUnknownField,
            message: format!("Field '{}' is not declared on entity '{}'", f, entity.into()),
            field: Some(f),
        }
    }

    /// Create an invalid schema error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::AnnoSchemaInvalid,
            message: reason.into(),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::AnnoUnknownField.code(), "ANNO_UNKNOWN_FIELD");
        assert_eq!(SchemaErrorCode::AnnoSchemaInvalid.code(), "ANNO_SCHEMA_INVALID");
    }

    #[test]
    fn test_unknown_field_display() {
        let err = SchemaError::unknown_field("concert", "start_tmie");
        let display = format!("{}", err);
        assert!(display.contains("ANNO_UNKNOWN_FIELD"));
        assert!(display.contains("start_tmie"));
        assert!(display.contains("REJECT"));
        assert_eq!(err.field(), Some("start_tmie"));
    }
}
