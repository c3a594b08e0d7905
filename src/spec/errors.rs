//! Spec error types
//!
//! Error codes:
//! - ANNO_UNKNOWN_FIELD (REJECT)
//! - ANNO_SPEC_INVALID (REJECT)
//!
//! Specs fail at construction, never at execution.

use std::fmt;

use crate::schema::SchemaError;

/// Severity levels for spec errors
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

/// Spec-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecErrorCode {
    /// Spec references a field absent from the entity schema
    AnnoUnknownField,
    /// Malformed spec declaration
    AnnoSpecInvalid,
}

impl SpecErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SpecErrorCode::AnnoUnknownField => "ANNO_UNKNOWN_FIELD",
            SpecErrorCode::AnnoSpecInvalid => "ANNO_SPEC_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SpecErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Spec error type with full context
#[derive(Debug, Clone)]
pub struct SpecError {
    /// Error code
    code: SpecErrorCode,
    /// Human-readable message
    message: String,
    /// Field name if applicable
    field: Option<String>,
}

impl SpecError {
    /// Create an unknown field error
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: SpecErrorCode::AnnoUnknownField,
            message: format!("Field '{}' is not declared on entity '{}'", f, entity.into()),
            field: Some(f),
        }
    }

    /// Create an invalid spec error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: SpecErrorCode::AnnoSpecInvalid,
            message: reason.into(),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SpecErrorCode {
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

impl From<SchemaError> for SpecError {
    fn from(err: SchemaError) -> Self {
        let code = match err.code() {
            crate::schema::SchemaErrorCode::AnnoUnknownField => SpecErrorCode::AnnoUnknownField,
            crate::schema::SchemaErrorCode::AnnoSchemaInvalid => SpecErrorCode::AnnoSpecInvalid,
        };
        Self {
            code,
            message: err.message().to_string(),
            field: err.field().map(str::to_string),
        }
    }
}

impl fmt::Display for SpecError {
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

impl std::error::Error for SpecError {}

/// Result type for spec operations
pub type SpecResult<T> = Result<T, SpecError>;
