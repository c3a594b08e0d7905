//! Result set error types
//!
//! Error codes:
//! - ANNO_UNKNOWN_FIELD (REJECT)
//!
//! Filtering or ordering by a name that is neither a native parent field
//! nor a declared virtual field is rejected; it never falls through to a
//! per-row query.

use std::fmt;

/// Severity levels for result set errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Result-set-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultErrorCode {
    /// Field is neither native nor a declared virtual field
    AnnoUnknownField,
}

impl ResultErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ResultErrorCode::AnnoUnknownField => "ANNO_UNKNOWN_FIELD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ResultErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Result set error type
#[derive(Debug, Clone)]
pub struct ResultError {
    /// Error code
    code: ResultErrorCode,
    /// Human-readable message
    message: String,
    /// Field name
    field: String,
}

impl ResultError {
    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: ResultErrorCode::AnnoUnknownField,
            message: format!(
                "Field '{}' is neither a native parent field nor a virtual field",
                f
            ),
            field: f,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ResultErrorCode {
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

    /// Returns the offending field name
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for ResultError {
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

impl std::error::Error for ResultError {}

/// Result type for result set operations
pub type ResultResult<T> = Result<T, ResultError>;
