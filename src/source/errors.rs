//! Row source error types
//!
//! Error codes:
//! - ANNO_SOURCE_TIMEOUT (ERROR, retryable)
//! - ANNO_SOURCE_FAILED (ERROR, not retried)
//! - ANNO_CAPABILITY_UNSUPPORTED (REJECT)
//!
//! A timeout is retryable; an opaque storage failure is surfaced unchanged
//! and never retried automatically. Partial results are never returned.

use std::fmt;

/// Severity levels for source errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected
    Reject,
    /// Operation failed but the source is healthy
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Source-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorCode {
    /// Deadline exceeded at the row source boundary
    AnnoSourceTimeout,
    /// Opaque underlying storage failure
    AnnoSourceFailed,
    /// Source lacks a required primitive and no fallback is permitted
    AnnoCapabilityUnsupported,
}

impl SourceErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SourceErrorCode::AnnoSourceTimeout => "ANNO_SOURCE_TIMEOUT",
            SourceErrorCode::AnnoSourceFailed => "ANNO_SOURCE_FAILED",
            SourceErrorCode::AnnoCapabilityUnsupported => "ANNO_CAPABILITY_UNSUPPORTED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SourceErrorCode::AnnoCapabilityUnsupported => Severity::Reject,
            _ => Severity::Error,
        }
    }

    /// Returns whether the failed operation may be retried
    pub fn retryable(&self) -> bool {
        matches!(self, SourceErrorCode::AnnoSourceTimeout)
    }
}

impl fmt::Display for SourceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Source error type with full context
#[derive(Debug, Clone)]
pub struct SourceError {
    /// Error code
    code: SourceErrorCode,
    /// Human-readable message
    message: String,
    /// Capability name if applicable
    capability: Option<&'static str>,
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout(context: impl Into<String>) -> Self {
        Self {
            code: SourceErrorCode::AnnoSourceTimeout,
            message: format!("Deadline exceeded during {}", context.into()),
            capability: None,
        }
    }

    /// Create an opaque data source error
    pub fn data_source(reason: impl Into<String>) -> Self {
        Self {
            code: SourceErrorCode::AnnoSourceFailed,
            message: reason.into(),
            capability: None,
        }
    }

    /// Create an unsupported capability error
    pub fn unsupported_capability(capability: &'static str) -> Self {
        Self {
            code: SourceErrorCode::AnnoCapabilityUnsupported,
            message: format!("Row source does not support '{}'", capability),
            capability: Some(capability),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SourceErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns whether the failed operation may be retried
    pub fn retryable(&self) -> bool {
        self.code.retryable()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the missing capability if applicable
    pub fn capability(&self) -> Option<&'static str> {
        self.capability
    }
}

impl fmt::Display for SourceError {
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

impl std::error::Error for SourceError {}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;
