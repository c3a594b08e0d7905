//! Planner error types
//!
//! Error codes:
//! - ANNO_SPEC_INVALID (REJECT)
//! - ANNO_DUPLICATE_FIELD (REJECT)
//! - ANNO_CAPABILITY_UNSUPPORTED (REJECT)
//!
//! Planning is pure validation and path selection; every planner error is
//! a rejection of the caller's input, raised before any round trip.

use std::fmt;

/// Severity levels for planner errors
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

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Malformed spec set
    AnnoSpecInvalid,
    /// Virtual field name collides with another virtual or native field
    AnnoDuplicateField,
    /// Source lacks a primitive and the fallback policy denies the
    /// degraded path
    AnnoCapabilityUnsupported,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::AnnoSpecInvalid => "ANNO_SPEC_INVALID",
            PlannerErrorCode::AnnoDuplicateField => "ANNO_DUPLICATE_FIELD",
            PlannerErrorCode::AnnoCapabilityUnsupported => "ANNO_CAPABILITY_UNSUPPORTED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Spec (virtual field) name if applicable
    spec: Option<String>,
}

impl PlannerError {
    /// Create an invalid spec set error
    pub fn spec_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::AnnoSpecInvalid,
            message: reason.into(),
            spec: None,
        }
    }

    /// Create a duplicate virtual field error
    pub fn duplicate_field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: PlannerErrorCode::AnnoDuplicateField,
            message: format!("Virtual field '{}' is declared more than once", name),
            spec: Some(name),
        }
    }

    /// Create a native field collision error
    pub fn field_collision(name: impl Into<String>, entity: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: PlannerErrorCode::AnnoDuplicateField,
            message: format!(
                "Virtual field '{}' collides with a native field on entity '{}'",
                name,
                entity.into()
            ),
            spec: Some(name),
        }
    }

    /// Create an unsupported capability error for one spec
    pub fn capability_unsupported(spec: impl Into<String>, capability: &'static str) -> Self {
        let spec = spec.into();
        Self {
            code: PlannerErrorCode::AnnoCapabilityUnsupported,
            message: format!(
                "Spec '{}' requires '{}', which the row source does not support and the fallback policy denies",
                spec, capability
            ),
            spec: Some(spec),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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

    /// Returns the spec name if applicable
    pub fn spec(&self) -> Option<&str> {
        self.spec.as_deref()
    }
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
