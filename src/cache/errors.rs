//! Cache error types
//!
//! The cache shares one computation between concurrent waiters, so its
//! errors are `Clone` and carry the code and retryability of the failure
//! they wrap.

use thiserror::Error;

use crate::executor::ExecutorError;
use crate::planner::PlannerError;

/// Cache-layer errors
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Spec rejected before execution (planner or schema validation)
    #[error("Annotation rejected ({code}): {message}")]
    Rejected {
        /// Error code of the rejection
        code: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// The annotation pass started and failed
    #[error("Annotation pass failed ({code}): {message}")]
    PassFailed {
        /// Error code of the underlying failure
        code: &'static str,
        /// Human-readable reason
        message: String,
        /// Whether a retry may succeed
        retryable: bool,
    },

    /// Could not fingerprint the request into a cache key
    #[error("Failed to fingerprint cache key: {0}")]
    Fingerprint(String),

    /// The spawned computation was aborted before completing
    #[error("Annotation task aborted before completing")]
    TaskAborted,
}

impl CacheError {
    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            CacheError::Rejected { code, .. } => code,
            CacheError::PassFailed { code, .. } => code,
            CacheError::Fingerprint(_) => "ANNO_SPEC_INVALID",
            CacheError::TaskAborted => "ANNO_SOURCE_FAILED",
        }
    }

    /// Returns whether the failed request may be retried
    pub fn retryable(&self) -> bool {
        match self {
            CacheError::PassFailed { retryable, .. } => *retryable,
            CacheError::TaskAborted => true,
            _ => false,
        }
    }
}

impl From<PlannerError> for CacheError {
    fn from(err: PlannerError) -> Self {
        CacheError::Rejected {
            code: err.code().code(),
            message: err.message().to_string(),
        }
    }
}

impl From<ExecutorError> for CacheError {
    fn from(err: ExecutorError) -> Self {
        CacheError::PassFailed {
            code: err.code(),
            message: err.to_string(),
            retryable: err.retryable(),
        }
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
