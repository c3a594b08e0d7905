//! Executor error types
//!
//! Execution-time failures wrap the underlying source error and name the
//! spec that failed. A failure aborts the whole pass; partial annotation
//! results are never returned.

use std::fmt;

use crate::source::SourceError;

/// Executor error type with full context
#[derive(Debug, Clone)]
pub struct ExecutorError {
    /// Virtual field (spec) that was being computed, if any
    spec: Option<String>,
    /// Underlying source failure
    source: SourceError,
}

impl ExecutorError {
    /// Wraps a source failure with the spec being computed
    pub fn annotation_failed(spec: impl Into<String>, source: SourceError) -> Self {
        Self {
            spec: Some(spec.into()),
            source,
        }
    }

    /// Wraps a source failure not attributable to one spec
    pub fn pass_failed(source: SourceError) -> Self {
        Self { spec: None, source }
    }

    /// Returns the string error code of the underlying failure
    pub fn code(&self) -> &'static str {
        self.source.code().code()
    }

    /// Returns whether the failed pass may be retried
    pub fn retryable(&self) -> bool {
        self.source.retryable()
    }

    /// Returns the spec name that failed, if attributable
    pub fn spec(&self) -> Option<&str> {
        self.spec.as_deref()
    }

    /// Returns the underlying source error
    pub fn source_error(&self) -> &SourceError {
        &self.source
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.spec {
            Some(spec) => write!(f, "Spec '{}' failed: {}", spec, self.source),
            None => write!(f, "Annotation pass failed: {}", self.source),
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
