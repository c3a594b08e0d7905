//! Deadlines for row source operations
//!
//! Every boundary call carries a deadline so no operation blocks
//! indefinitely. Exceeding it surfaces as a retryable timeout error,
//! never a silent partial result.

use std::time::{Duration, Instant};

use super::errors::{SourceError, SourceResult};

/// A point in time after which source operations must abort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline; operations may take as long as they need
    pub fn none() -> Self {
        Self { at: None }
    }

    /// Deadline `timeout` from now
    pub fn from_timeout(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    /// Deadline at an absolute instant
    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    /// Returns true if the deadline has passed
    pub fn expired(&self) -> bool {
        match self.at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }

    /// Returns the remaining time, if a deadline is set
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Errors with a timeout if the deadline has passed.
    ///
    /// `context` names the operation for the error message.
    pub fn check(&self, context: &str) -> SourceResult<()> {
        if self.expired() {
            return Err(SourceError::timeout(context));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_deadline_never_expires() {
        let deadline = Deadline::none();
        assert!(!deadline.expired());
        assert!(deadline.check("scan").is_ok());
        assert_eq!(deadline.remaining(), None);
    }

    #[test]
    fn test_elapsed_deadline_expires() {
        let deadline = Deadline::at(Instant::now() - Duration::from_millis(1));
        assert!(deadline.expired());

        let err = deadline.check("group_aggregate of 'concert'").unwrap_err();
        assert_eq!(err.code().code(), "ANNO_SOURCE_TIMEOUT");
        assert!(err.retryable());
        assert!(err.message().contains("group_aggregate"));
    }

    #[test]
    fn test_future_deadline_not_expired() {
        let deadline = Deadline::from_timeout(Duration::from_secs(60));
        assert!(!deadline.expired());
        assert!(deadline.remaining().unwrap() > Duration::from_secs(59));
    }
}
