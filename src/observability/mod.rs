//! Observability subsystem
//!
//! Structured, synchronous JSON logging for annotation passes, fallback
//! decisions, and cache activity.

mod logger;

pub use logger::{LogSeverity, Logger};
