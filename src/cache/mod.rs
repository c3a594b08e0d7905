//! Annotation result cache subsystem
//!
//! Optional TTL cache over whole annotation passes, keyed by a fingerprint
//! of (spec set, parent key set, as-of instant).
//!
//! # Invariants
//!
//! - Single flight: at most one computation runs per key at a time
//! - A caller dropping its future never cancels the shared computation
//! - Errors are never served from cache; the failed entry is evicted

mod cache;
mod errors;
mod key;

pub use cache::AnnotationCache;
pub use errors::{CacheError, CacheResult};
pub use key::CacheKey;
