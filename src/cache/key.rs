//! Cache key fingerprinting
//!
//! A key identifies one annotation request: the spec set, the parent key
//! set, and the as-of instant. Parent keys are sorted before hashing so
//! that caller-side ordering does not fragment the cache.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::spec::AnnotationSpec;

use super::errors::{CacheError, CacheResult};

/// Fingerprint of one annotation request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    digest: [u8; 32],
}

impl CacheKey {
    /// Fingerprints the request into a key
    ///
    /// Specs are hashed in declaration order (spec order is semantically
    /// neutral but callers that reorder specs are treated as distinct
    /// requests); parent keys are hashed sorted.
    pub fn fingerprint(
        specs: &[AnnotationSpec],
        parent_keys: &[&str],
        as_of: DateTime<Utc>,
    ) -> CacheResult<Self> {
        let mut hasher = Sha256::new();

        let serialized = serde_json::to_vec(specs)
            .map_err(|e| CacheError::Fingerprint(e.to_string()))?;
        hasher.update((serialized.len() as u64).to_le_bytes());
        hasher.update(&serialized);

        let mut sorted: Vec<&str> = parent_keys.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        hasher.update((sorted.len() as u64).to_le_bytes());
        for key in sorted {
            hasher.update((key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
        }

        hasher.update(as_of.to_rfc3339_opts(SecondsFormat::Micros, true).as_bytes());

        Ok(Self {
            digest: hasher.finalize().into(),
        })
    }

    /// Returns the fingerprint as lowercase hex (for logging)
    pub fn to_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
