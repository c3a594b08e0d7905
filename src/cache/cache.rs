//! TTL result cache with single-flight computation
//!
//! At most one annotation pass runs per key at a time. Concurrent callers
//! for the same key await one shared computation; the computation runs on
//! a spawned task, so a caller dropping its future stops only that caller.
//! Entries age from completion time; an in-flight computation never
//! expires. Failed computations are evicted so the next caller recomputes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;

use crate::observability::Logger;
use crate::result::AnnotatedResultSet;

use super::errors::CacheError;
use super::key::CacheKey;

type SharedOutcome = Result<Arc<AnnotatedResultSet>, CacheError>;
type SharedComputation = Shared<BoxFuture<'static, SharedOutcome>>;

struct Entry {
    /// Distinguishes this computation from later ones under the same key
    id: u64,
    /// Set when the shared computation resolves; None while in flight
    completed_at: Option<Instant>,
    computation: SharedComputation,
}

/// TTL result cache for annotation passes
pub struct AnnotationCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
    next_id: AtomicU64,
}

impl AnnotationCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the cached result for `key`, computing it if absent or
    /// expired.
    ///
    /// `ttl` applies from the moment the computation completes; an entry
    /// whose computation is still in flight is always treated as fresh,
    /// so a late arrival joins it instead of starting a duplicate. The
    /// computation runs on a spawned task; if it fails, the entry is
    /// evicted and the error returned to every waiter.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> SharedOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AnnotatedResultSet, CacheError>> + Send + 'static,
    {
        let (id, computation) = {
            let mut entries = match self.entries.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };

            match entries.get(&key) {
                Some(entry)
                    if entry
                        .completed_at
                        .map_or(true, |done| done.elapsed() <= ttl) =>
                {
                    Logger::trace("ANNOTATION_CACHE_HIT", &[("key", &key.to_hex())]);
                    (entry.id, entry.computation.clone())
                }
                existing => {
                    let event = if existing.is_some() {
                        "ANNOTATION_CACHE_EXPIRED"
                    } else {
                        "ANNOTATION_CACHE_MISS"
                    };
                    Logger::trace(event, &[("key", &key.to_hex())]);

                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    // Spawn so the computation survives any one caller
                    // dropping its future
                    let handle = tokio::spawn(compute());
                    let computation: SharedComputation = async move {
                        match handle.await {
                            Ok(outcome) => outcome.map(Arc::new),
                            Err(_) => Err(CacheError::TaskAborted),
                        }
                    }
                    .boxed()
                    .shared();

                    entries.insert(
                        key.clone(),
                        Entry {
                            id,
                            completed_at: None,
                            computation: computation.clone(),
                        },
                    );
                    (id, computation)
                }
            }
        };

        let outcome = computation.await;

        match &outcome {
            Ok(_) => self.mark_completed(&key, id),
            Err(_) => self.evict_if_current(&key, id),
        }
        outcome
    }

    /// Removes the entry for `key` regardless of age
    pub fn invalidate(&self, key: &CacheKey) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.remove(key);
    }

    /// Number of entries currently held (including expired ones not yet
    /// replaced)
    pub fn len(&self) -> usize {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.len()
    }

    /// Returns true when the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stamps the completion time for `key`, starting its TTL clock.
    /// The first waiter to observe the result wins; later waiters and
    /// replacement computations leave the stamp alone.
    fn mark_completed(&self, key: &CacheKey, id: u64) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(entry) = entries.get_mut(key) {
            if entry.id == id && entry.completed_at.is_none() {
                entry.completed_at = Some(Instant::now());
            }
        }
    }

    /// Evicts the entry for `key` only if it still belongs to the
    /// computation that failed
    fn evict_if_current(&self, key: &CacheKey, id: u64) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.get(key).is_some_and(|entry| entry.id == id) {
            entries.remove(key);
        }
    }
}

impl Default for AnnotationCache {
    fn default() -> Self {
        Self::new()
    }
}
