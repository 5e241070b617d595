//! Single-Flight Memoizer
//!
//! Wraps an async producer with a [`BoundedCache`] so that concurrent callers
//! asking for the same key share one producer run.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinError;
use tracing::{debug, warn};

use super::stats::LookupCounters;
use super::{BoundedCache, CacheStats};

/// Result of one producer run, shared by every caller waiting on it.
type Pending<E> = Shared<BoxFuture<'static, Result<String, E>>>;

// == Single Flight ==
/// Memoizes an async `key -> String` producer.
///
/// At most one producer run per key is outstanding at a time. Each run is
/// driven on its own task, so it completes even when every waiter gives up.
/// Successful results are stored in the shared cache; failures are handed to
/// every waiter and never cached.
pub struct SingleFlight<F, E> {
    cache: Arc<RwLock<BoundedCache>>,
    in_flight: Arc<Mutex<HashMap<String, Pending<E>>>>,
    producer: F,
    counters: LookupCounters,
}

impl<F, Fut, E> SingleFlight<F, E>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, E>> + Send + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    // == Constructor ==
    /// Creates a memoizer storing results in `cache`.
    ///
    /// The cache handle may be shared with other owners, such as the
    /// periodic invalidator.
    pub fn new(cache: Arc<RwLock<BoundedCache>>, producer: F) -> Self {
        Self {
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            producer,
            counters: LookupCounters::default(),
        }
    }

    // == Get ==
    /// Returns the value for `key`, running the producer at most once for
    /// all concurrent callers.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get(&self, key: &str) -> Result<String, E> {
        if let Some(value) = self.cached(key).await {
            return Ok(value);
        }

        let pending = {
            let mut in_flight = self.in_flight.lock().await;

            // A run may have finished between the lookup above and the lock
            if let Some(value) = self.cached(key).await {
                return Ok(value);
            }

            match in_flight.get(key) {
                Some(pending) => {
                    self.counters.record_coalesced();
                    debug!(key, "joining in-flight request");
                    pending.clone()
                }
                None => {
                    self.counters.record_miss();
                    debug!(key, "cache miss, starting producer");
                    let pending = self.start(key.to_owned());
                    in_flight.insert(key.to_owned(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    async fn cached(&self, key: &str) -> Option<String> {
        let value = self.cache.read().await.get(key).map(str::to_owned)?;
        self.counters.record_hit();
        Some(value)
    }

    /// Spawns one producer run. The task stores a success and clears the
    /// in-flight record before any waiter sees the outcome.
    fn start(&self, key: String) -> Pending<E> {
        let produce = (self.producer)(key.clone());
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);

        let task = tokio::spawn({
            let key = key.clone();
            let in_flight = Arc::clone(&in_flight);
            async move {
                let outcome = produce.await;
                if let Ok(value) = &outcome {
                    cache.write().await.set(key.clone(), value.clone());
                }
                in_flight.lock().await.remove(&key);
                outcome
            }
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    // The task never reached its own cleanup
                    warn!(key = %key, error = %err, "producer task failed");
                    in_flight.lock().await.remove(&key);
                    Err(E::from(err))
                }
            }
        }
        .boxed()
        .shared()
    }

    // == Accessors ==
    /// Returns the cache backing this memoizer.
    pub fn cache(&self) -> &Arc<RwLock<BoundedCache>> {
        &self.cache
    }

    /// Number of keys with a producer currently running.
    pub async fn in_flight_len(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Snapshot of lookup counters combined with the store's state.
    pub async fn stats(&self) -> CacheStats {
        let cache = self.cache.read().await;
        CacheStats {
            evictions: cache.evictions(),
            rejected: cache.rejected(),
            total_entries: cache.len(),
            total_bytes: cache.byte_size(),
            ..self.counters.snapshot()
        }
    }
}
