//! Periodic Cache Invalidation
//!
//! Background task that flushes the whole cache at a fixed interval, bounding
//! staleness independently of how the cache is used.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::BoundedCache;

/// Shortest accepted flush interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns a background task that clears `cache` every `interval`.
///
/// Intervals below [`MIN_INTERVAL`] are raised to it.
///
/// The task runs until its handle is aborted. It does not look at in-flight
/// requests; a request finishing right after a flush simply repopulates its
/// own entry.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(BoundedCache::new(100, 1 << 20)));
/// let handle = spawn_invalidation_task(cache.clone(), Duration::from_secs(3600));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_invalidation_task(
    cache: Arc<RwLock<BoundedCache>>,
    interval: Duration,
) -> JoinHandle<()> {
    let interval = interval.max(MIN_INTERVAL);

    tokio::spawn(async move {
        info!(
            "Starting cache invalidation task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let flushed = {
                let mut cache_guard = cache.write().await;
                let count = cache_guard.len();
                cache_guard.clear();
                count
            };

            if flushed > 0 {
                info!("Cache invalidation: flushed {} entries", flushed);
            } else {
                debug!("Cache invalidation: cache already empty");
            }
        }
    })
}

// == Periodic Invalidator ==
/// Owns the invalidation task of one pipeline instance.
///
/// The task starts with [`PeriodicInvalidator::start`] and is stopped by
/// [`PeriodicInvalidator::stop`] or by dropping the invalidator.
#[derive(Debug)]
pub struct PeriodicInvalidator {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicInvalidator {
    /// Starts flushing `cache` every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(cache: Arc<RwLock<BoundedCache>>, interval: Duration) -> Self {
        Self {
            handle: Mutex::new(Some(spawn_invalidation_task(cache, interval))),
        }
    }

    /// Stops the task. Returns false if it was already stopped.
    pub fn stop(&self) -> bool {
        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match handle {
            Some(handle) => {
                handle.abort();
                debug!("Cache invalidation task stopped");
                true
            }
            None => false,
        }
    }

    /// Returns true while the task has not been stopped.
    pub fn is_running(&self) -> bool {
        match self.handle.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

impl Drop for PeriodicInvalidator {
    fn drop(&mut self) {
        self.stop();
    }
}
