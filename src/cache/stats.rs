//! Cache Statistics Module
//!
//! Snapshot of memoizer and store counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of cache performance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that started a producer
    pub misses: u64,
    /// Lookups that joined a producer already in flight
    pub coalesced: u64,
    /// Whole-store clears caused by a bound
    pub evictions: u64,
    /// Values too large to ever be stored
    pub rejected: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current total byte size of cached values
    pub total_bytes: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Coalesced lookups count as neither hits nor misses. Returns 0.0 if no
    /// lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Lookup Counters ==
/// Lock-free lookup counters updated by the memoizer.
#[derive(Debug, Default)]
pub(crate) struct LookupCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
}

impl LookupCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters into a fresh [`CacheStats`].
    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            ..CacheStats::default()
        }
    }
}
