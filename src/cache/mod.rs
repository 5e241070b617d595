//! Cache Module
//!
//! Bounded in-memory store with whole-store eviction, and a single-flight
//! memoizer built on top of it.

mod memo;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use memo::SingleFlight;
pub use stats::CacheStats;
pub use store::{BoundedCache, Iter};

// == Public Constants ==
/// Bytes accounted per unit of string length (values are UTF-8)
pub const BYTES_PER_UNIT: usize = 1;

/// Returns the number of bytes a value counts against the cache's byte bound.
pub fn byte_size(value: &str) -> usize {
    value.len() * BYTES_PER_UNIT
}
