//! Cache Store Module
//!
//! Bounded string store with whole-store eviction.
//!
//! The store is limited both by entry count and by the total byte size of
//! its values. When a bound would be exceeded the entire store is cleared
//! instead of evicting individual entries, so no ordering metadata is kept.

use std::collections::hash_map;
use std::collections::HashMap;

use crate::cache::byte_size;

// == Bounded Cache ==
/// Key-value store bounded by entry count and total value size.
#[derive(Debug)]
pub struct BoundedCache {
    /// Key-value storage
    entries: HashMap<String, String>,
    /// Entry count above which the store is flushed on the next insert
    max_entries: usize,
    /// Maximum total byte size of all stored values
    max_bytes: usize,
    /// Sum of the byte sizes of all stored values
    current_bytes: usize,
    /// Number of whole-store clears triggered by a bound
    evictions: u64,
    /// Number of values rejected for being larger than `max_bytes`
    rejected: u64,
}

impl BoundedCache {
    // == Constructor ==
    /// Creates an empty cache with the given bounds.
    ///
    /// # Arguments
    /// * `max_entries` - Entry count bound
    /// * `max_bytes` - Total byte size bound for stored values
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
            max_bytes,
            current_bytes: 0,
            evictions: 0,
            rejected: 0,
        }
    }

    // == Set ==
    /// Stores a key-value pair, clearing the whole store first if a bound
    /// would be exceeded.
    ///
    /// A value that alone is larger than `max_bytes` is ignored. The entry
    /// bound only triggers once the store holds strictly more than
    /// `max_entries` entries, so the store may briefly hold
    /// `max_entries + 1` entries.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        let value_bytes = byte_size(&value);

        if value_bytes > self.max_bytes {
            self.rejected += 1;
            return self;
        }

        if self.entries.len() > self.max_entries {
            self.evict_all();
        }

        // Bytes of a value being overwritten leave the store with this insert
        let replaced_bytes = self.entries.get(&key).map_or(0, |old| byte_size(old));
        if self.current_bytes - replaced_bytes + value_bytes > self.max_bytes {
            self.evict_all();
        }

        if let Some(old) = self.entries.insert(key, value) {
            self.current_bytes -= byte_size(&old);
        }
        self.current_bytes += value_bytes;

        self
    }

    // == Get ==
    /// Returns the value stored under `key`, if any.
    ///
    /// Reads never affect which entries survive a flush.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    // == Has ==
    /// Returns true if `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Delete ==
    /// Removes an entry by key, returning true if it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(old) => {
                self.current_bytes -= byte_size(&old);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_bytes = 0;
    }

    fn evict_all(&mut self) {
        self.clear();
        self.evictions += 1;
    }

    // == Enumeration ==
    /// Iterates over `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Iterates over stored keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over stored values.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(_, value)| value)
    }

    // == Accessors ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the total byte size of all stored values.
    pub fn byte_size(&self) -> usize {
        self.current_bytes
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Number of whole-store clears caused by either bound.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Number of values rejected for being too large to ever fit.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

// == Iterator ==
/// Borrowing iterator over the entries of a [`BoundedCache`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a BoundedCache {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_new() {
        let store = BoundedCache::new(100, 1024);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.byte_size(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = BoundedCache::new(100, 1024);

        store.set("key1", "value1");

        assert_eq!(store.get("key1"), Some("value1"));
        assert!(store.has("key1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.byte_size(), 6);
    }

    #[test]
    fn test_store_set_is_chainable() {
        let mut store = BoundedCache::new(100, 1024);

        store.set("a", "1").set("b", "2");

        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = BoundedCache::new(100, 1024);
        assert_eq!(store.get("nonexistent"), None);
        assert!(!store.has("nonexistent"));
    }

    #[test]
    fn test_store_delete() {
        let mut store = BoundedCache::new(100, 1024);

        store.set("key1", "value1");
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.byte_size(), 0);
        assert!(!store.delete("key1"));
    }

    #[test]
    fn test_store_overwrite_updates_bytes() {
        let mut store = BoundedCache::new(100, 1024);

        store.set("key1", "value1");
        store.set("key1", "v2");

        assert_eq!(store.get("key1"), Some("v2"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.byte_size(), 2);
    }

    #[test]
    fn test_store_rejects_oversized_value() {
        let mut store = BoundedCache::new(100, 8);
        store.set("small", "abc");

        store.set("big", "x".repeat(9));

        assert!(!store.has("big"));
        assert_eq!(store.get("small"), Some("abc"));
        assert_eq!(store.byte_size(), 3);
        assert_eq!(store.rejected(), 1);
        assert_eq!(store.evictions(), 0);
    }

    #[test]
    fn test_store_value_exactly_at_byte_limit() {
        let mut store = BoundedCache::new(100, 8);

        store.set("exact", "x".repeat(8));

        assert!(store.has("exact"));
        assert_eq!(store.byte_size(), 8);
    }

    #[test]
    fn test_store_entry_bound_is_strictly_greater() {
        let mut store = BoundedCache::new(2, 1024);

        store.set("a", "1").set("b", "2").set("c", "3");

        // Two entries are not more than two, so "c" joins without a flush
        assert_eq!(store.len(), 3);
        assert_eq!(store.evictions(), 0);

        store.set("d", "4");

        assert_eq!(store.len(), 1);
        assert!(store.has("d"));
        assert!(!store.has("a"));
        assert!(!store.has("b"));
        assert!(!store.has("c"));
        assert_eq!(store.evictions(), 1);
    }

    #[test]
    fn test_store_byte_bound_clears_everything() {
        let mut store = BoundedCache::new(100, 10);

        store.set("a", "xxxx").set("b", "xxxx");
        assert_eq!(store.byte_size(), 8);

        store.set("c", "xxxx");

        assert_eq!(store.len(), 1);
        assert!(store.has("c"));
        assert_eq!(store.byte_size(), 4);
        assert_eq!(store.evictions(), 1);
    }

    #[test]
    fn test_store_overwrite_within_byte_bound_keeps_others() {
        let mut store = BoundedCache::new(100, 10);

        store.set("a", "xxxx").set("b", "xxxx");
        // Replacing "b" frees its own four bytes first
        store.set("b", "yyyyyy");

        assert_eq!(store.len(), 2);
        assert_eq!(store.byte_size(), 10);
        assert_eq!(store.evictions(), 0);
    }

    #[test]
    fn test_store_get_does_not_protect_entry() {
        let mut store = BoundedCache::new(1, 1024);

        store.set("a", "1").set("b", "2");
        assert_eq!(store.get("a"), Some("1"));

        store.set("c", "3");

        assert!(!store.has("a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_clear() {
        let mut store = BoundedCache::new(100, 1024);

        store.set("a", "1").set("b", "2");
        store.clear();

        assert_eq!(store.len(), 0);
        assert_eq!(store.byte_size(), 0);
        assert!(!store.has("a"));
        assert!(!store.has("b"));
        // Manual clears are not evictions
        assert_eq!(store.evictions(), 0);
    }

    #[test]
    fn test_store_iteration_is_restartable() {
        let mut store = BoundedCache::new(100, 1024);
        store.set("a", "1").set("b", "2");

        let mut first: Vec<_> = store.iter().collect();
        let mut second: Vec<_> = (&store).into_iter().collect();
        first.sort_unstable();
        second.sort_unstable();

        assert_eq!(first, vec![("a", "1"), ("b", "2")]);
        assert_eq!(first, second);

        let mut keys: Vec<_> = store.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["a", "b"]);

        let mut values: Vec<_> = store.values().collect();
        values.sort_unstable();
        assert_eq!(values, vec!["1", "2"]);
    }
}
