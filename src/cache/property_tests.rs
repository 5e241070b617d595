//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's bounds under arbitrary operation
//! sequences.

use proptest::prelude::*;

use crate::cache::{byte_size, BoundedCache};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 8;
const TEST_MAX_BYTES: usize = 256;

// == Strategies ==
/// Generates keys from a small alphabet so that overwrites happen often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-j]{1,2}".prop_map(|s| s)
}

/// Generates values, some of which are larger than the byte bound
fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => "[a-zA-Z0-9 ]{0,64}".prop_map(|s| s),
        1 => "[x]{257,300}".prop_map(|s| s),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Delete { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::Clear),
    ]
}

fn stored_bytes(store: &BoundedCache) -> usize {
    store.values().map(byte_size).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Tracked byte size always equals the sum of stored values and stays
    // within the byte bound.
    #[test]
    fn prop_byte_accounting(ops in prop::collection::vec(cache_op_strategy(), 1..100)) {
        let mut store = BoundedCache::new(TEST_MAX_ENTRIES, TEST_MAX_BYTES);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key, value);
                }
                CacheOp::Delete { key } => {
                    store.delete(&key);
                }
                CacheOp::Clear => store.clear(),
            }

            prop_assert_eq!(store.byte_size(), stored_bytes(&store));
            prop_assert!(store.byte_size() <= TEST_MAX_BYTES);
        }
    }

    // The entry bound is enforced before insertion, so the store never holds
    // more than one entry over the limit.
    #[test]
    fn prop_entry_bound(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200)
    ) {
        let mut store = BoundedCache::new(TEST_MAX_ENTRIES, TEST_MAX_BYTES);

        for (key, value) in entries {
            store.set(key, value);
            prop_assert!(
                store.len() <= TEST_MAX_ENTRIES + 1,
                "Cache size {} exceeds max {} + 1",
                store.len(),
                TEST_MAX_ENTRIES
            );
        }
    }

    // A value larger than the byte bound never changes the store.
    #[test]
    fn prop_oversized_value_is_noop(
        seed in prop::collection::vec((key_strategy(), "[a-z]{0,16}"), 0..8),
        key in key_strategy(),
        extra in 1usize..64
    ) {
        let mut store = BoundedCache::new(TEST_MAX_ENTRIES, TEST_MAX_BYTES);
        for (k, v) in seed {
            store.set(k, v);
        }
        let mut before: Vec<(String, String)> = store
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        before.sort();
        let had_key = store.has(&key);

        store.set(key.clone(), "x".repeat(TEST_MAX_BYTES + extra));

        let mut after: Vec<(String, String)> = store
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        after.sort();
        prop_assert_eq!(before, after);
        prop_assert_eq!(store.has(&key), had_key);
    }

    // Round-trip: a value that fits is readable right after it is stored.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in "[a-z]{0,64}") {
        let mut store = BoundedCache::new(TEST_MAX_ENTRIES, TEST_MAX_BYTES);

        store.set(key.clone(), value.clone());

        prop_assert_eq!(store.get(&key), Some(value.as_str()));
    }

    // Clear always empties the store.
    #[test]
    fn prop_clear_empties(
        entries in prop::collection::vec((key_strategy(), "[a-z]{0,16}"), 0..20)
    ) {
        let mut store = BoundedCache::new(TEST_MAX_ENTRIES, TEST_MAX_BYTES);
        let keys: Vec<String> = entries.iter().map(|(k, _)| k.clone()).collect();
        for (k, v) in entries {
            store.set(k, v);
        }

        store.clear();

        prop_assert_eq!(store.len(), 0);
        prop_assert_eq!(store.byte_size(), 0);
        for key in keys {
            prop_assert!(!store.has(&key));
        }
    }
}
