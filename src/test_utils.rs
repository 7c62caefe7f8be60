//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate one key component (lowercase alphanumeric with dashes and dots)
    pub fn key_component() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9.-]{0,12}".prop_filter("Component must not be relative", |s| {
            s != "." && s != ".."
        })
    }

    /// Generate a valid slash-separated cache key
    pub fn cache_key() -> impl Strategy<Value = String> {
        proptest::collection::vec(key_component(), 1..4).prop_map(|parts| parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::core::ephemeral::EphemeralCache;
    use crate::infra::dump::FileStore;
    use std::sync::Arc;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_cache_key_generator_yields_storable_keys(key in cache_key()) {
            let store = FileStore::new("/tmp/pkgcache-test");
            prop_assert!(store.artifact_path(&key).is_ok());
        }

        #[test]
        fn test_ephemeral_discard_removes_exactly_prefixed_keys(
            keys in proptest::collection::hash_set(cache_key(), 0..16),
            prefix in "[a-z0-9]{0,2}",
        ) {
            let cache = EphemeralCache::new();
            for key in &keys {
                cache.set(key.clone(), Arc::new(key.len()));
            }

            let removed = cache.discard(&prefix);

            let mut expected: Vec<String> =
                keys.iter().filter(|k| !k.starts_with(&prefix)).cloned().collect();
            expected.sort();
            let mut remaining = cache.keys();
            remaining.sort();
            prop_assert_eq!(removed, keys.len() - expected.len());
            prop_assert_eq!(remaining, expected);
        }
    }
}
