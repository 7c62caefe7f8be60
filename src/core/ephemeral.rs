//! Ephemeral in-process cache
//!
//! Keeps derived objects around for reuse within a single run. Each slot
//! either owns its value ([`Ownership::Strong`]) or only observes it
//! ([`Ownership::Weak`]). Weak slots are used for large existence sets that
//! are owned elsewhere: once the last owner drops its `Arc`, the slot reads
//! as a miss.
//!
//! Nothing here is persisted and nothing is kept consistent with the
//! write-behind cache.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

type Shared = Arc<dyn Any + Send + Sync>;

/// How a slot holds its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The cache keeps the value alive
    Strong,
    /// The cache observes the value without extending its lifetime
    Weak,
}

/// Default ownership for a value type
///
/// Strong unless the type overrides [`Retention::OWNERSHIP`]. Set-like
/// collections are weak.
pub trait Retention: Any + Send + Sync {
    const OWNERSHIP: Ownership = Ownership::Strong;
}

macro_rules! strong_retention {
    ($($ty:ty),* $(,)?) => {
        $(impl Retention for $ty {})*
    };
}

strong_retention!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    String, &'static str, std::path::PathBuf, serde_json::Value,
);

impl<T: Send + Sync + 'static> Retention for Vec<T> {}
impl<T: Send + Sync + 'static> Retention for VecDeque<T> {}
impl<T: Send + Sync + 'static> Retention for Option<T> {}
impl<K: Send + Sync + 'static, V: Send + Sync + 'static, S: Send + Sync + 'static> Retention
    for HashMap<K, V, S>
{
}
impl<K: Send + Sync + 'static, V: Send + Sync + 'static> Retention for BTreeMap<K, V> {}
impl<A: Send + Sync + 'static, B: Send + Sync + 'static> Retention for (A, B) {}

impl<T: Send + Sync + 'static, S: Send + Sync + 'static> Retention for HashSet<T, S> {
    const OWNERSHIP: Ownership = Ownership::Weak;
}

impl<T: Send + Sync + 'static> Retention for BTreeSet<T> {
    const OWNERSHIP: Ownership = Ownership::Weak;
}

#[derive(Debug)]
enum Slot {
    Strong(Shared),
    Weak(Weak<dyn Any + Send + Sync>),
}

impl Slot {
    fn resolve(&self) -> Option<Shared> {
        match self {
            Slot::Strong(value) => Some(Arc::clone(value)),
            Slot::Weak(handle) => handle.upgrade(),
        }
    }

    fn is_live(&self) -> bool {
        match self {
            Slot::Strong(_) => true,
            Slot::Weak(handle) => handle.strong_count() > 0,
        }
    }
}

/// Process-local key/value cache
///
/// Construct once at startup and share through an `Arc`.
#[derive(Debug, Default)]
pub struct EphemeralCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl EphemeralCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Slot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Remove the entry at `key`, if any
    pub fn clear_key(&self, key: &str) {
        self.write().remove(key);
    }

    /// Keys whose values are currently available
    pub fn keys(&self) -> Vec<String> {
        self.read()
            .iter()
            .filter(|(_, slot)| slot.is_live())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Remove every entry whose key starts with `prefix`
    ///
    /// Returns the number of removed entries.
    pub fn discard(&self, prefix: &str) -> usize {
        let mut slots = self.write();
        let before = slots.len();
        slots.retain(|key, _| !key.starts_with(prefix));
        let removed = before - slots.len();
        tracing::trace!("Discarded {removed} ephemeral entries under '{prefix}'");
        removed
    }

    /// Fetch the value stored at `key`
    ///
    /// A weak slot whose value has been dropped, or a value of another
    /// type, is a miss.
    pub fn get<T: Retention>(&self, key: &str) -> Option<Arc<T>> {
        let value = self.read().get(key)?.resolve()?;
        match value.downcast::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::trace!("Ephemeral entry '{key}' holds a different type");
                None
            }
        }
    }

    /// Store `value` at `key` with the ownership its type declares
    pub fn set<T: Retention>(&self, key: impl Into<String>, value: Arc<T>) {
        self.set_with(key, value, T::OWNERSHIP);
    }

    /// Store `value` at `key` with an explicit ownership
    pub fn set_with<T: Retention>(&self, key: impl Into<String>, value: Arc<T>, ownership: Ownership) {
        let value: Shared = value;
        let slot = match ownership {
            Ownership::Strong => Slot::Strong(value),
            Ownership::Weak => Slot::Weak(Arc::downgrade(&value)),
        };
        self.write().insert(key.into(), slot);
    }

    /// Drop weak slots whose values are gone
    ///
    /// Returns the number of dropped slots.
    pub fn purge(&self) -> usize {
        let mut slots = self.write();
        let before = slots.len();
        slots.retain(|_, slot| slot.is_live());
        before - slots.len()
    }

    /// Number of available entries
    pub fn len(&self) -> usize {
        self.read().values().filter(|slot| slot.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = EphemeralCache::new();
        cache.set("atom", Arc::new("app-misc/foo".to_string()));
        assert_eq!(
            cache.get::<String>("atom").as_deref(),
            Some(&"app-misc/foo".to_string())
        );
    }

    #[test]
    fn test_get_missing_key() {
        let cache = EphemeralCache::new();
        assert!(cache.get::<String>("missing").is_none());
    }

    #[test]
    fn test_get_with_wrong_type_is_miss() {
        let cache = EphemeralCache::new();
        cache.set("count", Arc::new(42u64));
        assert!(cache.get::<String>("count").is_none());
        assert_eq!(cache.get::<u64>("count").as_deref(), Some(&42));
    }

    #[test]
    fn test_sets_default_to_weak_ownership() {
        assert_eq!(<HashSet<u32>>::OWNERSHIP, Ownership::Weak);
        assert_eq!(<BTreeSet<String>>::OWNERSHIP, Ownership::Weak);
        assert_eq!(<Vec<u32>>::OWNERSHIP, Ownership::Strong);
        assert_eq!(String::OWNERSHIP, Ownership::Strong);
    }

    #[test]
    fn test_weak_slot_is_miss_after_owner_drops() {
        let cache = EphemeralCache::new();
        let ids: Arc<HashSet<u32>> = Arc::new((1..100).collect());
        cache.set("installed", Arc::clone(&ids));

        assert_eq!(cache.get::<HashSet<u32>>("installed").map(|s| s.len()), Some(99));
        assert_eq!(cache.keys(), vec!["installed".to_string()]);

        drop(ids);

        assert!(cache.get::<HashSet<u32>>("installed").is_none());
        assert!(cache.keys().is_empty());
        assert_eq!(cache.purge(), 1);
    }

    #[test]
    fn test_explicit_weak_for_strong_type() {
        let cache = EphemeralCache::new();
        let value = Arc::new(vec![1u8, 2, 3]);
        cache.set_with("bytes", Arc::clone(&value), Ownership::Weak);
        drop(value);
        assert!(cache.get::<Vec<u8>>("bytes").is_none());
    }

    #[test]
    fn test_discard_reports_removed_count() {
        let cache = EphemeralCache::new();
        cache.set("a.1", Arc::new(1u32));
        cache.set("a.2", Arc::new(2u32));
        cache.set("b.1", Arc::new(3u32));
        assert_eq!(cache.discard("a."), 2);
        assert_eq!(cache.len(), 1);
    }
}
