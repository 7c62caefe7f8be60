//! Durable store and snapshot contracts
//!
//! The write-behind cache never touches the filesystem itself. It copies
//! values into a [`Payload`] through [`Snapshot`] and hands them to a
//! [`DurableStore`], which decides where and how they live.
//!
//! [`MemoryStore`] is the in-process implementation; the file-backed one
//! lives in [`crate::infra::dump`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::error::StoreError;

/// Persisted representation of a cached value
pub type Payload = serde_json::Value;

/// Deep-copy capability used at push time
///
/// The snapshot is independent of the original value: mutating the
/// original afterwards does not change what gets persisted. Types whose
/// `Serialize` implementation fails (for example maps keyed by non-string
/// types) cannot be snapshotted.
pub trait Snapshot {
    /// Produce an independent copy of `self`
    fn snapshot(&self) -> Result<Payload, serde_json::Error>;
}

impl<T: Serialize + ?Sized> Snapshot for T {
    fn snapshot(&self) -> Result<Payload, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Key-addressed durable storage
///
/// Implementations must tolerate being called from the drain thread and
/// from producer threads at the same time.
pub trait DurableStore: Send + Sync {
    /// Store `payload` under `key`, replacing any previous value
    fn write(&self, key: &str, payload: &Payload) -> Result<(), StoreError>;

    /// Read the payload stored under `key`
    fn read(&self, key: &str) -> Result<Option<Payload>, StoreError>;

    /// Remove every artifact living under the location derived from `key`
    ///
    /// Returns the number of artifacts removed.
    fn remove_artifacts_under(&self, key: &str) -> Result<usize, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, Payload>,
    write_log: Vec<String>,
}

/// In-memory durable store
///
/// Keeps every write in a log so the persistence order can be inspected.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keys in the order they were written (repeats included)
    pub fn write_log(&self) -> Vec<String> {
        self.state().write_log.clone()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// Whether `key` has a stored payload
    pub fn contains(&self, key: &str) -> bool {
        self.state().entries.contains_key(key)
    }
}

impl DurableStore for MemoryStore {
    fn write(&self, key: &str, payload: &Payload) -> Result<(), StoreError> {
        let mut state = self.state();
        state.entries.insert(key.to_string(), payload.clone());
        state.write_log.push(key.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Payload>, StoreError> {
        Ok(self.state().entries.get(key).cloned())
    }

    /// Removes every key sharing the directory-like parent of `key`
    fn remove_artifacts_under(&self, key: &str) -> Result<usize, StoreError> {
        let scope = artifact_scope(key);
        let mut state = self.state();
        let before = state.entries.len();
        state.entries.retain(|k, _| !k.starts_with(scope));
        Ok(before - state.entries.len())
    }
}

/// Prefix that an artifact cleanup for `key` covers
///
/// `a/b/c` covers everything under `a/b/`, `a/b/` covers itself and a key
/// without separators covers the whole store.
pub(crate) fn artifact_scope(key: &str) -> &str {
    if key.is_empty() || key.ends_with('/') {
        return key;
    }
    match key.rfind('/') {
        Some(idx) => &key[..=idx],
        None => "",
    }
}
