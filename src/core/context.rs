//! Cache context
//!
//! Bundles the ephemeral and the write-behind cache so an application can
//! build both once at startup and hand them to whoever needs them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::ephemeral::EphemeralCache;
use crate::core::global_config::GlobalConfig;
use crate::core::store::{DurableStore, Payload};
use crate::core::write_behind::{WriteBehindCache, WriteBehindConfig};
use crate::error::PkgcacheError;
use crate::infra::dirs::CacheDirs;
use crate::infra::dump::{self, FileStore};

/// The process's cache instances
#[derive(Debug, Clone)]
pub struct CacheContext {
    /// In-process reuse of derived objects
    pub ephemeral: Arc<EphemeralCache>,
    /// Persistence across runs
    pub persistent: Arc<WriteBehindCache>,
    root: PathBuf,
}

impl CacheContext {
    /// Build both caches from configuration, persisting under the configured root
    ///
    /// The write-behind cache is returned stopped.
    pub fn open(config: &GlobalConfig, dirs: &CacheDirs) -> Self {
        Self::with_root(config.storage_root(dirs), config.write_behind_config())
    }

    /// Read `config.toml` and build both caches from it
    pub fn load(dirs: &CacheDirs) -> Result<Self, PkgcacheError> {
        let config = GlobalConfig::load(dirs)?;
        Ok(Self::open(&config, dirs))
    }

    /// Build both caches persisting under `root`
    pub fn with_root(root: PathBuf, timing: WriteBehindConfig) -> Self {
        let store: Arc<dyn DurableStore> = Arc::new(FileStore::new(root.clone()));
        Self {
            ephemeral: Arc::new(EphemeralCache::new()),
            persistent: Arc::new(WriteBehindCache::new(store, timing)),
            root,
        }
    }

    /// Artifact root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one value and confirm it can be read back
    ///
    /// Starts the write-behind cache, writes `payload` either through the
    /// buffer (`defer`) or directly, then stops the cache. Failures the cache
    /// absorbs surface here as [`PkgcacheError::NotStored`].
    pub fn persist(&self, key: &str, payload: &Payload, defer: bool) -> Result<(), PkgcacheError> {
        let cache = &self.persistent;
        cache.start()?;
        if defer {
            cache.push(key, payload);
            cache.sync(true);
        } else {
            cache.write_through(key, payload);
        }
        cache.stop();

        if cache.pop_payload(key).as_ref() == Some(payload) {
            Ok(())
        } else {
            Err(PkgcacheError::NotStored {
                key: key.to_string(),
            })
        }
    }

    /// Drop persisted artifacts around `key`
    pub fn clear_artifact(&self, key: &str) -> usize {
        dump::clear_artifact(&self.root, key)
    }
}
