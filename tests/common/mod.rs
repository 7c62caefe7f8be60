//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use pkgcache::core::store::{DurableStore, MemoryStore, Payload};
use pkgcache::core::write_behind::{WriteBehindCache, WriteBehindConfig};
use pkgcache::error::StoreError;
use tempfile::TempDir;

/// Temporary cache environment
///
/// Owns a temporary directory holding the artifact root and the config
/// directory, and runs the `pkgcache` binary against them.
pub struct TestCache {
    /// Temporary directory for the test
    pub dir: TempDir,
}

impl TestCache {
    /// Create a new cache environment in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Artifact root
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("dumps")
    }

    /// Config directory
    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    /// Create a file relative to the artifact root
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a path exists relative to the artifact root
    pub fn exists(&self, name: &str) -> bool {
        self.root().join(name).exists()
    }

    /// Write the global config file
    pub fn write_config(&self, content: &str) {
        std::fs::create_dir_all(self.config_dir()).expect("Failed to create config dir");
        std::fs::write(self.config_dir().join("config.toml"), content)
            .expect("Failed to write config");
    }

    /// Run pkgcache with the environment pointing at this cache
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pkgcache"));
        cmd.current_dir(self.dir.path());
        cmd.env("PKGCACHE_CACHE_DIR", self.dir.path());
        cmd.env("PKGCACHE_CONFIG_DIR", self.config_dir());
        cmd.env_remove("PKGCACHE_ROOT");
        cmd.env_remove("RUST_LOG");
        for arg in args {
            cmd.arg(arg);
        }
        cmd.output().expect("Failed to execute pkgcache")
    }
}

impl Default for TestCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Stdout of a finished command
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished command
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Write-behind cache over a fresh in-memory store
pub fn memory_cache(unit: Duration) -> (WriteBehindCache, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let cache = WriteBehindCache::new(store.clone(), WriteBehindConfig::with_time_unit(unit));
    (cache, store)
}

/// Store whose every operation fails
#[derive(Debug, Default)]
pub struct FailingStore;

impl DurableStore for FailingStore {
    fn write(&self, _key: &str, _payload: &Payload) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }

    fn read(&self, _key: &str) -> Result<Option<Payload>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }

    fn remove_artifacts_under(&self, _key: &str) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("disk on fire".to_string()))
    }
}

/// Relative path of every file under `root`, sorted
pub fn files_under(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    files.sort();
    files
}
