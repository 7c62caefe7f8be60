//! pkgcache - Caching for package managers
//!
//! This library keeps expensive-to-compute objects available both within
//! a process and across process restarts.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`core`] - Ephemeral cache, write-behind cache and their contracts (no I/O)
//! - [`infra`] - Infrastructure layer (directories, files, file-backed store)
//! - [`cli`] - Command-line interface for inspecting the persisted cache
//! - [`config`] - Configuration defaults
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pkgcache::core::store::MemoryStore;
//! use pkgcache::core::write_behind::{WriteBehindCache, WriteBehindConfig};
//!
//! let cache = WriteBehindCache::new(Arc::new(MemoryStore::new()), WriteBehindConfig::default());
//! cache.start()?;
//! cache.push("repo/deps", &vec!["sys-libs/zlib"]);
//! cache.sync(true);
//! let deps: Option<Vec<String>> = cache.pop("repo/deps");
//! cache.stop();
//! # Ok::<(), pkgcache::error::CacheError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
