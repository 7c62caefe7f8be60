//! Error types for pkgcache
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Durable store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key cannot be mapped onto the store
    #[error("Invalid cache key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Failed to write an artifact
    #[error("Failed to write artifact '{path}': {error}")]
    Write { path: PathBuf, error: String },

    /// Failed to read an artifact
    #[error("Failed to read artifact '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Artifact exists but cannot be trusted
    #[error("Corrupt artifact '{path}': {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Backend refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be snapshotted at push time
    #[error("Cannot snapshot value for key '{key}': {error}")]
    Snapshot { key: String, error: String },

    /// Background writer could not be started
    #[error("Failed to start cache writer '{name}': {error}")]
    WriterSpawn { name: String, error: String },

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove file or directory
    #[error("Failed to remove '{path}': {error}")]
    Remove { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Top-level pkgcache error type
#[derive(Error, Debug)]
pub enum PkgcacheError {
    /// Cache error
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] crate::core::global_config::GlobalConfigError),

    /// A write was absorbed and the value did not reach the store
    #[error("Failed to store '{key}' (run with -v for details)")]
    NotStored { key: String },
}
