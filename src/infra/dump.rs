//! File-backed durable store
//!
//! Every key is persisted as one artifact file under the storage root:
//! `repo/pkg/deps` lands in `<root>/repo/pkg/deps.dmp`. Artifacts are JSON
//! envelopes carrying the key, a SHA-256 checksum and the serialized
//! payload, so a truncated or foreign file reads as corrupt instead of
//! producing a wrong value.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::config::defaults::{ARTIFACT_EXTENSION, ARTIFACT_FORMAT};
use crate::core::store::{artifact_scope, DurableStore, Payload};
use crate::error::StoreError;
use crate::infra::filesystem;

/// On-disk representation of one cache entry
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format: u32,
    key: String,
    checksum: String,
    data: String,
}

fn checksum(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

fn is_artifact(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION)
}

/// Validate `key` and split it into path components
fn key_components(key: &str) -> Result<Vec<&str>, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.contains('\\') || key.contains('\0') {
        return Err(invalid("key contains a backslash or NUL byte"));
    }

    let components: Vec<&str> = key.split('/').collect();
    for component in &components {
        match *component {
            "" => return Err(invalid("key has an empty component")),
            "." | ".." => return Err(invalid("key has a relative component")),
            _ => {}
        }
    }
    Ok(components)
}

/// Remove cached artifacts around `key`
///
/// The location derived from a key is its parent directory: `a/b/c`
/// covers `<root>/a/b`, `a/b/` covers that same directory and a key
/// without separators covers the whole root. Every artifact file beneath
/// that location is deleted and directories left empty are pruned, except
/// `root` itself. Errors are ignored.
///
/// Returns the number of deleted artifacts.
pub fn clear_artifact(root: &Path, key: &str) -> usize {
    let scope = artifact_scope(key).trim_end_matches('/');
    let dir = if scope.is_empty() {
        root.to_path_buf()
    } else {
        root.join(scope)
    };
    if dir
        .strip_prefix(root)
        .map_or(true, |rel| rel.components().any(|c| !matches!(c, Component::Normal(_))))
    {
        tracing::warn!("Refusing to clear cache artifacts outside of the cache root: '{key}'");
        return 0;
    }

    let mut removed = 0;
    for entry in WalkDir::new(&dir)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if entry.file_type().is_dir() {
            if path != root {
                filesystem::remove_dir_if_empty(path);
            }
        } else if is_artifact(path) && filesystem::remove_file(path).is_ok() {
            removed += 1;
        }
    }

    tracing::debug!("Cleared {removed} cache artifacts under {}", dir.display());
    removed
}

/// Durable store writing one artifact file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the artifact holding `key`
    pub fn artifact_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let components = key_components(key)?;
        let (last, parents) = components
            .split_last()
            .ok_or_else(|| StoreError::InvalidKey {
                key: key.to_string(),
                reason: "key is empty".to_string(),
            })?;

        let mut path = self.root.clone();
        for component in parents {
            path.push(component);
        }
        path.push(format!("{last}.{ARTIFACT_EXTENSION}"));
        Ok(path)
    }

    /// Persisted keys starting with `prefix`, sorted
    pub fn keys(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && is_artifact(e.path()))
            .filter_map(|e| {
                let rel = e.path().strip_prefix(&self.root).ok()?.with_extension("");
                let parts: Vec<String> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(parts.join("/"))
            })
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        keys
    }
}

impl DurableStore for FileStore {
    fn write(&self, key: &str, payload: &Payload) -> Result<(), StoreError> {
        let path = self.artifact_path(key)?;
        let data = serde_json::to_string(payload).map_err(|e| StoreError::Write {
            path: path.clone(),
            error: e.to_string(),
        })?;
        let envelope = Envelope {
            format: ARTIFACT_FORMAT,
            key: key.to_string(),
            checksum: checksum(&data),
            data,
        };
        let content = serde_json::to_vec(&envelope).map_err(|e| StoreError::Write {
            path: path.clone(),
            error: e.to_string(),
        })?;

        filesystem::write_atomic(&path, &content).map_err(|e| StoreError::Write {
            path: path.clone(),
            error: e.to_string(),
        })
    }

    fn read(&self, key: &str) -> Result<Option<Payload>, StoreError> {
        let path = self.artifact_path(key)?;
        let Some(content) = filesystem::read_optional(&path).map_err(|e| StoreError::Read {
            path: path.clone(),
            error: e.to_string(),
        })?
        else {
            return Ok(None);
        };

        let corrupt = |reason: String| StoreError::Corrupt {
            path: path.clone(),
            reason,
        };

        let envelope: Envelope =
            serde_json::from_slice(&content).map_err(|e| corrupt(e.to_string()))?;
        if envelope.format != ARTIFACT_FORMAT {
            return Err(corrupt(format!(
                "unsupported format version {}",
                envelope.format
            )));
        }
        if envelope.key != key {
            return Err(corrupt(format!("artifact holds key '{}'", envelope.key)));
        }
        if envelope.checksum != checksum(&envelope.data) {
            return Err(corrupt("checksum mismatch".to_string()));
        }

        serde_json::from_str(&envelope.data)
            .map(Some)
            .map_err(|e| corrupt(e.to_string()))
    }

    fn remove_artifacts_under(&self, key: &str) -> Result<usize, StoreError> {
        Ok(clear_artifact(&self.root, key))
    }
}
