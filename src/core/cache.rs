//! Persisted artifact maintenance
//!
//! Size accounting and bulk cleaning for the artifacts
//! written by the file-backed store.

use std::path::{Path, PathBuf};

use crate::config::defaults::ARTIFACT_EXTENSION;
use crate::infra::dump::clear_artifact;

/// Cache information
#[derive(Debug)]
pub struct CacheInfo {
    /// Artifact root path
    pub path: PathBuf,
    /// Total size of artifacts in bytes
    pub size_bytes: u64,
    /// Number of artifacts
    pub item_count: usize,
    /// Whether the root exists
    pub exists: bool,
}

impl CacheInfo {
    /// Format size for display
    pub fn format_size(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count for display
#[allow(clippy::cast_precision_loss)]
pub fn format_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        "0 bytes".to_string()
    } else if size_bytes < 1024 {
        format!("{size_bytes} bytes")
    } else if size_bytes < 1024 * 1024 {
        format!("{:.1} KB", size_bytes as f64 / 1024.0)
    } else if size_bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", size_bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size_bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Sizes of every artifact file under `root`
fn artifact_sizes(root: &Path) -> impl Iterator<Item = u64> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION))
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
}

/// Get information about the artifacts under `root`
pub fn get_cache_info(root: &Path) -> CacheInfo {
    let exists = root.exists();
    let (item_count, size_bytes) = artifact_sizes(root)
        .fold((0usize, 0u64), |(count, size), len| (count + 1, size + len));

    CacheInfo {
        path: root.to_path_buf(),
        size_bytes,
        item_count,
        exists,
    }
}

/// Remove every artifact under `root`
///
/// Returns the number of bytes freed.
pub fn clean_cache(root: &Path) -> u64 {
    let size_before = get_cache_info(root).size_bytes;
    let removed = clear_artifact(root, "");
    let size_after = get_cache_info(root).size_bytes;
    tracing::info!("Removed {removed} cache artifacts from {}", root.display());
    size_before.saturating_sub(size_after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_info_format_size() {
        let info = CacheInfo {
            path: PathBuf::from("/tmp/cache"),
            size_bytes: 0,
            item_count: 0,
            exists: false,
        };
        assert_eq!(info.format_size(), "0 bytes");

        assert_eq!(format_size(512), "512 bytes");
        assert!(format_size(1024 * 100).contains("KB"));
        assert!(format_size(1024 * 1024 * 50).contains("MB"));
        assert!(format_size(1024 * 1024 * 1024 * 3).contains("GB"));
    }

    #[test]
    fn test_cache_info_counts_only_artifacts() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("repo")).unwrap();
        std::fs::write(temp.path().join("repo").join("a.dmp"), "1234").unwrap();
        std::fs::write(temp.path().join("repo").join("notes.txt"), "ignored").unwrap();

        let info = get_cache_info(temp.path());
        assert!(info.exists);
        assert_eq!(info.item_count, 1);
        assert_eq!(info.size_bytes, 4);
    }

    #[test]
    fn test_clean_cache_reports_freed_bytes() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("repo")).unwrap();
        std::fs::write(temp.path().join("repo").join("a.dmp"), "12345678").unwrap();

        assert_eq!(clean_cache(temp.path()), 8);
        assert_eq!(get_cache_info(temp.path()).item_count, 0);
        assert!(temp.path().exists());
        assert!(!temp.path().join("repo").exists());
    }
}
