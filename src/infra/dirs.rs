//! Cache and config directory discovery
//!
//! Defaults follow the platform conventions provided by the `dirs` crate
//! (XDG on Linux, `~/Library` on macOS). Two environment variables take
//! precedence:
//! - `PKGCACHE_CACHE_DIR` - directory holding the `dumps/` artifact root
//! - `PKGCACHE_CONFIG_DIR` - directory holding `config.toml`

use std::env;
use std::path::PathBuf;

/// Overrides the cache directory
pub const ENV_CACHE_DIR: &str = "PKGCACHE_CACHE_DIR";
/// Overrides the config directory
pub const ENV_CONFIG_DIR: &str = "PKGCACHE_CONFIG_DIR";

const APP_NAME: &str = "pkgcache";
const DUMPS_SUBDIR: &str = "dumps";
const CONFIG_FILE: &str = "config.toml";

/// Resolved locations used by pkgcache
#[derive(Debug, Clone)]
pub struct CacheDirs {
    cache_dir: PathBuf,
    config_dir: PathBuf,
}

/// `$var` if set, else `<platform dir>/pkgcache`, else `~/<hidden>/pkgcache`
fn resolve(var: &str, platform: Option<PathBuf>, hidden: &str) -> PathBuf {
    if let Some(path) = env::var_os(var).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    let base = platform.unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(hidden)
    });
    base.join(APP_NAME)
}

impl CacheDirs {
    /// Resolve directories from the environment and platform defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache_dir: resolve(ENV_CACHE_DIR, dirs::cache_dir(), ".cache"),
            config_dir: resolve(ENV_CONFIG_DIR, dirs::config_dir(), ".config"),
        }
    }

    /// Use explicit directories, ignoring the environment
    #[must_use]
    pub fn with_paths(cache_dir: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            config_dir,
        }
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Default artifact root, `<cache dir>/dumps`
    #[must_use]
    pub fn dump_dir(&self) -> PathBuf {
        self.cache_dir.join(DUMPS_SUBDIR)
    }

    /// `<config dir>/config.toml`
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}

impl Default for CacheDirs {
    fn default() -> Self {
        Self::new()
    }
}
