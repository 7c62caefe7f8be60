//! CLI commands for the artifact store as a whole
//!
//! `info`, `list`, `clear` and `clean`.

use anyhow::Result;
use serde_json::json;

use crate::cli::output::{status, OutputConfig};
use crate::core::cache::{clean_cache, format_size, get_cache_info};
use crate::core::context::CacheContext;
use crate::infra::dump::FileStore;

/// Execute info subcommand
pub fn execute_info(context: &CacheContext, output: OutputConfig) -> Result<()> {
    let info = get_cache_info(context.root());
    let version = env!("CARGO_PKG_VERSION");
    let git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown");
    let rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown");

    let printed = output.json(&json!({
        "path": info.path,
        "size_bytes": info.size_bytes,
        "item_count": info.item_count,
        "exists": info.exists,
        "version": version,
        "git_sha": git_sha,
    }))?;
    if printed {
        return Ok(());
    }

    output.line("📦 Cache Information\n");
    output.line(&format!("Location: {}", info.path.display()));
    output.line(&format!("Size: {}", info.format_size()));
    output.line(&format!("Items: {}", info.item_count));
    output.line(&format!("Version: {version} ({git_sha}, rustc {rustc})"));

    if !info.exists {
        output.status(
            status::WARNING,
            "Cache directory does not exist (empty cache)",
        );
    }

    Ok(())
}

/// Execute list subcommand
pub fn execute_list(context: &CacheContext, prefix: &str, output: OutputConfig) -> Result<()> {
    let keys = FileStore::new(context.root()).keys(prefix);
    if output.json(&keys)? {
        return Ok(());
    }

    // keys are data, print them even when quiet
    for key in &keys {
        println!("{key}");
    }
    if keys.is_empty() {
        output.status(status::INFO, "No cached keys");
    }
    Ok(())
}

/// Execute clear subcommand
pub fn execute_clear(context: &CacheContext, key: &str, output: OutputConfig) -> Result<()> {
    let removed = context.clear_artifact(key);
    if output.json(&json!({ "key": key, "removed": removed }))? {
        return Ok(());
    }

    output.status(
        status::SUCCESS,
        &format!("Removed {removed} cache artifact(s) around '{key}'"),
    );
    Ok(())
}

/// Execute clean subcommand
pub fn execute_clean(context: &CacheContext, output: OutputConfig) -> Result<()> {
    let size_freed = clean_cache(context.root());
    if output.json(&json!({ "freed_bytes": size_freed }))? {
        return Ok(());
    }

    if size_freed > 0 {
        output.status(
            status::SUCCESS,
            &format!("Cache cleared ({} freed)", format_size(size_freed)),
        );
    } else {
        output.status(status::SUCCESS, "Cache was already empty");
    }
    Ok(())
}
