//! CLI commands for single cache entries
//!
//! `get` and `put`.

use anyhow::{bail, Context, Result};

use crate::cli::output::{status, OutputConfig};
use crate::core::context::CacheContext;
use crate::core::store::Payload;

/// Execute get subcommand
///
/// Prints the stored value as pretty JSON, even when quiet. With `--json`
/// the value is wrapped together with its key.
pub fn execute_get(context: &CacheContext, key: &str, output: OutputConfig) -> Result<()> {
    let Some(payload) = context.persistent.pop_payload(key) else {
        bail!("No cached value for '{key}'");
    };

    if output.json(&serde_json::json!({ "key": key, "value": payload }))? {
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// Execute put subcommand
pub fn execute_put(
    context: &CacheContext,
    key: &str,
    value: &str,
    defer: bool,
    output: OutputConfig,
) -> Result<()> {
    let payload: Payload =
        serde_json::from_str(value).with_context(|| format!("Value for '{key}' is not JSON"))?;

    context.persist(key, &payload, defer)?;

    if output.json(&serde_json::json!({ "key": key, "stored": true }))? {
        return Ok(());
    }
    output.status(status::SUCCESS, &format!("Stored '{key}'"));
    Ok(())
}
