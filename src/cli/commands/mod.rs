//! CLI command implementations
//!
//! Each command group is implemented in its own submodule.

pub mod cache;
pub mod entry;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::output::OutputConfig;
use crate::core::context::CacheContext;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show artifact root, size and item count
    Info,

    /// List persisted keys
    List {
        /// Only keys starting with this prefix
        prefix: Option<String>,
    },

    /// Print the value stored under a key
    Get {
        /// Cache key
        key: String,
    },

    /// Store a JSON value under a key
    Put {
        /// Cache key
        key: String,

        /// JSON value
        value: String,

        /// Go through the write-behind buffer instead of writing directly
        #[arg(long)]
        defer: bool,
    },

    /// Remove the artifacts around a key
    Clear {
        /// Cache key; its parent directory is cleared
        key: String,
    },

    /// Remove every artifact
    Clean,
}

impl Commands {
    /// Execute the command
    pub fn run(self, context: &CacheContext, output: OutputConfig) -> Result<()> {
        match self {
            Commands::Info => cache::execute_info(context, output),
            Commands::List { prefix } => {
                cache::execute_list(context, prefix.as_deref().unwrap_or(""), output)
            }
            Commands::Get { key } => entry::execute_get(context, &key, output),
            Commands::Put { key, value, defer } => {
                entry::execute_put(context, &key, &value, defer, output)
            }
            Commands::Clear { key } => cache::execute_clear(context, &key, output),
            Commands::Clean => cache::execute_clean(context, output),
        }
    }
}
