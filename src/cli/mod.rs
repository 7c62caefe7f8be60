//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no cache logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::core::context::CacheContext;
use crate::core::global_config::GlobalConfig;
use crate::infra::dirs::CacheDirs;
use commands::Commands;
use output::OutputConfig;

/// pkgcache - Inspect and maintain the persistent package cache
#[derive(Parser, Debug)]
#[command(name = "pkgcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Artifact root (defaults to the configured storage root)
    #[arg(long, global = true, env = "PKGCACHE_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output settings requested on the command line
    pub fn output(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.json)
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = self.output();
        let Some(cmd) = self.command else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            return Ok(());
        };

        let dirs = CacheDirs::new();
        let context = match self.root {
            Some(root) => {
                CacheContext::with_root(root, GlobalConfig::load(&dirs)?.write_behind_config())
            }
            None => CacheContext::load(&dirs)?,
        };
        tracing::debug!("Using cache root {}", context.root().display());

        cmd.run(&context, output)
    }
}
