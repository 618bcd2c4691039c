//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository through [`Context::open`]
//! 2. Calls into [`crate::browse`]
//! 3. Formats and displays output via [`crate::ui::output`]
//!
//! Handlers never write to the repository.

mod completion;
mod log_cmd;
mod refs;
mod show;
mod tree;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use log_cmd::log;
pub use refs::refs;
pub use show::show;
pub use tree::tree;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::browse::{Browser, ScanOptions};
use crate::cli::args::Command;
use crate::core::config::Config;
use crate::git::Git;
use crate::ui::output::Verbosity;

/// Revision used when a command is given none.
pub const DEFAULT_REVISION: &str = "HEAD";

/// Execution context built from global flags.
#[derive(Debug, Clone)]
pub struct Context {
    /// `--repo`
    pub repo: Option<PathBuf>,
    /// `--config`
    pub config: Option<PathBuf>,
    pub verbosity: Verbosity,
    /// `--json`
    pub json: bool,
}

/// An opened, indexed repository and the configuration it was opened with.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub browser: Browser<Git>,
}

impl Context {
    /// Load configuration from `--config` or the standard locations.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref()).context("Failed to load configuration")
    }

    /// Repository path: `--repo`, then the configured repository, then the
    /// current directory.
    pub fn repo_path(&self, config: &Config) -> PathBuf {
        self.repo
            .clone()
            .or_else(|| config.repository().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration, open the repository and build the ref index.
    pub fn open(&self) -> Result<Session> {
        let config = self.load_config()?;
        if let Some(path) = config.loaded_from() {
            debug!(path = %path.display(), "loaded configuration");
        }

        let path = self.repo_path(&config);
        let git = Git::open(&path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;

        let options = ScanOptions {
            strict_refs: config.strict_refs(),
        };
        let browser = Browser::build(git, options).context("Failed to index refs")?;

        Ok(Session { config, browser })
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Refs { branches, tags } => refs::refs(ctx, branches, tags),
        Command::Show { rev } => show::show(ctx, &rev),
        Command::Tree { rev, path } => tree::tree(ctx, rev.as_deref(), path.as_deref()),
        Command::Log { rev, path, limit } => {
            log_cmd::log(ctx, rev.as_deref(), path.as_deref(), limit)
        }
        Command::Completion { shell } => completion::completion(shell),
    }
}
