//! cli
//!
//! Command-line interface layer for rogit.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a
//! [`commands::Context`] from the global flags and dispatches. Handlers open
//! the repository, build a [`crate::browse::Browser`] and format its
//! results; all browsing logic lives in [`crate::browse`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::ui::output::{self, Verbosity};
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    output::init_logging(verbosity);

    let ctx = commands::Context {
        repo: cli.repo.clone(),
        config: cli.config.clone(),
        verbosity,
        json: cli.json,
    };

    commands::dispatch(cli.command, &ctx)
}
