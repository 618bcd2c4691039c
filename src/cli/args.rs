//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--repo <path>`: Repository to browse
//! - `--config <path>`: Configuration file to use
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rogit - browse a git repository's refs, trees and history
#[derive(Parser, Debug)]
#[command(name = "rogit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository to browse (defaults to the configured repository, then
    /// the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List branches and tags, newest first
    #[command(
        name = "refs",
        long_about = "List branches and tags, newest first.\n\n\
            Branches are ordered by the committer time of their tip. Annotated \
            tags are ordered by their tagger time, lightweight tags by the \
            committer time of the tagged commit. The branch HEAD points at is \
            marked with an asterisk (*).",
        after_help = "\
EXAMPLES:
    # Everything
    rogit refs

    # Only tags, as JSON
    rogit refs --tags --json"
    )]
    Refs {
        /// Only list branches
        #[arg(long, conflicts_with = "tags")]
        branches: bool,

        /// Only list tags
        #[arg(long)]
        tags: bool,
    },

    /// Show a commit
    #[command(
        name = "show",
        after_help = "\
EXAMPLES:
    rogit show main
    rogit show v1.0
    rogit show HEAD~2
    rogit show 3f2a9c1"
    )]
    Show {
        /// Branch, tag, hash or revision expression
        rev: String,
    },

    /// List the entries of a directory at a revision
    #[command(
        name = "tree",
        after_help = "\
EXAMPLES:
    # Root of HEAD
    rogit tree

    # A subdirectory of a tag
    rogit tree v1.0 src/bin"
    )]
    Tree {
        /// Revision to list (default: HEAD)
        rev: Option<String>,

        /// Directory inside the revision's tree (default: root)
        path: Option<String>,
    },

    /// Show history, optionally limited to a path prefix
    #[command(
        name = "log",
        long_about = "Show commits reachable from a revision, newest first.\n\n\
            With --path, only commits that changed a path starting with the \
            given prefix are shown. The prefix is matched as plain text, so \
            'src' also matches 'srcgen/'. Use 'src/' to match a directory only.",
        after_help = "\
EXAMPLES:
    # Last 10 commits on HEAD
    rogit log

    # Last 5 commits on main touching docs/
    rogit log main --path docs/ -n 5"
    )]
    Log {
        /// Revision to start from (default: HEAD)
        rev: Option<String>,

        /// Only commits touching paths with this prefix
        #[arg(long, value_name = "PREFIX")]
        path: Option<String>,

        /// Maximum number of commits to show
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    rogit completion bash > ~/.local/share/bash-completion/completions/rogit

    # Zsh
    rogit completion zsh > ~/.zfunc/_rogit

    # Fish
    rogit completion fish > ~/.config/fish/completions/rogit.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
