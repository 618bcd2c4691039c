//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.
//!
//! Diagnostics go through `tracing` to stderr; [`init_logging`] installs the
//! subscriber once per process. User-facing messages go through the print
//! helpers below.

use std::fmt::Display;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::browse::{Ref, TreeListing};
use crate::core::types::FileMode;
use crate::git::{Change, CommitInfo, TreeEntry};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default `tracing` filter directive for this level.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "off",
            Verbosity::Normal => "error",
            Verbosity::Debug => "rogit=debug,warn",
        }
    }
}

/// Install the stderr `tracing` subscriber.
///
/// `RUST_LOG` overrides the level implied by `verbosity`. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print `value` as pretty JSON on stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line for a changed path, in the layout of `git show --name-status`.
pub fn format_change(change: &Change) -> String {
    match &change.old_path {
        Some(old) => format!("{}\t{}\t{}", change.status.letter(), old, change.path),
        None => format!("{}\t{}", change.status.letter(), change.path),
    }
}

/// One line for a ref: HEAD marker, name, kind, date, short hash, summary.
///
/// `width` pads the name column.
pub fn format_ref(r: &Ref, is_head: bool, width: usize) -> String {
    format!(
        "{} {:<width$}  {:<13}  {}  {}  {}",
        if is_head { "*" } else { " " },
        r.name,
        r.kind.description(),
        r.timestamp.format("%Y-%m-%d"),
        r.commit.oid.short(7),
        r.commit.summary,
        width = width,
    )
}

/// One line for a commit: short hash, date, author, summary.
pub fn format_commit_line(commit: &CommitInfo) -> String {
    format!(
        "{}  {}  {}  {}",
        commit.oid.short(7),
        commit.committer.when.format("%Y-%m-%d"),
        commit.author.name,
        commit.summary
    )
}

/// A commit in full, in the layout of `git show --no-patch`.
pub fn format_commit(commit: &CommitInfo) -> String {
    let mut out = format!("commit {}\n", commit.oid);
    if commit.parents.len() > 1 {
        let parents: Vec<&str> = commit.parents.iter().map(|p| p.short(7)).collect();
        out.push_str(&format!("Merge: {}\n", parents.join(" ")));
    }
    out.push_str(&format!(
        "Author: {} <{}>\nDate:   {}\n\n",
        commit.author.name,
        commit.author.email,
        commit.author.when.format("%a %b %e %H:%M:%S %Y %z")
    ));
    for line in commit.message.trim_end().lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// One line for a tree entry, in the layout of `git ls-tree`.
///
/// Directories get a trailing `/`.
pub fn format_tree_entry(entry: &TreeEntry) -> String {
    let kind = match entry.mode {
        FileMode::Tree => "tree",
        FileMode::Commit => "commit",
        _ => "blob",
    };
    let suffix = if entry.mode == FileMode::Tree { "/" } else { "" };
    format!("{} {} {}\t{}{}", entry.mode, kind, entry.oid, entry.name, suffix)
}

/// All entries of a listing, directories first.
pub fn format_tree(listing: &TreeListing) -> String {
    listing
        .entries()
        .map(format_tree_entry)
        .collect::<Vec<_>>()
        .join("\n")
}
