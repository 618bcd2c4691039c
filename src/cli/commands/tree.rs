//! tree command - List one directory level at a revision

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{Context, DEFAULT_REVISION};
use crate::browse::TreeListing;
use crate::core::types::Oid;
use crate::ui::output;

#[derive(Debug, Serialize)]
struct TreeReport<'a> {
    rev: &'a str,
    commit: &'a Oid,
    path: &'a str,
    #[serde(flatten)]
    listing: &'a TreeListing,
}

/// List the directory `path` (default: root) of `rev` (default: `HEAD`).
pub fn tree(ctx: &Context, rev: Option<&str>, path: Option<&str>) -> Result<()> {
    let rev = rev.unwrap_or(DEFAULT_REVISION);
    let path = path.unwrap_or("");

    let session = ctx.open()?;
    let browser = &session.browser;

    let commit = browser
        .resolve(rev)
        .with_context(|| format!("Cannot list tree of '{}'", rev))?;
    let listing = browser
        .list_path(&commit, path)
        .with_context(|| format!("Cannot list '{}' at '{}'", path, rev))?;

    if ctx.json {
        output::json(&TreeReport {
            rev,
            commit: &commit.oid,
            path,
            listing: &listing,
        })?;
        return Ok(());
    }

    if listing.is_empty() {
        output::print("(empty tree)", ctx.verbosity);
    } else {
        println!("{}", output::format_tree(&listing));
    }

    Ok(())
}
