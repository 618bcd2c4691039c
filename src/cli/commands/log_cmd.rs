//! log command - Bounded, path-filtered history
//!
//! The prefix and limit fall back to the `[log]` section of the config
//! file, then to matching everything and [`DEFAULT_LOG_LIMIT`] commits.
//!
//! [`DEFAULT_LOG_LIMIT`]: crate::core::config::DEFAULT_LOG_LIMIT

use anyhow::{bail, Context as _, Result};

use super::{Context, DEFAULT_REVISION};
use crate::git::CommitInfo;
use crate::ui::output;

/// Show up to `limit` commits reachable from `rev` touching `path`.
pub fn log(
    ctx: &Context,
    rev: Option<&str>,
    path: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    if limit == Some(0) {
        bail!("--limit must be at least 1");
    }

    let rev = rev.unwrap_or(DEFAULT_REVISION);
    let session = ctx.open()?;
    let browser = &session.browser;

    let prefix = path.unwrap_or_else(|| session.config.log_path_prefix());
    let limit = limit.unwrap_or_else(|| session.config.log_limit());

    let start = browser
        .resolve(rev)
        .with_context(|| format!("Cannot show history of '{}'", rev))?;

    let commits: Vec<CommitInfo> = browser
        .walk(&start, prefix, limit)?
        .collect::<Result<_, _>>()
        .with_context(|| format!("Failed while walking history of '{}'", rev))?;

    if ctx.json {
        output::json(&commits)?;
        return Ok(());
    }

    if commits.is_empty() {
        if prefix.is_empty() {
            output::print("No commits.", ctx.verbosity);
        } else {
            output::print(
                format!("No commits touching '{}'.", prefix),
                ctx.verbosity,
            );
        }
        return Ok(());
    }

    for commit in &commits {
        println!("{}", output::format_commit_line(commit));
    }

    Ok(())
}
