//! show command - Display a single commit
//!
//! For an annotated tag the tag object is shown before the commit, the
//! way `git show <tag>` does. The commit is followed by the paths it
//! changed against its first parent, as `git show --name-status` lists them.

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::Context;
use crate::git::{Change, CommitInfo, TagInfo};
use crate::ui::output;

#[derive(Debug, Serialize)]
struct ShowReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a TagInfo>,
    commit: &'a CommitInfo,
    changes: &'a [Change],
}

/// Resolve `rev` and print the commit it names.
pub fn show(ctx: &Context, rev: &str) -> Result<()> {
    let session = ctx.open()?;
    let browser = &session.browser;

    let commit = browser
        .resolve(rev)
        .with_context(|| format!("Cannot show '{}'", rev))?;
    let tag = browser.index().get(rev).and_then(|r| r.tag.as_ref());
    let changes = browser
        .changes(&commit)
        .with_context(|| format!("Cannot list changes of '{}'", rev))?;

    if ctx.json {
        output::json(&ShowReport {
            tag,
            commit: &commit,
            changes: &changes,
        })?;
        return Ok(());
    }

    if let Some(tag) = tag {
        println!("{}", format_tag(tag));
    }
    print!("{}", output::format_commit(&commit));
    if !changes.is_empty() {
        println!();
        for change in &changes {
            println!("{}", output::format_change(change));
        }
    }

    Ok(())
}

fn format_tag(tag: &TagInfo) -> String {
    let mut out = format!("tag {}\n", tag.name);
    if let Some(tagger) = &tag.tagger {
        out.push_str(&format!(
            "Tagger: {} <{}>\nDate:   {}\n",
            tagger.name,
            tagger.email,
            tagger.when.format("%a %b %e %H:%M:%S %Y %z")
        ));
    }
    out.push('\n');
    out.push_str(tag.message.trim_end());
    out.push('\n');
    out
}
