//! refs command - List branches and tags, newest first
//!
//! Scan warnings (skipped symbolic refs, non-commit tags, names shared by
//! a branch and a tag) are reported on stderr, or included in the JSON
//! document with `--json`.

use anyhow::Result;
use serde::Serialize;

use super::Context;
use crate::browse::{Ref, RefIndex, ScanWarning};
use crate::ui::output;

#[derive(Debug, Serialize)]
struct RefsReport<'a> {
    head: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branches: Option<Vec<&'a Ref>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<&'a Ref>>,
    warnings: &'a [ScanWarning],
}

/// List refs.
///
/// `only_branches` and `only_tags` restrict the output to one namespace.
pub fn refs(ctx: &Context, only_branches: bool, only_tags: bool) -> Result<()> {
    let session = ctx.open()?;
    let index = session.browser.index();

    let show_branches = !only_tags;
    let show_tags = !only_branches;

    if ctx.json {
        let report = RefsReport {
            head: index.head(),
            branches: show_branches.then(|| index.branches().collect()),
            tags: show_tags.then(|| index.tags().collect()),
            warnings: index.warnings(),
        };
        output::json(&report)?;
        return Ok(());
    }

    for warning in index.warnings() {
        output::warn(warning, ctx.verbosity);
    }

    if index.is_empty() {
        output::print("No branches or tags.", ctx.verbosity);
        return Ok(());
    }

    let width = name_width(index);

    if show_branches {
        print_section("Branches", index.branches(), index.head(), width);
    }
    if show_branches && show_tags {
        println!();
    }
    if show_tags {
        print_section("Tags", index.tags(), None, width);
    }

    Ok(())
}

fn print_section<'a>(
    title: &str,
    refs: impl Iterator<Item = &'a Ref>,
    head: Option<&str>,
    width: usize,
) {
    println!("{}:", title);
    let mut any = false;
    for r in refs {
        any = true;
        let is_head = head == Some(r.name.as_str());
        println!("{}", output::format_ref(r, is_head, width));
    }
    if !any {
        println!("  (none)");
    }
}

/// Widest ref name, for column alignment.
fn name_width(index: &RefIndex) -> usize {
    index
        .branches()
        .chain(index.tags())
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
}
