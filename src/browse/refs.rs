//! browse::refs
//!
//! The ref index: every branch and tag of the repository, classified and
//! ordered by time.
//!
//! # Architecture
//!
//! [`RefIndex::build`] performs the only bulk scan of the repository:
//!
//! 1. Tags: each tag ref is probed as an annotated tag object. Annotated
//!    tags are peeled to their commit and ordered by tagger time;
//!    lightweight tags are ordered by the committer time of their commit.
//! 2. Branches: each direct branch ref is ordered by the committer time of
//!    its commit. Symbolic branch refs are skipped with a warning, or fail
//!    the scan when [`ScanOptions::strict_refs`] is set.
//! 3. Both name sequences are sorted newest first, ties by name.
//!
//! # Invariants
//!
//! - Every [`Ref`] carries a resolved commit
//! - `tag` is `Some` iff the kind is [`RefKind::AnnotatedTag`]
//! - Every indexed name appears in exactly one of the two ordered sequences
//! - The index is never mutated after `build`
//!
//! Branches and tags live in separate namespaces, so a branch and a tag may
//! share a name. Bare-name lookup prefers the tag, matching git's own
//! disambiguation, and every such collision is recorded as a
//! [`ScanWarning::Ambiguous`].

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::BrowseError;
use crate::core::types::{ObjectKind, Oid};
use crate::git::{CommitInfo, GitError, ObjectStore, RefEntry, RefTarget, TagInfo};

/// Classification of a ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// A local branch.
    Branch,
    /// A tag ref pointing directly at a commit.
    LightweightTag,
    /// A tag ref pointing at a tag object.
    AnnotatedTag,
}

impl RefKind {
    /// Get a human-readable description of the kind.
    pub fn description(&self) -> &'static str {
        match self {
            RefKind::Branch => "branch",
            RefKind::LightweightTag => "tag",
            RefKind::AnnotatedTag => "annotated tag",
        }
    }
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A named pointer into history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ref {
    /// Short name (`main`, `v1.0`)
    pub name: String,
    pub kind: RefKind,
    /// Ordering time: tagger time for annotated tags, committer time otherwise
    pub timestamp: DateTime<Utc>,
    /// The tag object, for annotated tags only
    pub tag: Option<TagInfo>,
    /// The commit the ref ultimately points to
    pub commit: CommitInfo,
}

/// Options controlling the ref scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Fail the scan on symbolic refs instead of skipping them.
    pub strict_refs: bool,
}

/// A non-fatal finding recorded while scanning refs.
///
/// Ref names are full names (`refs/tags/v1.0`) except for
/// [`Ambiguous`](Self::Ambiguous), which names the shared short name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ScanWarning {
    /// A symbolic ref was skipped.
    UnsupportedRefKind { name: String, target: String },
    /// A ref whose target is not (and does not peel to) a commit was skipped.
    NonCommitTarget {
        name: String,
        oid: String,
        kind: String,
    },
    /// A branch and a tag share this name; bare lookups return the tag.
    Ambiguous { name: String },
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanWarning::UnsupportedRefKind { name, target } => {
                write!(f, "skipped symbolic ref '{}' -> '{}'", name, target)
            }
            ScanWarning::NonCommitTarget { name, oid, kind } => {
                write!(f, "skipped '{}': points at {} {}", name, kind, oid)
            }
            ScanWarning::Ambiguous { name } => {
                write!(f, "'{}' is both a branch and a tag; using the tag", name)
            }
        }
    }
}

/// Immutable snapshot of all branches and tags.
#[derive(Debug, Clone, Default)]
pub struct RefIndex {
    branches: HashMap<String, Ref>,
    tags: HashMap<String, Ref>,
    /// Tag names, newest first
    tags_by_time: Vec<String>,
    /// Branch names, newest first
    branches_by_time: Vec<String>,
    /// Branch `HEAD` points at
    head: Option<String>,
    warnings: Vec<ScanWarning>,
}

impl RefIndex {
    /// Scan the repository and build the index.
    ///
    /// # Errors
    ///
    /// - [`BrowseError::RefScan`] if any ref or object cannot be read
    /// - [`BrowseError::UnsupportedRefKind`] for a symbolic ref under
    ///   [`ScanOptions::strict_refs`]
    pub fn build<S: ObjectStore + ?Sized>(
        store: &S,
        options: ScanOptions,
    ) -> Result<Self, BrowseError> {
        let mut index = Self::default();

        index.scan_tags(store, options)?;
        index.scan_branches(store, options)?;
        index.record_ambiguity();
        index.sort();

        index.head = store
            .head_branch()
            .map_err(|source| BrowseError::RefScan {
                name: "HEAD".to_string(),
                source,
            })?;

        info!(
            branches = index.branches.len(),
            tags = index.tags.len(),
            warnings = index.warnings.len(),
            "ref index built"
        );

        Ok(index)
    }

    fn scan_tags<S: ObjectStore + ?Sized>(
        &mut self,
        store: &S,
        options: ScanOptions,
    ) -> Result<(), BrowseError> {
        let entries = store.tags().map_err(|source| BrowseError::RefScan {
            name: "refs/tags/*".to_string(),
            source,
        })?;

        for entry in entries {
            let oid = match &entry.target {
                RefTarget::Direct(oid) => oid,
                RefTarget::Symbolic(target) => {
                    self.skip_symbolic(&entry, target, options)?;
                    continue;
                }
            };

            let scanned = match store.find_tag(oid) {
                Ok(tag) => self.annotated(store, &entry, tag)?,
                Err(GitError::NotATag { .. }) => self.direct(store, &entry, oid, RefKind::LightweightTag)?,
                Err(source) => {
                    return Err(BrowseError::RefScan {
                        name: entry.full_name,
                        source,
                    })
                }
            };

            if let Some(r) = scanned {
                debug!(name = %r.name, kind = %r.kind, "indexed tag");
                self.tags_by_time.push(r.name.clone());
                self.tags.insert(r.name.clone(), r);
            }
        }

        Ok(())
    }

    fn scan_branches<S: ObjectStore + ?Sized>(
        &mut self,
        store: &S,
        options: ScanOptions,
    ) -> Result<(), BrowseError> {
        let entries = store.branches().map_err(|source| BrowseError::RefScan {
            name: "refs/heads/*".to_string(),
            source,
        })?;

        for entry in entries {
            let oid = match &entry.target {
                RefTarget::Direct(oid) => oid,
                RefTarget::Symbolic(target) => {
                    self.skip_symbolic(&entry, target, options)?;
                    continue;
                }
            };

            if let Some(r) = self.direct(store, &entry, oid, RefKind::Branch)? {
                debug!(name = %r.name, "indexed branch");
                self.branches_by_time.push(r.name.clone());
                self.branches.insert(r.name.clone(), r);
            }
        }

        Ok(())
    }

    /// Classify an annotated tag, peeling nested tags down to a commit.
    fn annotated<S: ObjectStore + ?Sized>(
        &mut self,
        store: &S,
        entry: &RefEntry,
        tag: TagInfo,
    ) -> Result<Option<Ref>, BrowseError> {
        let scan_err = |source| BrowseError::RefScan {
            name: entry.full_name.clone(),
            source,
        };

        let mut target = tag.target.clone();
        let mut kind = tag.target_kind;
        while kind == ObjectKind::Tag {
            let inner = store.find_tag(&target).map_err(scan_err)?;
            target = inner.target;
            kind = inner.target_kind;
        }

        if kind != ObjectKind::Commit {
            self.warn(ScanWarning::NonCommitTarget {
                name: entry.full_name.clone(),
                oid: target.to_string(),
                kind: kind.to_string(),
            });
            return Ok(None);
        }

        let commit = store.find_commit(&target).map_err(scan_err)?;
        let timestamp = tag
            .tagger
            .as_ref()
            .map(|tagger| tagger.when)
            .unwrap_or(commit.committer.when)
            .with_timezone(&Utc);

        Ok(Some(Ref {
            name: entry.name.clone(),
            kind: RefKind::AnnotatedTag,
            timestamp,
            tag: Some(tag),
            commit,
        }))
    }

    /// Classify a ref that points straight at a commit.
    fn direct<S: ObjectStore + ?Sized>(
        &mut self,
        store: &S,
        entry: &RefEntry,
        oid: &Oid,
        kind: RefKind,
    ) -> Result<Option<Ref>, BrowseError> {
        match store.find_commit(oid) {
            Ok(commit) => Ok(Some(Ref {
                name: entry.name.clone(),
                kind,
                timestamp: commit.committer.when.with_timezone(&Utc),
                tag: None,
                commit,
            })),
            Err(GitError::NotACommit { kind, .. }) => {
                self.warn(ScanWarning::NonCommitTarget {
                    name: entry.full_name.clone(),
                    oid: oid.to_string(),
                    kind,
                });
                Ok(None)
            }
            Err(source) => Err(BrowseError::RefScan {
                name: entry.full_name.clone(),
                source,
            }),
        }
    }

    fn skip_symbolic(
        &mut self,
        entry: &RefEntry,
        target: &str,
        options: ScanOptions,
    ) -> Result<(), BrowseError> {
        if options.strict_refs {
            return Err(BrowseError::UnsupportedRefKind {
                name: entry.full_name.clone(),
                target: target.to_string(),
            });
        }
        self.warn(ScanWarning::UnsupportedRefKind {
            name: entry.full_name.clone(),
            target: target.to_string(),
        });
        Ok(())
    }

    fn record_ambiguity(&mut self) {
        let mut shared: Vec<String> = self
            .tags
            .keys()
            .filter(|name| self.branches.contains_key(*name))
            .cloned()
            .collect();
        shared.sort();

        for name in shared {
            self.warn(ScanWarning::Ambiguous { name });
        }
    }

    fn warn(&mut self, warning: ScanWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn sort(&mut self) {
        sort_by_time(&mut self.tags_by_time, &self.tags);
        sort_by_time(&mut self.branches_by_time, &self.branches);
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Look up a ref by bare name; the tag wins if a branch shares the name.
    pub fn get(&self, name: &str) -> Option<&Ref> {
        self.tags.get(name).or_else(|| self.branches.get(name))
    }

    /// Look up a branch.
    pub fn branch(&self, name: &str) -> Option<&Ref> {
        self.branches.get(name)
    }

    /// Look up a tag.
    pub fn tag(&self, name: &str) -> Option<&Ref> {
        self.tags.get(name)
    }

    /// Whether `name` is both a branch and a tag.
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.tags.contains_key(name) && self.branches.contains_key(name)
    }

    /// Tag names, newest first.
    pub fn tags_by_time(&self) -> &[String] {
        &self.tags_by_time
    }

    /// Branch names, newest first.
    pub fn branches_by_time(&self) -> &[String] {
        &self.branches_by_time
    }

    /// Tags, newest first.
    pub fn tags(&self) -> impl Iterator<Item = &Ref> {
        self.tags_by_time.iter().filter_map(|name| self.tags.get(name))
    }

    /// Branches, newest first.
    pub fn branches(&self) -> impl Iterator<Item = &Ref> {
        self.branches_by_time
            .iter()
            .filter_map(|name| self.branches.get(name))
    }

    /// Name of the branch `HEAD` points at, if any.
    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    /// Findings recorded during the scan.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Total number of indexed refs across both namespaces.
    pub fn len(&self) -> usize {
        self.branches.len() + self.tags.len()
    }

    /// Check if no refs were indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sort names by their ref's timestamp, newest first, then by name.
fn sort_by_time(names: &mut [String], refs: &HashMap<String, Ref>) {
    names.sort_by_cached_key(|name| {
        (
            Reverse(refs.get(name).map(|r| r.timestamp)),
            name.clone(),
        )
    });
}
