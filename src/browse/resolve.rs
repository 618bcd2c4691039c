//! browse::resolve
//!
//! Revision resolution: turn user input into a commit.
//!
//! Resolution order:
//!
//! 1. An indexed ref name (tags win over branches of the same name)
//! 2. A revision expression handed to the object store (full or
//!    abbreviated hash, `HEAD~2`, `main^`, ...)
//!
//! Indexed names never hit the object store.

use tracing::debug;

use super::refs::RefIndex;
use super::BrowseError;
use crate::git::{CommitInfo, ObjectStore};

/// Resolves revision strings against a ref index and an object store.
#[derive(Debug)]
pub struct Resolver<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    index: &'a RefIndex,
}

impl<'a, S: ObjectStore + ?Sized> Resolver<'a, S> {
    pub fn new(store: &'a S, index: &'a RefIndex) -> Self {
        Self { store, index }
    }

    /// Resolve `rev` to a commit.
    ///
    /// # Errors
    ///
    /// - [`BrowseError::RevisionNotFound`] if `rev` is neither an indexed
    ///   name nor a parseable expression naming a commit
    /// - [`BrowseError::ObjectRead`] if the commit exists but cannot be read
    pub fn resolve(&self, rev: &str) -> Result<CommitInfo, BrowseError> {
        if let Some(r) = self.index.get(rev) {
            if self.index.is_ambiguous(rev) {
                debug!(rev, "name is both a branch and a tag, using the tag");
            }
            debug!(rev, kind = %r.kind, oid = %r.commit.oid, "resolved from ref index");
            return Ok(r.commit.clone());
        }

        let oid = self.store.rev_parse(rev).map_err(|err| {
            debug!(rev, error = %err, "revision expression did not parse");
            BrowseError::RevisionNotFound(rev.to_string())
        })?;

        match self.store.find_commit(&oid) {
            Ok(commit) => {
                debug!(rev, oid = %commit.oid, "resolved from revision expression");
                Ok(commit)
            }
            Err(err) if err.is_missing_object() => {
                debug!(rev, error = %err, "expression does not name a commit");
                Err(BrowseError::RevisionNotFound(rev.to_string()))
            }
            Err(source) => Err(BrowseError::ObjectRead {
                oid: oid.to_string(),
                source,
            }),
        }
    }
}
