//! git::store
//!
//! The `ObjectStore` trait: read-only access to a repository's refs and
//! objects.
//!
//! # Design
//!
//! The browse layer never talks to libgit2 directly. Everything it needs
//! (ref enumeration, object reads, revision parsing, changed paths and
//! history traversal) goes through this trait, which has two implementations:
//!
//! - [`crate::git::Git`] - the production store backed by `git2`
//! - [`crate::git::mock::MockStore`] - an in-memory store for tests
//!
//! All methods take `&self` and return `Result`; no method mutates the
//! repository.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use thiserror::Error;

use crate::core::types::{FileMode, ObjectKind, Oid, TypeError};

/// Errors from object store operations.
///
/// The categorization lets the browse layer tell "this object is not what
/// you asked for" (an expected condition during ref classification) apart
/// from genuine read failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: String,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// The object exists but is not a tag object.
    #[error("not a tag object: {oid}")]
    NotATag {
        /// The OID that was inspected
        oid: String,
    },

    /// The object exists but is not a commit.
    #[error("not a commit: {oid} is a {kind}")]
    NotACommit {
        /// The OID that was inspected
        oid: String,
        /// What the object actually is
        kind: String,
    },

    /// The object exists but is not a tree.
    #[error("not a tree: {oid}")]
    NotATree {
        /// The OID that was inspected
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Revision expression could not be resolved.
    #[error("cannot resolve revision '{spec}': {message}")]
    InvalidRevision {
        /// The expression as given
        spec: String,
        /// Why resolution failed
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Whether the error means "no such object / not that kind of object".
    pub fn is_missing_object(&self) -> bool {
        matches!(
            self,
            GitError::ObjectNotFound { .. } | GitError::NotACommit { .. } | GitError::NotATree { .. }
        )
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
        }
    }
}

/// Identity and time of an author, committer or tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Time with the signer's own UTC offset
    pub when: DateTime<FixedOffset>,
}

/// Information about a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// Root tree of the commit
    pub tree: Oid,
    /// Parent commits, empty for a root commit
    pub parents: Vec<Oid>,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message
    pub message: String,
    pub author: Signature,
    pub committer: Signature,
}

/// An annotated tag object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    /// OID of the tag object itself
    pub oid: Oid,
    /// Name recorded inside the tag object
    pub name: String,
    /// Object the tag points at
    pub target: Oid,
    /// Kind of the target object
    pub target_kind: ObjectKind,
    /// Tagger, absent on some very old tags
    pub tagger: Option<Signature>,
    pub message: String,
}

/// One entry of a tree object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub name: String,
    pub mode: FileMode,
    pub oid: Oid,
}

/// How a path changed between a commit and its first parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    /// Kind changed, e.g. file to symlink
    TypeChanged,
}

impl ChangeStatus {
    /// Single-letter code, as in `git show --name-status`.
    pub fn letter(&self) -> char {
        match self {
            ChangeStatus::Added => 'A',
            ChangeStatus::Modified => 'M',
            ChangeStatus::Deleted => 'D',
            ChangeStatus::Renamed => 'R',
            ChangeStatus::Copied => 'C',
            ChangeStatus::TypeChanged => 'T',
        }
    }
}

/// One changed path of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub status: ChangeStatus,
    /// Path after the change (the removed path for deletions)
    pub path: String,
    /// Path before a rename or copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
}

impl Change {
    /// Every path this change touches.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.path.as_str()).chain(self.old_path.as_deref())
    }
}

/// Where a reference points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "target", rename_all = "lowercase")]
pub enum RefTarget {
    /// Points directly at an object.
    Direct(Oid),
    /// Points at another ref by name.
    Symbolic(String),
}

/// A ref with its short name and target.
///
/// Used when enumerating refs in a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// Name without the namespace prefix (`main`, `v1.0`)
    pub name: String,
    /// Full ref name (`refs/heads/main`)
    pub full_name: String,
    pub target: RefTarget,
}

/// Predicate over repository-relative paths, used to filter history.
pub type PathPredicate<'a> = Box<dyn Fn(&str) -> bool + 'a>;

/// Lazy commit sequence produced by [`ObjectStore::walk`].
///
/// Dropping the iterator stops the traversal.
pub type CommitIter<'a> = Box<dyn Iterator<Item = Result<CommitInfo, GitError>> + 'a>;

/// Read-only access to refs and objects of one repository.
pub trait ObjectStore {
    /// List local branch refs (`refs/heads/*`).
    fn branches(&self) -> Result<Vec<RefEntry>, GitError>;

    /// List tag refs (`refs/tags/*`).
    fn tags(&self) -> Result<Vec<RefEntry>, GitError>;

    /// Short name of the branch `HEAD` points at.
    ///
    /// Returns `None` for a detached or unborn `HEAD`.
    fn head_branch(&self) -> Result<Option<String>, GitError>;

    /// Read an annotated tag object.
    ///
    /// Returns [`GitError::NotATag`] when the object exists but is not a tag.
    fn find_tag(&self, oid: &Oid) -> Result<TagInfo, GitError>;

    /// Read a commit object.
    ///
    /// Returns [`GitError::NotACommit`] when the object exists but is not a
    /// commit.
    fn find_commit(&self, oid: &Oid) -> Result<CommitInfo, GitError>;

    /// Read the entries of a tree object, in stored order.
    fn find_tree(&self, oid: &Oid) -> Result<Vec<TreeEntry>, GitError>;

    /// Resolve a revision expression (full or abbreviated hash, `HEAD~2`,
    /// `main^`, ...) to an object id, peeled to a commit where possible.
    fn rev_parse(&self, spec: &str) -> Result<Oid, GitError>;

    /// Paths changed by a commit against its first parent.
    ///
    /// Every path of the tree counts as added for a root commit.
    fn changes(&self, commit: &Oid) -> Result<Vec<Change>, GitError>;

    /// Walk history from `start`, newest first.
    ///
    /// With a predicate, only commits with a changed path (see
    /// [`changes`](Self::changes)) satisfying it are yielded. Without one,
    /// every reachable commit is yielded and no diffs are computed.
    fn walk<'a>(
        &'a self,
        start: &Oid,
        predicate: Option<PathPredicate<'a>>,
    ) -> Result<CommitIter<'a>, GitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_object_classification() {
        assert!(GitError::ObjectNotFound { oid: "a".into() }.is_missing_object());
        assert!(GitError::NotACommit {
            oid: "a".into(),
            kind: "tree".into()
        }
        .is_missing_object());
        assert!(!GitError::Internal {
            message: "disk".into()
        }
        .is_missing_object());
        assert!(!GitError::NotATag { oid: "a".into() }.is_missing_object());
    }

    #[test]
    fn error_display_formatting() {
        let err = GitError::NotACommit {
            oid: "abc".to_string(),
            kind: "tree".to_string(),
        };
        assert_eq!(err.to_string(), "not a commit: abc is a tree");

        let err = GitError::InvalidRevision {
            spec: "nope".to_string(),
            message: "revspec not found".to_string(),
        };
        assert!(err.to_string().contains("'nope'"));
    }

    #[test]
    fn change_paths_include_rename_source() {
        let change = Change {
            status: ChangeStatus::Renamed,
            path: "new.rs".into(),
            old_path: Some("old.rs".into()),
        };
        assert_eq!(change.paths().collect::<Vec<_>>(), ["new.rs", "old.rs"]);
        assert_eq!(change.status.letter(), 'R');

        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["status"], "renamed");
        assert_eq!(json["old_path"], "old.rs");
    }

    #[test]
    fn type_error_converts() {
        let err: GitError = TypeError::InvalidOid("xyz".into()).into();
        assert!(matches!(err, GitError::InvalidOid { .. }));
    }
}
