//! browse
//!
//! The browsing core: ref index, revision resolution, tree listings and
//! path-filtered history over an [`ObjectStore`].
//!
//! # Architecture
//!
//! A [`Browser`] owns one object store and the [`RefIndex`] built from it.
//! The entry point constructs it once and hands out references; every
//! request-scoped operation borrows it immutably, so a single `Browser` can
//! serve concurrent readers when the store allows it.
//!
//! ```text
//! Browser::build ──► RefIndex::build   (one bulk scan, fatal on error)
//!       │
//!       ├── resolve    ──► Resolver      (index first, then rev_parse)
//!       ├── list_tree  ──► TreeLister
//!       ├── changes    ──► ObjectStore::changes
//!       └── walk       ──► HistoryWalker (lazy, bounded)
//! ```
//!
//! # Example
//!
//! ```
//! use rogit::browse::{Browser, ScanOptions};
//! use rogit::git::mock::MockStore;
//!
//! let store = MockStore::new();
//! let root = store.commit("root", 1_700_000_000, &[], &["README.md"]);
//! store.add_branch("main", &root.oid);
//!
//! let browser = Browser::build(store, ScanOptions::default()).unwrap();
//! let commit = browser.resolve("main").unwrap();
//! assert_eq!(commit.oid, root.oid);
//! ```

pub mod history;
pub mod refs;
pub mod resolve;
pub mod tree;

pub use history::{prefix_predicate, HistoryWalker};
pub use refs::{Ref, RefIndex, RefKind, ScanOptions, ScanWarning};
pub use resolve::Resolver;
pub use tree::{TreeLister, TreeListing};

use thiserror::Error;

use crate::core::types::Oid;
use crate::git::{Change, CommitInfo, GitError, ObjectStore};

/// Errors from browse operations.
#[derive(Debug, Error)]
pub enum BrowseError {
    /// A ref or its target could not be read while building the index.
    #[error("failed to scan ref '{name}': {source}")]
    RefScan {
        name: String,
        #[source]
        source: GitError,
    },

    /// A symbolic ref was found with strict ref scanning enabled.
    #[error("unsupported ref '{name}': symbolic ref to '{target}'")]
    UnsupportedRefKind { name: String, target: String },

    /// The revision names no commit.
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    /// An object exists but could not be read.
    #[error("failed to read object {oid}: {source}")]
    ObjectRead {
        oid: String,
        #[source]
        source: GitError,
    },

    /// A path inside a tree does not exist or is not a directory.
    #[error("path not found: {path}")]
    PathNotFound { path: String },
}

impl BrowseError {
    /// Whether the error means the requested thing does not exist, as
    /// opposed to a failure reading something that does.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BrowseError::RevisionNotFound(_) | BrowseError::PathNotFound { .. }
        )
    }
}

/// One repository, opened and indexed.
#[derive(Debug)]
pub struct Browser<S: ObjectStore> {
    store: S,
    index: RefIndex,
}

impl<S: ObjectStore> Browser<S> {
    /// Scan `store` and take ownership of it.
    ///
    /// # Errors
    ///
    /// Any error from [`RefIndex::build`]. These are fatal: a browser is
    /// never constructed over a partially scanned repository.
    pub fn build(store: S, options: ScanOptions) -> Result<Self, BrowseError> {
        let index = RefIndex::build(&store, options)?;
        Ok(Self { store, index })
    }

    pub fn index(&self) -> &RefIndex {
        &self.index
    }

    /// Resolve a ref name or revision expression to a commit.
    pub fn resolve(&self, rev: &str) -> Result<CommitInfo, BrowseError> {
        Resolver::new(&self.store, &self.index).resolve(rev)
    }

    /// Paths `commit` changed against its first parent.
    pub fn changes(&self, commit: &CommitInfo) -> Result<Vec<Change>, BrowseError> {
        self.store
            .changes(&commit.oid)
            .map_err(|source| BrowseError::ObjectRead {
                oid: commit.oid.to_string(),
                source,
            })
    }

    /// List one tree level.
    pub fn list_tree(&self, tree: &Oid) -> Result<TreeListing, BrowseError> {
        TreeLister::new(&self.store).list(tree)
    }

    /// List the directory at `path` in `commit`.
    pub fn list_path(&self, commit: &CommitInfo, path: &str) -> Result<TreeListing, BrowseError> {
        TreeLister::new(&self.store).list_path(commit, path)
    }

    /// Up to `limit` commits from `start` that touched a path starting with
    /// `prefix`, newest first.
    pub fn walk<'a>(
        &'a self,
        start: &CommitInfo,
        prefix: &str,
        limit: usize,
    ) -> Result<impl Iterator<Item = Result<CommitInfo, BrowseError>> + 'a, BrowseError> {
        HistoryWalker::new(&self.store).walk_prefix(start, prefix, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FileMode;
    use crate::git::mock::{FailOn, MockStore};
    use crate::git::TreeEntry;

    fn browser() -> (Browser<MockStore>, MockStore, CommitInfo) {
        let store = MockStore::new();
        let a = store.commit("a", 100, &[], &["src/lib.rs"]);
        let b = store.commit("b", 200, &[&a.oid], &["docs/x.md"]);
        store.add_tree(
            &b.tree,
            vec![
                TreeEntry {
                    name: "b.txt".into(),
                    mode: FileMode::Blob,
                    oid: MockStore::oid("b.txt"),
                },
                TreeEntry {
                    name: "a".into(),
                    mode: FileMode::Tree,
                    oid: MockStore::oid("a"),
                },
                TreeEntry {
                    name: "a.txt".into(),
                    mode: FileMode::Blob,
                    oid: MockStore::oid("a.txt"),
                },
            ],
        );
        store.add_branch("main", &b.oid);
        store.set_head("main");

        let browser = Browser::build(store.clone(), ScanOptions::default()).unwrap();
        (browser, store, b)
    }

    #[test]
    fn end_to_end_over_mock() {
        let (browser, _, head) = browser();

        assert_eq!(browser.index().head(), Some("main"));

        let commit = browser.resolve("main").unwrap();
        assert_eq!(commit, head);

        let listing = browser.list_tree(&commit.tree).unwrap();
        let dirs: Vec<&str> = listing.directories.iter().map(|e| e.name.as_str()).collect();
        let files: Vec<&str> = listing.files.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(dirs, ["a"]);
        assert_eq!(files, ["a.txt", "b.txt"]);

        let history: Vec<CommitInfo> = browser
            .walk(&commit, "src", 10)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].summary, "a");
    }

    #[test]
    fn walk_is_deterministic() {
        let (browser, _, head) = browser();

        let run = || -> Vec<Oid> {
            browser
                .walk(&head, "", 10)
                .unwrap()
                .map(|r| r.unwrap().oid)
                .collect()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn changes_of_commit() {
        let (browser, store, head) = browser();

        let changes = browser.changes(&head).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "docs/x.md");

        store.fail_on(FailOn::Changes(GitError::Internal {
            message: "diff".into(),
        }));
        assert!(matches!(
            browser.changes(&head),
            Err(BrowseError::ObjectRead { .. })
        ));
    }

    #[test]
    fn not_found_classification() {
        assert!(BrowseError::RevisionNotFound("x".into()).is_not_found());
        assert!(BrowseError::PathNotFound { path: "x".into() }.is_not_found());
        assert!(!BrowseError::ObjectRead {
            oid: "x".into(),
            source: GitError::Internal {
                message: "io".into()
            },
        }
        .is_not_found());
        assert!(!BrowseError::UnsupportedRefKind {
            name: "refs/heads/x".into(),
            target: "refs/heads/y".into(),
        }
        .is_not_found());
    }

    #[test]
    fn browser_is_shareable_across_threads() {
        let (browser, _, _) = browser();
        let browser = std::sync::Arc::new(browser);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let browser = browser.clone();
                std::thread::spawn(move || browser.resolve("main").map(|c| c.summary))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "b");
        }
    }
}
