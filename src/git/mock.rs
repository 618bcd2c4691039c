//! git::mock
//!
//! In-memory object store for deterministic testing.
//!
//! # Design
//!
//! The mock store provides a deterministic implementation of the
//! [`ObjectStore`] trait. Objects and refs are registered up front, every
//! call is recorded for later verification, and a single operation can be
//! configured to fail.
//!
//! # Example
//!
//! ```
//! use rogit::git::mock::{MockOperation, MockStore};
//! use rogit::git::ObjectStore;
//!
//! let store = MockStore::new();
//! let root = store.commit("root", 1_700_000_000, &[], &["README.md"]);
//! store.add_branch("main", &root.oid);
//!
//! let branches = store.branches().unwrap();
//! assert_eq!(branches[0].name, "main");
//! assert_eq!(store.count(|op| matches!(op, MockOperation::Branches)), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Offset, Utc};

use super::store::{
    Change, ChangeStatus, CommitInfo, CommitIter, GitError, ObjectStore, PathPredicate, RefEntry, RefTarget, Signature,
    TagInfo, TreeEntry,
};
use crate::core::types::{ObjectKind, Oid};

/// Mock object store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockStoreInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockStoreInner {
    commits: HashMap<Oid, CommitInfo>,
    /// Changes made by each commit.
    changes: HashMap<Oid, Vec<Change>>,
    tags: HashMap<Oid, TagInfo>,
    trees: HashMap<Oid, Vec<TreeEntry>>,
    /// Blob ids, so that refs can point at non-commit objects.
    blobs: HashSet<Oid>,
    branch_refs: Vec<RefEntry>,
    tag_refs: Vec<RefEntry>,
    /// Revision expressions understood by `rev_parse`.
    revisions: HashMap<String, Oid>,
    head: Option<String>,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Branches(GitError),
    Tags(GitError),
    FindTag(GitError),
    FindCommit(GitError),
    FindTree(GitError),
    RevParse(GitError),
    Changes(GitError),
    Walk(GitError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Branches,
    Tags,
    HeadBranch,
    FindTag { oid: Oid },
    FindCommit { oid: Oid },
    FindTree { oid: Oid },
    RevParse { spec: String },
    Changes { oid: Oid },
    Walk { start: Oid },
    /// A commit examined during a walk, whether or not it matched.
    Visit { oid: Oid },
}

impl MockStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockStoreInner> {
        // A poisoned lock only happens after a panicking test thread.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deterministic object id derived from a seed string.
    ///
    /// ```
    /// use rogit::git::mock::MockStore;
    ///
    /// assert_eq!(MockStore::oid("a"), MockStore::oid("a"));
    /// assert_ne!(MockStore::oid("a"), MockStore::oid("b"));
    /// ```
    pub fn oid(seed: &str) -> Oid {
        // Two FNV-1a passes with different offsets, 160 bits of output.
        fn fnv(seed: &str, offset: u64) -> u64 {
            seed.bytes().fold(offset, |hash, b| {
                (hash ^ u64::from(b)).wrapping_mul(0x100000001b3)
            })
        }
        let a = fnv(seed, 0xcbf29ce484222325);
        let b = fnv(seed, 0x84222325cbf29ce4);
        let c = fnv(seed, 0x9e3779b97f4a7c15) as u32;
        Oid::new(format!("{:016x}{:016x}{:08x}", a, b, c))
            .unwrap_or_else(|_| unreachable!("formatted id is always 40 hex chars"))
    }

    /// Build a signature at `secs` seconds since the epoch.
    pub fn signature(name: &str, secs: i64) -> Signature {
        Signature {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            when: DateTime::from_timestamp(secs, 0)
                .unwrap_or(DateTime::UNIX_EPOCH)
                .with_timezone(&Utc.fix()),
        }
    }

    /// Register a commit with committer time `secs` that changed `paths`.
    ///
    /// The commit id and its (empty) tree id are derived from `seed`.
    pub fn commit(&self, seed: &str, secs: i64, parents: &[&Oid], paths: &[&str]) -> CommitInfo {
        let commit = CommitInfo {
            oid: Self::oid(seed),
            tree: Self::oid(&format!("tree:{}", seed)),
            parents: parents.iter().map(|p| (*p).clone()).collect(),
            summary: seed.to_string(),
            message: format!("{}\n", seed),
            author: Self::signature("Author", secs),
            committer: Self::signature("Committer", secs),
        };
        self.add_commit(commit.clone(), paths);
        commit
    }

    /// Register an arbitrary commit and the paths it changed.
    ///
    /// Paths are recorded as added for a root commit and modified otherwise;
    /// use [`set_changes`](Self::set_changes) for anything else.
    pub fn add_commit(&self, commit: CommitInfo, paths: &[&str]) {
        let status = if commit.parents.is_empty() {
            ChangeStatus::Added
        } else {
            ChangeStatus::Modified
        };
        let changes = paths
            .iter()
            .map(|p| Change {
                status,
                path: p.to_string(),
                old_path: None,
            })
            .collect();

        let mut inner = self.lock();
        inner.changes.insert(commit.oid.clone(), changes);
        inner.commits.insert(commit.oid.clone(), commit);
    }

    /// Replace the changes recorded for a commit.
    pub fn set_changes(&self, oid: &Oid, changes: Vec<Change>) {
        self.lock().changes.insert(oid.clone(), changes);
    }

    /// Register a tree object.
    pub fn add_tree(&self, oid: &Oid, entries: Vec<TreeEntry>) {
        self.lock().trees.insert(oid.clone(), entries);
    }

    /// Register a blob object.
    pub fn add_blob(&self, oid: &Oid) {
        self.lock().blobs.insert(oid.clone());
    }

    /// Add a branch pointing directly at `oid`.
    pub fn add_branch(&self, name: &str, oid: &Oid) {
        self.lock().branch_refs.push(RefEntry {
            name: name.to_string(),
            full_name: format!("refs/heads/{}", name),
            target: RefTarget::Direct(oid.clone()),
        });
    }

    /// Add a symbolic branch pointing at another ref.
    pub fn add_symbolic_branch(&self, name: &str, target: &str) {
        self.lock().branch_refs.push(RefEntry {
            name: name.to_string(),
            full_name: format!("refs/heads/{}", name),
            target: RefTarget::Symbolic(target.to_string()),
        });
    }

    /// Add a tag ref pointing directly at `oid`.
    pub fn add_lightweight_tag(&self, name: &str, oid: &Oid) {
        self.lock().tag_refs.push(RefEntry {
            name: name.to_string(),
            full_name: format!("refs/tags/{}", name),
            target: RefTarget::Direct(oid.clone()),
        });
    }

    /// Add a symbolic tag ref pointing at another ref.
    pub fn add_symbolic_tag(&self, name: &str, target: &str) {
        self.lock().tag_refs.push(RefEntry {
            name: name.to_string(),
            full_name: format!("refs/tags/{}", name),
            target: RefTarget::Symbolic(target.to_string()),
        });
    }

    /// Create an annotated tag object on `target` and a ref to it.
    pub fn annotated_tag(&self, name: &str, target: &Oid, tagger_secs: Option<i64>) -> TagInfo {
        let tag = self.tag_object(name, target, ObjectKind::Commit, tagger_secs);
        self.add_lightweight_tag(name, &tag.oid);
        tag
    }

    /// Register a tag object without creating a ref for it.
    pub fn tag_object(
        &self,
        name: &str,
        target: &Oid,
        target_kind: ObjectKind,
        tagger_secs: Option<i64>,
    ) -> TagInfo {
        let tag = TagInfo {
            oid: Self::oid(&format!("tag:{}:{}", name, target)),
            name: name.to_string(),
            target: target.clone(),
            target_kind,
            tagger: tagger_secs.map(|secs| Self::signature("Tagger", secs)),
            message: format!("Release {}\n", name),
        };
        self.lock().tags.insert(tag.oid.clone(), tag.clone());
        tag
    }

    /// Teach `rev_parse` an expression such as `main~1`.
    pub fn add_revision(&self, spec: &str, oid: &Oid) {
        self.lock().revisions.insert(spec.to_string(), oid.clone());
    }

    /// Point `HEAD` at a branch.
    pub fn set_head(&self, branch: &str) {
        self.lock().head = Some(branch.to_string());
    }

    /// Configure an operation to fail.
    pub fn fail_on(&self, fail: FailOn) {
        self.lock().fail_on = Some(fail);
    }

    /// Clear failure configuration.
    pub fn clear_fail(&self) {
        self.lock().fail_on = None;
    }

    /// Get recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Count recorded operations matching `pred`.
    pub fn count(&self, pred: impl Fn(&MockOperation) -> bool) -> usize {
        self.lock().operations.iter().filter(|op| pred(op)).count()
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Return the configured error if `select` picks it out.
    fn check_fail(&self, select: impl Fn(&FailOn) -> Option<&GitError>) -> Result<(), GitError> {
        match self.lock().fail_on.as_ref().and_then(select) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn kind_of(inner: &MockStoreInner, oid: &Oid) -> Option<ObjectKind> {
        if inner.commits.contains_key(oid) {
            Some(ObjectKind::Commit)
        } else if inner.tags.contains_key(oid) {
            Some(ObjectKind::Tag)
        } else if inner.trees.contains_key(oid) {
            Some(ObjectKind::Tree)
        } else if inner.blobs.contains(oid) {
            Some(ObjectKind::Blob)
        } else {
            None
        }
    }

    /// All commits reachable from `start`, newest first.
    fn reachable(&self, start: &Oid) -> Vec<Oid> {
        let inner = self.lock();
        let mut seen = HashSet::new();
        let mut stack = vec![start.clone()];
        let mut found = Vec::new();

        while let Some(oid) = stack.pop() {
            if !seen.insert(oid.clone()) {
                continue;
            }
            if let Some(commit) = inner.commits.get(&oid) {
                stack.extend(commit.parents.iter().cloned());
                found.push(commit);
            }
        }

        found.sort_by(|a, b| {
            b.committer
                .when
                .cmp(&a.committer.when)
                .then_with(|| a.oid.cmp(&b.oid))
        });
        found.into_iter().map(|c| c.oid.clone()).collect()
    }
}

impl ObjectStore for MockStore {
    fn branches(&self) -> Result<Vec<RefEntry>, GitError> {
        self.record(MockOperation::Branches);
        self.check_fail(|f| match f {
            FailOn::Branches(e) => Some(e),
            _ => None,
        })?;
        Ok(self.lock().branch_refs.clone())
    }

    fn tags(&self) -> Result<Vec<RefEntry>, GitError> {
        self.record(MockOperation::Tags);
        self.check_fail(|f| match f {
            FailOn::Tags(e) => Some(e),
            _ => None,
        })?;
        Ok(self.lock().tag_refs.clone())
    }

    fn head_branch(&self) -> Result<Option<String>, GitError> {
        self.record(MockOperation::HeadBranch);
        Ok(self.lock().head.clone())
    }

    fn find_tag(&self, oid: &Oid) -> Result<TagInfo, GitError> {
        self.record(MockOperation::FindTag { oid: oid.clone() });
        self.check_fail(|f| match f {
            FailOn::FindTag(e) => Some(e),
            _ => None,
        })?;

        let inner = self.lock();
        if let Some(tag) = inner.tags.get(oid) {
            return Ok(tag.clone());
        }
        match Self::kind_of(&inner, oid) {
            Some(_) => Err(GitError::NotATag {
                oid: oid.to_string(),
            }),
            None => Err(GitError::ObjectNotFound {
                oid: oid.to_string(),
            }),
        }
    }

    fn find_commit(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        self.record(MockOperation::FindCommit { oid: oid.clone() });
        self.check_fail(|f| match f {
            FailOn::FindCommit(e) => Some(e),
            _ => None,
        })?;

        let inner = self.lock();
        if let Some(commit) = inner.commits.get(oid) {
            return Ok(commit.clone());
        }
        match Self::kind_of(&inner, oid) {
            Some(kind) => Err(GitError::NotACommit {
                oid: oid.to_string(),
                kind: kind.to_string(),
            }),
            None => Err(GitError::ObjectNotFound {
                oid: oid.to_string(),
            }),
        }
    }

    fn find_tree(&self, oid: &Oid) -> Result<Vec<TreeEntry>, GitError> {
        self.record(MockOperation::FindTree { oid: oid.clone() });
        self.check_fail(|f| match f {
            FailOn::FindTree(e) => Some(e),
            _ => None,
        })?;

        let inner = self.lock();
        if let Some(entries) = inner.trees.get(oid) {
            return Ok(entries.clone());
        }
        match Self::kind_of(&inner, oid) {
            Some(_) => Err(GitError::NotATree {
                oid: oid.to_string(),
            }),
            None => Err(GitError::ObjectNotFound {
                oid: oid.to_string(),
            }),
        }
    }

    fn rev_parse(&self, spec: &str) -> Result<Oid, GitError> {
        self.record(MockOperation::RevParse {
            spec: spec.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::RevParse(e) => Some(e),
            _ => None,
        })?;

        let inner = self.lock();
        let not_found = || GitError::InvalidRevision {
            spec: spec.to_string(),
            message: "revspec not found".to_string(),
        };

        let mut oid = match inner.revisions.get(spec) {
            Some(oid) => oid.clone(),
            None => {
                let oid = Oid::new(spec).map_err(|_| not_found())?;
                if Self::kind_of(&inner, &oid).is_none() {
                    return Err(not_found());
                }
                oid
            }
        };

        // Peel tags to their target.
        while let Some(tag) = inner.tags.get(&oid) {
            oid = tag.target.clone();
        }
        Ok(oid)
    }

    fn changes(&self, oid: &Oid) -> Result<Vec<Change>, GitError> {
        self.record(MockOperation::Changes { oid: oid.clone() });
        self.check_fail(|f| match f {
            FailOn::Changes(e) => Some(e),
            _ => None,
        })?;

        let inner = self.lock();
        if inner.commits.contains_key(oid) {
            return Ok(inner.changes.get(oid).cloned().unwrap_or_default());
        }
        match Self::kind_of(&inner, oid) {
            Some(kind) => Err(GitError::NotACommit {
                oid: oid.to_string(),
                kind: kind.to_string(),
            }),
            None => Err(GitError::ObjectNotFound {
                oid: oid.to_string(),
            }),
        }
    }

    fn walk<'a>(
        &'a self,
        start: &Oid,
        predicate: Option<PathPredicate<'a>>,
    ) -> Result<CommitIter<'a>, GitError> {
        self.record(MockOperation::Walk {
            start: start.clone(),
        });
        self.check_fail(|f| match f {
            FailOn::Walk(e) => Some(e),
            _ => None,
        })?;
        if !self.lock().commits.contains_key(start) {
            return Err(GitError::ObjectNotFound {
                oid: start.to_string(),
            });
        }

        let order = self.reachable(start);
        let iter = order.into_iter().filter_map(move |oid| {
            self.record(MockOperation::Visit { oid: oid.clone() });
            let inner = self.lock();
            let touched = match &predicate {
                None => true,
                Some(predicate) => inner.changes.get(&oid).is_some_and(|changes| {
                    changes.iter().flat_map(|c| c.paths()).any(|p| predicate(p))
                }),
            };
            if touched {
                inner.commits.get(&oid).cloned().map(Ok)
            } else {
                None
            }
        });

        Ok(Box::new(iter))
    }
}
