//! git::interface
//!
//! Object store implementation using git2.
//!
//! This module is the **single doorway** to libgit2. No other module
//! imports `git2`; everything else sees the [`ObjectStore`] trait and the
//! plain data types in [`super::store`].
//!
//! # Error Handling
//!
//! git2 errors are normalized into [`GitError`] variants. Object kind
//! mismatches are reported explicitly (`NotATag`, `NotACommit`,
//! `NotATree`) so that callers can classify refs without string matching.
//!
//! # Example
//!
//! ```ignore
//! use rogit::git::{Git, ObjectStore};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let oid = git.rev_parse("HEAD~1")?;
//! let commit = git.find_commit(&oid)?;
//! println!("{} {}", oid.short(7), commit.summary);
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};

use super::store::{
    Change, ChangeStatus, CommitInfo, CommitIter, GitError, ObjectStore, PathPredicate, RefEntry, RefTarget, Signature,
    TagInfo, TreeEntry,
};
use crate::core::types::{FileMode, ObjectKind, Oid};

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// The git2-backed object store.
///
/// Opens a repository once and serves every read through it. `Git` is
/// `Send` but not `Sync`: share the built index between threads, and open
/// one `Git` per worker.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within a working tree, or a bare repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.display().to_string(),
        })?;

        Ok(Self { repo })
    }

    /// Working directory, `None` for a bare repository.
    pub fn work_dir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// List refs under `prefix`, keyed by their name with the prefix removed.
    fn list_refs(&self, prefix: &str) -> Result<Vec<RefEntry>, GitError> {
        let pattern = format!("{}*", prefix);
        let refs = self
            .repo
            .references_glob(&pattern)
            .map_err(|e| GitError::from_git2(e, prefix))?;

        let mut entries = Vec::new();
        for reference in refs {
            let reference = reference?;

            // Skip refs with non-UTF8 names
            let Some(full_name) = reference.name() else {
                continue;
            };
            let Some(name) = full_name.strip_prefix(prefix) else {
                continue;
            };

            let target = match reference.kind() {
                Some(git2::ReferenceType::Direct) => match reference.target() {
                    Some(id) => RefTarget::Direct(to_oid(id)?),
                    None => continue,
                },
                _ => RefTarget::Symbolic(reference.symbolic_target().unwrap_or("").to_string()),
            };

            entries.push(RefEntry {
                name: name.to_string(),
                full_name: full_name.to_string(),
                target,
            });
        }

        Ok(entries)
    }

    /// Look up any object by id.
    fn find_object(&self, oid: &Oid) -> Result<git2::Object<'_>, GitError> {
        let id = to_git2(oid)?;
        self.repo
            .find_object(id, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }
}

impl ObjectStore for Git {
    fn branches(&self) -> Result<Vec<RefEntry>, GitError> {
        self.list_refs("refs/heads/")
    }

    fn tags(&self) -> Result<Vec<RefEntry>, GitError> {
        self.list_refs("refs/tags/")
    }

    fn head_branch(&self) -> Result<Option<String>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                return Ok(None)
            }
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if head.is_branch() {
            return Ok(head.shorthand().map(String::from));
        }

        Ok(None) // Detached HEAD
    }

    fn find_tag(&self, oid: &Oid) -> Result<TagInfo, GitError> {
        let tag = self
            .find_object(oid)?
            .into_tag()
            .map_err(|_| GitError::NotATag {
                oid: oid.to_string(),
            })?;

        let target_kind = tag
            .target_type()
            .and_then(object_kind)
            .ok_or_else(|| GitError::Internal {
                message: format!("tag {} has an unknown target type", oid),
            })?;

        Ok(TagInfo {
            oid: oid.clone(),
            name: tag.name().unwrap_or("").to_string(),
            target: to_oid(tag.target_id())?,
            target_kind,
            tagger: tag.tagger().map(|s| signature(&s)),
            message: tag.message().unwrap_or("").to_string(),
        })
    }

    fn find_commit(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let object = self.find_object(oid)?;
        let kind = object.kind();
        let commit = object.into_commit().map_err(|_| GitError::NotACommit {
            oid: oid.to_string(),
            kind: kind.map(|k| k.str()).unwrap_or("unknown").to_string(),
        })?;

        commit_info(&commit)
    }

    fn find_tree(&self, oid: &Oid) -> Result<Vec<TreeEntry>, GitError> {
        let tree = self
            .find_object(oid)?
            .into_tree()
            .map_err(|_| GitError::NotATree {
                oid: oid.to_string(),
            })?;

        let mut entries = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            entries.push(TreeEntry {
                name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                mode: FileMode::from_raw(entry.filemode()),
                oid: to_oid(entry.id())?,
            });
        }

        Ok(entries)
    }

    fn rev_parse(&self, spec: &str) -> Result<Oid, GitError> {
        let object = self
            .repo
            .revparse_single(spec)
            .map_err(|e| GitError::InvalidRevision {
                spec: spec.to_string(),
                message: e.message().to_string(),
            })?;

        // Tags resolve to the commit they name; anything else is left as-is
        // for the caller to reject.
        let id = match object.peel(git2::ObjectType::Commit) {
            Ok(commit) => commit.id(),
            Err(_) => object.id(),
        };

        to_oid(id)
    }

    fn changes(&self, oid: &Oid) -> Result<Vec<Change>, GitError> {
        let object = self.find_object(oid)?;
        let kind = object.kind();
        let commit = object.into_commit().map_err(|_| GitError::NotACommit {
            oid: oid.to_string(),
            kind: kind.map(|k| k.str()).unwrap_or("unknown").to_string(),
        })?;

        let mut diff = first_parent_diff(&self.repo, &commit)?;
        let mut renames = git2::DiffFindOptions::new();
        renames.renames(true);
        diff.find_similar(Some(&mut renames))?;

        Ok(diff.deltas().filter_map(|delta| change(&delta)).collect())
    }

    fn walk<'a>(
        &'a self,
        start: &Oid,
        predicate: Option<PathPredicate<'a>>,
    ) -> Result<CommitIter<'a>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TIME)?;
        revwalk
            .push(to_git2(start)?)
            .map_err(|e| GitError::from_git2(e, start.as_str()))?;

        Ok(Box::new(History {
            repo: &self.repo,
            revwalk,
            predicate,
        }))
    }
}

/// History iterator over a git2 revwalk, optionally path-filtered.
struct History<'r> {
    repo: &'r git2::Repository,
    revwalk: git2::Revwalk<'r>,
    /// `None` yields every commit without diffing
    predicate: Option<PathPredicate<'r>>,
}

impl History<'_> {
    /// Return the commit if any path it changed satisfies the predicate.
    fn matching(&self, id: git2::Oid) -> Result<Option<CommitInfo>, GitError> {
        let commit = self.repo.find_commit(id)?;
        let Some(predicate) = &self.predicate else {
            return Ok(Some(commit_info(&commit)?));
        };

        let diff = first_parent_diff(self.repo, &commit)?;
        let touched = diff.deltas().any(|delta| {
            [delta.old_file().path(), delta.new_file().path()]
                .into_iter()
                .flatten()
                .filter_map(Path::to_str)
                .any(|path| predicate(path))
        });

        if touched {
            Ok(Some(commit_info(&commit)?))
        } else {
            Ok(None)
        }
    }
}

impl Iterator for History<'_> {
    type Item = Result<CommitInfo, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = match self.revwalk.next()? {
                Ok(id) => id,
                Err(e) => return Some(Err(e.into())),
            };

            match self.matching(id) {
                Ok(Some(info)) => return Some(Ok(info)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Diff a commit's tree against its first parent's (empty for a root commit).
fn first_parent_diff<'r>(
    repo: &'r git2::Repository,
    commit: &git2::Commit<'_>,
) -> Result<git2::Diff<'r>, GitError> {
    let tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    Ok(repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?)
}

/// Convert a tree-to-tree delta. Statuses that cannot occur between two
/// trees (ignored, untracked, conflicted...) are dropped.
fn change(delta: &git2::DiffDelta<'_>) -> Option<Change> {
    let status = match delta.status() {
        git2::Delta::Added => ChangeStatus::Added,
        git2::Delta::Modified => ChangeStatus::Modified,
        git2::Delta::Deleted => ChangeStatus::Deleted,
        git2::Delta::Renamed => ChangeStatus::Renamed,
        git2::Delta::Copied => ChangeStatus::Copied,
        git2::Delta::Typechange => ChangeStatus::TypeChanged,
        _ => return None,
    };

    let path_of = |file: git2::DiffFile<'_>| file.path().map(|p| p.to_string_lossy().into_owned());
    let old = path_of(delta.old_file());
    let new = path_of(delta.new_file());

    let (path, old_path) = match status {
        ChangeStatus::Deleted => (old?, None),
        ChangeStatus::Renamed | ChangeStatus::Copied => (new?, old),
        _ => (new.or(old)?, None),
    };

    Some(Change {
        status,
        path,
        old_path,
    })
}

fn to_oid(id: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(id.to_string()).map_err(|e| e.into())
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

fn object_kind(kind: git2::ObjectType) -> Option<ObjectKind> {
    match kind {
        git2::ObjectType::Commit => Some(ObjectKind::Commit),
        git2::ObjectType::Tree => Some(ObjectKind::Tree),
        git2::ObjectType::Blob => Some(ObjectKind::Blob),
        git2::ObjectType::Tag => Some(ObjectKind::Tag),
        _ => None,
    }
}

fn signature(sig: &git2::Signature<'_>) -> Signature {
    let offset = FixedOffset::east_opt(sig.when().offset_minutes() * 60).unwrap_or(Utc.fix());
    let when = DateTime::from_timestamp(sig.when().seconds(), 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&offset);

    Signature {
        name: sig.name().unwrap_or("").to_string(),
        email: sig.email().unwrap_or("").to_string(),
        when,
    }
}

fn commit_info(commit: &git2::Commit<'_>) -> Result<CommitInfo, GitError> {
    let parents = commit
        .parent_ids()
        .map(to_oid)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CommitInfo {
        oid: to_oid(commit.id())?,
        tree: to_oid(commit.tree_id())?,
        parents,
        summary: commit.summary().unwrap_or("").to_string(),
        message: commit.message().unwrap_or("").to_string(),
        author: signature(&commit.author()),
        committer: signature(&commit.committer()),
    })
}
