//! git
//!
//! Read-only access to the repository's refs and objects.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. The browse layer depends on
//! the [`ObjectStore`] trait, never on `git2`; `git2` is imported by
//! [`interface`] alone.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Branch and tag enumeration
//! - Object reads (tag, commit, tree)
//! - Revision expression parsing
//! - Path-filtered history traversal
//!
//! # Invariants
//!
//! - No operation writes to the repository
//! - All operations return strong types (`Oid`, `FileMode`, `ObjectKind`)
//!
//! # Example
//!
//! ```ignore
//! use rogit::git::{Git, ObjectStore};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for branch in git.branches()? {
//!     println!("{}", branch.name);
//! }
//! ```

mod interface;
pub mod mock;
mod store;

pub use interface::Git;
pub use store::{
    Change, ChangeStatus, CommitInfo, CommitIter, GitError, ObjectStore, PathPredicate, RefEntry, RefTarget, Signature,
    TagInfo, TreeEntry,
};
