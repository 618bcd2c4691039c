//! browse::tree
//!
//! Directory listings of tree objects.
//!
//! A listing is partitioned by entry mode:
//!
//! - `directories` - subtrees
//! - `files` - regular, non-executable blobs
//! - `others` - executables, symlinks, submodules and unrecognized modes
//!
//! Each group is sorted by name in byte order, so listings are stable
//! regardless of how the tree object stores its entries.

use serde::Serialize;
use tracing::debug;

use super::BrowseError;
use crate::core::types::{FileMode, Oid};
use crate::git::{CommitInfo, ObjectStore, TreeEntry};

/// The entries of one tree, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeListing {
    pub directories: Vec<TreeEntry>,
    pub files: Vec<TreeEntry>,
    pub others: Vec<TreeEntry>,
}

impl TreeListing {
    /// Partition and sort raw tree entries.
    pub fn from_entries(entries: impl IntoIterator<Item = TreeEntry>) -> Self {
        let mut listing = Self::default();
        for entry in entries {
            match entry.mode {
                FileMode::Tree => listing.directories.push(entry),
                FileMode::Blob => listing.files.push(entry),
                _ => listing.others.push(entry),
            }
        }

        for group in [
            &mut listing.directories,
            &mut listing.files,
            &mut listing.others,
        ] {
            group.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        }
        listing
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries: directories, then files, then others.
    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.directories
            .iter()
            .chain(self.files.iter())
            .chain(self.others.iter())
    }
}

/// Lists trees through an object store.
#[derive(Debug)]
pub struct TreeLister<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> TreeLister<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// List the tree with id `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowseError::ObjectRead`] if the tree cannot be read.
    pub fn list(&self, tree: &Oid) -> Result<TreeListing, BrowseError> {
        let entries = self.read(tree)?;
        let listing = TreeListing::from_entries(entries);
        debug!(
            tree = %tree,
            directories = listing.directories.len(),
            files = listing.files.len(),
            others = listing.others.len(),
            "listed tree"
        );
        Ok(listing)
    }

    /// List the directory at `path` inside `commit`'s root tree.
    ///
    /// Empty components are ignored, so `""`, `"/"` and `"src/"` are all
    /// accepted.
    ///
    /// # Errors
    ///
    /// - [`BrowseError::PathNotFound`] if a component is missing or is not
    ///   a directory
    /// - [`BrowseError::ObjectRead`] if a tree on the way cannot be read
    pub fn list_path(&self, commit: &CommitInfo, path: &str) -> Result<TreeListing, BrowseError> {
        let mut tree = commit.tree.clone();

        for component in path.split('/').filter(|c| !c.is_empty()) {
            let entry = self
                .read(&tree)?
                .into_iter()
                .find(|e| e.name == component && e.mode == FileMode::Tree)
                .ok_or_else(|| BrowseError::PathNotFound {
                    path: path.to_string(),
                })?;
            tree = entry.oid;
        }

        self.list(&tree)
    }

    fn read(&self, tree: &Oid) -> Result<Vec<TreeEntry>, BrowseError> {
        self.store
            .find_tree(tree)
            .map_err(|source| BrowseError::ObjectRead {
                oid: tree.to_string(),
                source,
            })
    }
}
