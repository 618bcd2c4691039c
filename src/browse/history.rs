//! browse::history
//!
//! Path-filtered commit history.
//!
//! The walker asks the object store for a lazy traversal and stops pulling
//! once `limit` matches have been produced. Dropping the returned iterator
//! releases the underlying traversal, so a small limit over a large history
//! only reads as many commits as it needs.

use tracing::debug;

use super::BrowseError;
use crate::git::{CommitInfo, ObjectStore, PathPredicate};

/// Predicate matching paths that start with `prefix`.
///
/// The match is a plain string prefix, so `"src"` also matches `"srcgen/x"`.
/// An empty prefix matches every path.
pub fn prefix_predicate(prefix: impl Into<String>) -> impl Fn(&str) -> bool {
    let prefix = prefix.into();
    move |path: &str| path.starts_with(prefix.as_str())
}

/// Walks history through an object store.
#[derive(Debug)]
pub struct HistoryWalker<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> HistoryWalker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Commits reachable from `start` that changed a path matching
    /// `predicate`, newest first, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`BrowseError::ObjectRead`] if the traversal cannot start.
    /// Failures during the traversal are yielded as items.
    pub fn walk<P>(
        &self,
        start: &CommitInfo,
        predicate: P,
        limit: usize,
    ) -> Result<impl Iterator<Item = Result<CommitInfo, BrowseError>> + 'a, BrowseError>
    where
        P: Fn(&str) -> bool + 'a,
    {
        self.traverse(start, Some(Box::new(predicate)), limit)
    }

    /// [`walk`](Self::walk) with a [`prefix_predicate`].
    ///
    /// An empty prefix yields every reachable commit, including ones that
    /// change no path at all (empty commits, merges resolving to the first
    /// parent's tree).
    pub fn walk_prefix(
        &self,
        start: &CommitInfo,
        prefix: &str,
        limit: usize,
    ) -> Result<impl Iterator<Item = Result<CommitInfo, BrowseError>> + 'a, BrowseError> {
        let predicate: Option<PathPredicate<'a>> = if prefix.is_empty() {
            None
        } else {
            Some(Box::new(prefix_predicate(prefix.to_string())))
        };
        self.traverse(start, predicate, limit)
    }

    fn traverse(
        &self,
        start: &CommitInfo,
        predicate: Option<PathPredicate<'a>>,
        limit: usize,
    ) -> Result<impl Iterator<Item = Result<CommitInfo, BrowseError>> + 'a, BrowseError> {
        debug!(start = %start.oid, limit, filtered = predicate.is_some(), "walking history");

        let commits = self
            .store
            .walk(&start.oid, predicate)
            .map_err(|source| BrowseError::ObjectRead {
                oid: start.oid.to_string(),
                source,
            })?;

        let start = start.oid.clone();
        Ok(commits.take(limit).map(move |item| {
            item.map_err(|source| BrowseError::ObjectRead {
                oid: start.to_string(),
                source,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Oid;
    use crate::git::mock::{FailOn, MockOperation, MockStore};
    use crate::git::GitError;

    /// a (docs/) <- b (src/) <- c (src/, README) <- d (docs/)
    fn linear() -> (MockStore, Vec<CommitInfo>) {
        let store = MockStore::new();
        let a = store.commit("a", 100, &[], &["docs/intro.md"]);
        let b = store.commit("b", 200, &[&a.oid], &["src/lib.rs"]);
        let c = store.commit("c", 300, &[&b.oid], &["src/main.rs", "README.md"]);
        let d = store.commit("d", 400, &[&c.oid], &["docs/guide.md"]);
        (store, vec![a, b, c, d])
    }

    fn oids(iter: impl Iterator<Item = Result<CommitInfo, BrowseError>>) -> Vec<Oid> {
        iter.map(|r| r.unwrap().oid).collect()
    }

    #[test]
    fn prefix_predicate_is_plain_prefix() {
        let pred = prefix_predicate("src");
        assert!(pred("src/lib.rs"));
        assert!(pred("srcgen/x.rs"));
        assert!(!pred("docs/src.md"));

        let all = prefix_predicate("");
        assert!(all("anything"));
    }

    #[test]
    fn filters_by_prefix_newest_first() {
        let (store, commits) = linear();
        let walker = HistoryWalker::new(&store);

        let found = oids(walker.walk_prefix(&commits[3], "src/", 10).unwrap());
        assert_eq!(found, vec![commits[2].oid.clone(), commits[1].oid.clone()]);

        let found = oids(walker.walk_prefix(&commits[3], "docs/", 10).unwrap());
        assert_eq!(found, vec![commits[3].oid.clone(), commits[0].oid.clone()]);
    }

    #[test]
    fn empty_prefix_matches_everything() {
        let (store, commits) = linear();
        let found = oids(
            HistoryWalker::new(&store)
                .walk_prefix(&commits[3], "", 10)
                .unwrap(),
        );
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn empty_prefix_includes_commits_without_changes() {
        let (store, commits) = linear();
        let empty = store.commit("empty", 500, &[&commits[3].oid], &[]);

        let found = oids(HistoryWalker::new(&store).walk_prefix(&empty, "", 10).unwrap());
        assert_eq!(found.len(), 5);
        assert_eq!(found[0], empty.oid);

        // A real predicate never matches a commit that changed nothing.
        let found = oids(
            HistoryWalker::new(&store)
                .walk(&empty, |_: &str| true, 10)
                .unwrap(),
        );
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn limit_caps_results() {
        let (store, commits) = linear();
        let found = oids(
            HistoryWalker::new(&store)
                .walk_prefix(&commits[3], "", 2)
                .unwrap(),
        );
        assert_eq!(found, vec![commits[3].oid.clone(), commits[2].oid.clone()]);
    }

    #[test]
    fn zero_limit_yields_nothing() {
        let (store, commits) = linear();
        let found = oids(
            HistoryWalker::new(&store)
                .walk_prefix(&commits[3], "", 0)
                .unwrap(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn stops_visiting_once_limit_is_reached() {
        let (store, commits) = linear();
        let found = oids(
            HistoryWalker::new(&store)
                .walk_prefix(&commits[3], "", 1)
                .unwrap(),
        );

        assert_eq!(found.len(), 1);
        assert_eq!(
            store.count(|op| matches!(op, MockOperation::Visit { .. })),
            1
        );
    }

    #[test]
    fn no_match_yields_nothing() {
        let (store, commits) = linear();
        let found = oids(
            HistoryWalker::new(&store)
                .walk_prefix(&commits[3], "nonexistent/", 10)
                .unwrap(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn walk_from_middle_excludes_descendants() {
        let (store, commits) = linear();
        let found = oids(
            HistoryWalker::new(&store)
                .walk_prefix(&commits[1], "", 10)
                .unwrap(),
        );
        assert_eq!(found, vec![commits[1].oid.clone(), commits[0].oid.clone()]);
    }

    #[test]
    fn merge_history_is_time_ordered() {
        let store = MockStore::new();
        let root = store.commit("root", 100, &[], &["a"]);
        let left = store.commit("left", 300, &[&root.oid], &["a"]);
        let right = store.commit("right", 200, &[&root.oid], &["a"]);
        let merge = store.commit("merge", 400, &[&left.oid, &right.oid], &["a"]);

        let found = oids(HistoryWalker::new(&store).walk_prefix(&merge, "a", 10).unwrap());
        assert_eq!(found, vec![merge.oid, left.oid, right.oid, root.oid]);
    }

    #[test]
    fn traversal_start_failure_is_object_read() {
        let (store, commits) = linear();
        store.fail_on(FailOn::Walk(GitError::Internal {
            message: "revwalk".into(),
        }));

        let result = HistoryWalker::new(&store).walk_prefix(&commits[3], "", 10);
        assert!(matches!(result, Err(BrowseError::ObjectRead { .. })));
    }
}
