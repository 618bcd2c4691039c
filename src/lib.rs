//! Rogit - a read-only browser backend for a single git repository
//!
//! Rogit indexes a repository's branches and tags once, then answers
//! browsing queries against it: resolve a revision to a commit, list a
//! directory of a commit's tree, and walk bounded, path-filtered history.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to browse)
//! - [`browse`] - Ref index, revision resolver, tree lister, history walker
//! - [`core`] - Domain types and configuration
//! - [`git`] - Single interface for all Git object access
//! - [`ui`] - Output formatting and logging
//!
//! # Correctness Invariants
//!
//! 1. The repository is never written to
//! 2. The ref index is built once and never mutated afterwards
//! 3. Every indexed ref resolves to a commit
//! 4. Request-level failures are returned as errors, never panics

pub mod browse;
pub mod cli;
pub mod core;
pub mod git;
pub mod ui;
