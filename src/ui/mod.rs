//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting, display and log initialisation
//!
//! # Design
//!
//! All terminal output goes through this module so that `--quiet`,
//! `--debug` and `--json` are honoured the same way by every command.

pub mod output;
