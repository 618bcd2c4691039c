//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. An explicit path (the `--config` flag)
//! 2. `$ROGIT_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/rogit/config.toml`
//! 4. `~/.rogit/config.toml`
//!
//! An explicit path that does not exist is an error; the other locations
//! are skipped when missing.
//!
//! # Example
//!
//! ```no_run
//! use rogit::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("log limit: {}", config.log_limit());
//! println!("strict refs: {}", config.strict_refs());
//! ```

pub mod schema;

pub use schema::{FileConfig, LogConfig, RefsConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of commits shown by the history view when nothing is configured.
pub const DEFAULT_LOG_LIMIT: usize = 10;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents (default when no file was found)
    pub file: FileConfig,
    /// Path the file was loaded from
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// If `explicit` is provided it must exist; otherwise the standard
    /// locations are searched and defaults are used when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from(path);
        }

        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let file = Self::read_file_config(path)?;
        file.validate()?;
        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file in the standard locations.
    fn locate() -> Option<PathBuf> {
        // 1. Check $ROGIT_CONFIG
        if let Ok(path) = std::env::var("ROGIT_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/rogit/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("rogit/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.rogit/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".rogit/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Read and parse a config file.
    fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Repository to browse, if configured.
    pub fn repository(&self) -> Option<&Path> {
        self.file.repository.as_deref()
    }

    /// Maximum number of commits in the history view.
    ///
    /// Defaults to [`DEFAULT_LOG_LIMIT`].
    pub fn log_limit(&self) -> usize {
        self.file
            .log
            .as_ref()
            .and_then(|l| l.limit)
            .unwrap_or(DEFAULT_LOG_LIMIT)
    }

    /// Path prefix filter for the history view.
    ///
    /// Defaults to the empty prefix, which matches every path.
    pub fn log_path_prefix(&self) -> &str {
        self.file
            .log
            .as_ref()
            .and_then(|l| l.path_prefix.as_deref())
            .unwrap_or("")
    }

    /// Whether symbolic branch refs fail the scan.
    ///
    /// Defaults to `false` (skip and warn).
    pub fn strict_refs(&self) -> bool {
        self.file
            .refs
            .as_ref()
            .and_then(|r| r.strict)
            .unwrap_or(false)
    }

    /// Path the config was loaded from, if any.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
