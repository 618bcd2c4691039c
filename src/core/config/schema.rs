//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `--config <path>` on the command line
//! 2. `$ROGIT_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/rogit/config.toml`
//! 4. `~/.rogit/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g. the log limit must be
//! at least one commit).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Contents of a rogit config file.
///
/// # Example
///
/// ```toml
/// repository = "/srv/git/aports"
///
/// [log]
/// limit = 10
/// path_prefix = "main"
///
/// [refs]
/// strict = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Repository to browse when `--repo` is not given
    pub repository: Option<PathBuf>,

    /// History view defaults
    pub log: Option<LogConfig>,

    /// Ref scanning behaviour
    pub refs: Option<RefsConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(log) = &self.log {
            log.validate()?;
        }
        Ok(())
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Maximum number of commits shown by the history view
    pub limit: Option<usize>,

    /// Only show commits touching paths with this prefix
    pub path_prefix: Option<String>,
}

impl LogConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "log.limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `[refs]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RefsConfig {
    /// Fail the scan on symbolic branch refs instead of skipping them
    pub strict: Option<bool>,
}
