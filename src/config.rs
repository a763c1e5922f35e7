//! Optional TOML settings.
//!
//! ```toml
//! [inspect]
//! concurrency = 4
//! file_command = "file"
//! ```
//!
//! Every field has a default, so a missing file or an empty table is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::inspect::filetype::DEFAULT_FILE_COMMAND;

/// Upper bound on concurrent per-file operations.
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub inspect: InspectSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InspectSettings {
    pub concurrency: usize,
    pub file_command: String,
}

impl Default for InspectSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            file_command: DEFAULT_FILE_COMMAND.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(path, &text)
    }

    /// `path` only labels errors.
    pub fn from_toml_str(path: &Path, text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        settings.validate(path)?;
        Ok(settings)
    }

    /// Apply a command-line concurrency override.
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Result<Self> {
        if let Some(concurrency) = concurrency {
            self.inspect.concurrency = concurrency;
            self.validate(&PathBuf::from("--concurrency"))?;
        }
        Ok(self)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |reason: &str| Error::Config {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        if self.inspect.concurrency == 0 {
            return Err(invalid("inspect.concurrency must be at least 1"));
        }
        if self.inspect.file_command.trim().is_empty() {
            return Err(invalid("inspect.file_command must not be empty"));
        }
        Ok(())
    }
}
