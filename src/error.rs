use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading boot files and assembling a manifest.
#[derive(Error, Debug)]
pub enum Error {
    #[error("reading '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed boot entry '{}': {reason}", path.display())]
    MalformedEntry { path: PathBuf, reason: String },

    #[error(
        "boot entry name '{name}' is used by both '{}' and '{}'",
        first.display(),
        second.display()
    )]
    DuplicateEntry {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error(
        "artifact name '{name}' is used by both '{}' and '{}'",
        first.display(),
        second.display()
    )]
    DuplicateArtifact {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{tool} failed for '{}': {reason}", path.display())]
    ExternalTool {
        tool: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Missing required host tools:\n{0}")]
    MissingTools(String),

    #[error("no file info collected for '{}'", .0.display())]
    MissingFileInfo(PathBuf),

    #[error("invalid settings '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
