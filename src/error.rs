//! Errors raised while locating and decoding an export file.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a path on disk into parsed export data.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No `conversations.json` exists at (or below) the given path.
    #[error("could not find `{}`", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("reading `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON.
    #[error("invalid JSON in `{}`: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON is valid but the top level is not a list of conversations.
    #[error("expected a top-level array of conversations in `{}`", .0.display())]
    NotAnArray(PathBuf),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound(path)
        } else {
            LoadError::Io { path, source }
        }
    }
}
