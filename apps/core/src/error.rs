//! Error types for the void.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by void operations.
#[derive(Debug, Error)]
pub enum VoidError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive name: {0:?}")]
    InvalidArchiveName(String),

    #[error("archive already exists: {0}")]
    ArchiveExists(PathBuf),

    #[error("invalid selection {start}..{end} for text of length {len}")]
    InvalidSelection { start: usize, end: usize, len: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
}

impl VoidError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, VoidError>;
