//! Error types for rotating file output

use std::io;
use std::path::PathBuf;

/// Result type for rotating file operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rotating or writing log files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to create log directory
    #[error("Failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The path that failed to be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to open the file for a new bucket
    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        /// The file that could not be opened
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to repoint the link at the newest file
    #[error("Failed to update link {path}: {source}")]
    Link {
        /// The link path
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// The `io::ErrorKind` closest to this error.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Io(source)
            | Self::CreateDirectory { source, .. }
            | Self::OpenFile { source, .. }
            | Self::Link { source, .. } => source.kind(),
            Self::Configuration(_) => io::ErrorKind::InvalidInput,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(source) => source,
            other => Self::new(other.kind(), other),
        }
    }
}
