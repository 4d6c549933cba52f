//! Error types for the logger facade

/// Result type for logger configuration
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by logger configuration calls
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rotating file output could not be configured or opened
    #[error("Rotation error: {0}")]
    Rotation(#[from] fanlog_file::Error),

    /// The process-wide logger was already set
    #[error("Global logger already initialized")]
    AlreadyInitialized,
}
