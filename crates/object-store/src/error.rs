//! Error types for the object storage backend.

use std::path::PathBuf;

/// Errors that can occur when working with the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Object storage error
    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key rejected before it reached the backend
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Path error
    #[error("path error: {0}")]
    Path(PathBuf),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
