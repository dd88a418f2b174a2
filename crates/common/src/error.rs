//! Failure taxonomy shared by every Pod capability.
//!
//! A single enum so the facade, the deferred pod and the bridge can hand the
//! same value back to a feature without translating it. It is `Clone` since a
//! deferred pod's resolution failure is observed by every pending call, and
//! serializable since it crosses the bridge.

use object_store::StorageError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PodError {
    /// File, archive or zip entry id did not resolve
    #[error("not found: {0}")]
    NotFound(String),
    /// Destination id failed URI-scheme validation
    #[error("{0} is not a polypod:// URI")]
    InvalidIdentifier(String),
    /// RDF mutation targeted a non-default graph
    #[error("only the default graph may be mutated")]
    InvalidMutation,
    /// The user declined a confirmation prompt
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Network failure or non-success response
    #[error("endpoint failed at {operation}: {cause}")]
    Transport { operation: String, cause: String },
    /// Endpoint name absent from the allow-list
    #[error("endpoint failed at {operation}: unknown endpoint {endpoint}")]
    UnknownEndpoint { operation: String, endpoint: String },
    /// Link name absent from the feature manifest
    #[error("unknown link: {0}")]
    UnknownLink(String),
    /// Write against a read-only location
    #[error("read-only: {0}")]
    ReadOnly(String),
    /// Read against a directory entry
    #[error("not a file: {0}")]
    NotAFile(String),
    /// Stored payload could not be opened as an archive
    #[error("invalid archive {id}: {cause}")]
    InvalidArchive { id: String, cause: String },
    /// Term cannot take the position it was given
    #[error("invalid term: {0}")]
    InvalidTerm(String),
    /// Query or update rejected by the RDF engine
    #[error("rdf engine error: {0}")]
    Rdf(String),
    /// Durable storage failure
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Native bridge could not deliver a call or its reply
    #[error("bridge error: {0}")]
    Bridge(String),
    /// Configuration or manifest could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl PodError {
    pub fn transport(operation: &str, cause: impl ToString) -> Self {
        PodError::Transport {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl From<StorageError> for PodError {
    fn from(err: StorageError) -> Self {
        PodError::BackendUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PodError>;
