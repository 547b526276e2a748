//! Error types for cluster operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusError {
    #[error("Failed to connect to cluster: {0}")]
    ConnectionFailed(String),

    #[error("Cluster operation failed: {0}")]
    OperationFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// More than one cluster object answered an exact-name query. The
    /// cluster is misconfigured; never retried or resolved by picking one.
    #[error("Duplicate resource name found: {0}")]
    DuplicateResource(String),
}

impl ClusError {
    /// True when the error reports a missing cluster object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ClusError>;
