//! Error types for driver operations

use clus::ClusError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Raised by the cluster service or the cluster lookups.
    #[error(transparent)]
    Cluster(#[from] ClusError),

    /// Raised by a collaborator outside the cluster layer (classic live
    /// migration, VM provisioning, disk copies).
    #[error("{operation} failed for {instance}: {reason}")]
    Collaborator {
        operation: &'static str,
        instance: String,
        reason: String,
    },
}

impl Error {
    pub fn collaborator(
        operation: &'static str,
        instance: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Collaborator {
            operation,
            instance: instance.into(),
            reason: reason.into(),
        }
    }

    /// True when a required cluster object was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Cluster(e) if e.is_not_found())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
