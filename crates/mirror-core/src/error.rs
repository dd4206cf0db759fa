//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Synchronization failures, each tagged with the phase that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to open repository at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: mirror_git::Error,
    },

    #[error("Unable to clone {origin} into {path}: {source}")]
    Clone {
        origin: String,
        path: PathBuf,
        #[source]
        source: mirror_git::Error,
    },

    #[error("Repository at {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: mirror_git::Error,
    },

    #[error("Unable to delete malformed repository at {path}: {source}")]
    Recovery {
        path: PathBuf,
        #[source]
        source: mirror_git::Error,
    },

    #[error("Unable to reconcile remote '{name}' with {origin}: {source}")]
    Remote {
        name: String,
        origin: String,
        #[source]
        source: mirror_git::Error,
    },

    #[error("Unable to switch to '{branch}' branch: {source}")]
    Branch {
        branch: String,
        #[source]
        source: mirror_git::Error,
    },

    #[error("Unable to pull '{branch}' from {origin}: {source}")]
    Pull {
        branch: String,
        origin: String,
        #[source]
        source: mirror_git::Error,
    },

    #[error("Synchronization cancelled")]
    Cancelled,
}

impl Error {
    /// Whether this failure came from caller-requested cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
