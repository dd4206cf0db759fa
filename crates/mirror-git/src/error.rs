//! Error types for mirror-git

use std::path::PathBuf;

/// Result type for mirror-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found at {path}")]
    RepositoryNotFound { path: PathBuf },

    #[error("Unable to determine repository HEAD reference: {source}")]
    HeadUnresolvable {
        #[source]
        source: git2::Error,
    },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Branch '{name}' not found")]
    BranchNotFound { name: String },

    #[error("Cannot fast-forward '{branch}': local and remote histories have diverged")]
    CannotFastForward { branch: String },

    #[error("Repository path {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Unable to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
