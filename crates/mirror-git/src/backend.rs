//! Backend capability surface consumed by the synchronizer.

use std::path::Path;
use std::sync::Arc;

use crate::{BranchName, CancelToken, Credential, ProgressSink, Result};

/// A named remote endpoint as recorded in the repository configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub name: String,
    pub url: String,
}

impl RemoteDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Result of a pull: either the local branch moved, or there was nothing new
/// to fetch. Both are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Updated,
    AlreadyUpToDate,
}

/// Repository-level operations of the version-control engine.
///
/// The synchronizer only ever talks to this surface, so the reconciliation
/// algorithm can be driven by an in-memory implementation in tests.
pub trait Backend {
    type Repo: Mirror;

    /// Open an existing mirror at `path`.
    ///
    /// A path holding no repository is the distinct
    /// [`Error::RepositoryNotFound`](crate::Error::RepositoryNotFound); any
    /// other failure is reported as-is.
    fn open(&self, path: &Path) -> Result<Self::Repo>;

    /// Clone `origin` at `branch` into `path`.
    ///
    /// Must succeed into a directory that already contains ordinary files:
    /// corruption recovery removes only the git metadata and re-clones
    /// around whatever is left.
    fn clone_into(
        &self,
        cancel: &CancelToken,
        path: &Path,
        origin: &str,
        branch: &BranchName,
        credential: Option<&Credential>,
        progress: Option<&Arc<dyn ProgressSink>>,
    ) -> Result<Self::Repo>;

    /// Remove the git metadata under `path`, leaving ordinary files alone.
    fn remove_metadata(&self, path: &Path) -> Result<()>;
}

/// Operations on an opened or freshly cloned mirror.
pub trait Mirror {
    /// Fully-qualified name of the reference HEAD currently points at.
    fn head(&self) -> Result<String>;

    /// Look up a remote by name.
    /// [`Error::RemoteNotFound`](crate::Error::RemoteNotFound) is distinct
    /// from other failures.
    fn remote(&self, name: &str) -> Result<RemoteDescriptor>;

    fn create_remote(&self, descriptor: &RemoteDescriptor) -> Result<()>;

    fn delete_remote(&self, name: &str) -> Result<()>;

    /// Switch HEAD to `branch` and materialize its tree.
    ///
    /// With `create_if_absent`, a missing local ref is first created at the
    /// current HEAD commit. With `force`, local modifications are discarded.
    fn checkout(&self, branch: &BranchName, create_if_absent: bool, force: bool) -> Result<()>;

    /// Fetch `branch` from the canonical remote and advance the local ref.
    ///
    /// With `force`, a diverged local branch is reset to the fetched tip;
    /// without it, divergence is
    /// [`Error::CannotFastForward`](crate::Error::CannotFastForward).
    fn pull(
        &self,
        cancel: &CancelToken,
        branch: &BranchName,
        credential: Option<&Credential>,
        progress: Option<&Arc<dyn ProgressSink>>,
        force: bool,
    ) -> Result<PullOutcome>;
}
