//! The reconciliation algorithm.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use mirror_git::{
    Backend, BranchName, CANONICAL_REMOTE, CancelToken, Credential, GitBackend, Mirror,
    ProgressSink, RemoteDescriptor,
};

use crate::{Error, Result, SyncOptions};

/// Upper bound on mirror-resolution attempts within one synchronize call.
const RESOLVE_ATTEMPTS: usize = 2;

/// Keeps a local directory in agreement with one branch of a remote
/// repository.
///
/// The local copy is non-authoritative: synchronization discards local
/// modifications whenever they stand in the way, performing the equivalent
/// of a hard reset to the remote. Construction is nondestructive; all file
/// system work happens in [`synchronize`](Synchronizer::synchronize).
///
/// Concurrent `synchronize` calls against the same path are not serialized
/// here and must be avoided by the caller.
pub struct Synchronizer<B: Backend = GitBackend> {
    path: PathBuf,
    origin: String,
    branch: BranchName,
    credential: Option<Credential>,
    progress: Option<Arc<dyn ProgressSink>>,
    backend: B,
}

impl Synchronizer<GitBackend> {
    /// Synchronizer for the directory at `path`, mirroring `origin`.
    ///
    /// The path is absolutized; it does not have to exist yet.
    pub fn new(path: impl AsRef<Path>, origin: impl Into<String>, options: SyncOptions) -> Self {
        Self::with_backend(path, origin, options, GitBackend)
    }
}

impl<B: Backend> Synchronizer<B> {
    /// Synchronizer driving an arbitrary backend implementation.
    pub fn with_backend(
        path: impl AsRef<Path>,
        origin: impl Into<String>,
        options: SyncOptions,
        backend: B,
    ) -> Self {
        let path = path.as_ref();
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self {
            path,
            origin: origin.into(),
            branch: options.branch,
            credential: options.credential,
            progress: options.progress,
            backend,
        }
    }

    /// The absolutized mirror path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configured origin URL.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The target branch.
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Bring the local mirror into agreement with the configured origin and
    /// branch, performing the equivalent of clone, checkout, and pull as
    /// needed.
    ///
    /// Destructive: local modifications may be discarded, and a malformed
    /// mirror has its git metadata deleted and re-cloned. "Nothing to do"
    /// is success.
    pub fn synchronize(&self, cancel: &CancelToken) -> Result<()> {
        let start = Instant::now();
        tracing::debug!(
            path = %self.path.display(),
            origin = %self.origin,
            branch = self.branch.short(),
            "synchronizing"
        );

        let (mirror, head, cloned) = self.prepare(cancel)?;

        if cloned {
            // A fresh clone already matches the requested remote and branch.
            self.report(&format!("Sync completed in {:.2?}", start.elapsed()));
            return Ok(());
        }

        self.reconcile_remote(&mirror)?;
        self.reconcile_branch(&mirror, &head)?;

        self.report(&format!("Pulling from {}", self.origin));
        match mirror.pull(
            cancel,
            &self.branch,
            self.credential.as_ref(),
            self.progress.as_ref(),
            true,
        ) {
            // Nothing new to fetch is as good as an update.
            Ok(_) => {}
            Err(mirror_git::Error::Cancelled) => return Err(Error::Cancelled),
            Err(source) => {
                return Err(Error::Pull {
                    branch: self.branch.short().to_string(),
                    origin: self.origin.clone(),
                    source,
                });
            }
        }

        self.report(&format!("Sync completed in {:.2?}", start.elapsed()));
        Ok(())
    }

    /// Resolve the mirror to a usable repository with a known HEAD, cloning
    /// or recovering as needed. Bounded by [`RESOLVE_ATTEMPTS`].
    fn prepare(&self, cancel: &CancelToken) -> Result<(B::Repo, String, bool)> {
        let mut attempt = 0;
        loop {
            let (mirror, cloned) = self.open_or_clone(cancel)?;

            let head_err = match mirror.head() {
                Ok(head) => return Ok((mirror, head, cloned)),
                Err(err) => err,
            };

            self.report("The repository appears to be malformed");
            self.report("Attempting delete and re-clone");
            self.report(&format!(
                "Deleting repository metadata at \"{}\"",
                self.path.display()
            ));
            self.backend
                .remove_metadata(&self.path)
                .map_err(|source| Error::Recovery {
                    path: self.path.clone(),
                    source,
                })?;

            attempt += 1;
            if attempt >= RESOLVE_ATTEMPTS {
                // The metadata was removed above, so the next call starts
                // from a clean clone.
                return Err(Error::Malformed {
                    path: self.path.clone(),
                    source: head_err,
                });
            }
        }
    }

    fn open_or_clone(&self, cancel: &CancelToken) -> Result<(B::Repo, bool)> {
        self.report(&format!(
            "Opening repository at \"{}\"",
            self.path.display()
        ));
        match self.backend.open(&self.path) {
            Ok(mirror) => Ok((mirror, false)),
            Err(mirror_git::Error::RepositoryNotFound { .. }) => {
                self.report("Repository does not exist");
                self.report(&format!("Cloning from {}", self.origin));
                let mirror = self
                    .backend
                    .clone_into(
                        cancel,
                        &self.path,
                        &self.origin,
                        &self.branch,
                        self.credential.as_ref(),
                        self.progress.as_ref(),
                    )
                    .map_err(|source| match source {
                        mirror_git::Error::Cancelled => Error::Cancelled,
                        source => Error::Clone {
                            origin: self.origin.clone(),
                            path: self.path.clone(),
                            source,
                        },
                    })?;
                Ok((mirror, true))
            }
            Err(source) => Err(Error::Open {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Ensure exactly one canonical remote exists and points at the
    /// configured origin.
    fn reconcile_remote(&self, mirror: &B::Repo) -> Result<()> {
        let desired = RemoteDescriptor::new(CANONICAL_REMOTE, self.origin.clone());
        let wrap = |source: mirror_git::Error| Error::Remote {
            name: CANONICAL_REMOTE.to_string(),
            origin: self.origin.clone(),
            source,
        };

        match mirror.remote(CANONICAL_REMOTE) {
            Ok(existing) if existing.url == self.origin => Ok(()),
            Ok(_) => {
                self.report("Updating origin");
                mirror.delete_remote(CANONICAL_REMOTE).map_err(wrap)?;
                mirror.create_remote(&desired).map_err(wrap)
            }
            Err(mirror_git::Error::RemoteNotFound { .. }) => {
                self.report("Creating origin");
                mirror.create_remote(&desired).map_err(wrap)
            }
            Err(source) => Err(wrap(source)),
        }
    }

    /// Ensure HEAD points at the target branch, creating the local ref on
    /// first checkout.
    fn reconcile_branch(&self, mirror: &B::Repo, head: &str) -> Result<()> {
        if self.branch.matches_ref(head) {
            self.report(&format!("Already on {} branch", self.branch.short()));
            return Ok(());
        }

        self.report(&format!("Switching to {} branch", self.branch.short()));
        mirror
            .checkout(&self.branch, true, true)
            .map_err(|source| Error::Branch {
                branch: self.branch.short().to_string(),
                source,
            })
    }

    fn report(&self, text: &str) {
        if let Some(sink) = &self.progress {
            sink.line(text);
        }
    }
}

/// One-shot synchronization: construct a [`Synchronizer`] and run it once.
pub fn synchronize(
    cancel: &CancelToken,
    path: impl AsRef<Path>,
    origin: impl Into<String>,
    options: SyncOptions,
) -> Result<()> {
    Synchronizer::new(path, origin, options).synchronize(cancel)
}
