//! libgit2-backed implementation of the backend capability surface.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, FetchOptions, RemoteCallbacks, Repository};

use crate::{
    Backend, BranchName, CANONICAL_REMOTE, CancelToken, Credential, Error, METADATA_DIR, Mirror,
    ProgressSink, PullOutcome, RemoteDescriptor, Result,
};

/// Production backend built on libgit2.
#[derive(Debug, Default)]
pub struct GitBackend;

/// An opened repository on disk.
pub struct GitMirror {
    repo: Repository,
}

impl std::fmt::Debug for GitMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitMirror")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Backend for GitBackend {
    type Repo = GitMirror;

    fn open(&self, path: &Path) -> Result<GitMirror> {
        match Repository::open(path) {
            Ok(repo) => Ok(GitMirror { repo }),
            Err(e) if e.code() == ErrorCode::NotFound => Err(Error::RepositoryNotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(Error::Git(e)),
        }
    }

    fn clone_into(
        &self,
        cancel: &CancelToken,
        path: &Path,
        origin: &str,
        branch: &BranchName,
        credential: Option<&Credential>,
        progress: Option<&Arc<dyn ProgressSink>>,
    ) -> Result<GitMirror> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tracing::debug!(path = %path.display(), origin, branch = branch.short(), "cloning");

        // libgit2's whole-directory clone refuses a non-empty target, and a
        // recovery re-clone has to work around surviving working files.
        let repo = Repository::init(path)?;
        fetch_and_checkout(&repo, cancel, origin, branch, credential, progress)?;
        Ok(GitMirror { repo })
    }

    fn remove_metadata(&self, path: &Path) -> Result<()> {
        let root = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::io(path, e)),
        };
        if !root.is_dir() {
            return Err(Error::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        let git_dir = path.join(METADATA_DIR);
        let meta = match fs::metadata(&git_dir) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::io(&git_dir, e)),
        };
        if !meta.is_dir() {
            return Err(Error::NotADirectory { path: git_dir });
        }

        tracing::debug!(path = %git_dir.display(), "removing git metadata");
        fs::remove_dir_all(&git_dir).map_err(|e| Error::io(&git_dir, e))
    }
}

/// Clone body: fetch the branch from `origin` and materialize it, leaving
/// the repository indistinguishable from an ordinary single-branch clone.
fn fetch_and_checkout(
    repo: &Repository,
    cancel: &CancelToken,
    origin: &str,
    branch: &BranchName,
    credential: Option<&Credential>,
    progress: Option<&Arc<dyn ProgressSink>>,
) -> Result<()> {
    let mut remote = repo.remote(CANONICAL_REMOTE, origin)?;
    let tracking = format!("refs/remotes/{CANONICAL_REMOTE}/{}", branch.short());
    let refspec = format!("+{}:{tracking}", branch.to_ref());

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks(cancel, credential, progress));
    remote
        .fetch(&[refspec.as_str()], Some(&mut options), None)
        .map_err(|e| {
            if cancel.is_cancelled() {
                Error::Cancelled
            } else if e.code() == ErrorCode::NotFound {
                Error::BranchNotFound {
                    name: branch.short().to_string(),
                }
            } else {
                Error::Git(e)
            }
        })?;

    let oid = match repo.refname_to_id(&tracking) {
        Ok(oid) => oid,
        Err(e) if e.code() == ErrorCode::NotFound => {
            return Err(Error::BranchNotFound {
                name: branch.short().to_string(),
            });
        }
        Err(e) => return Err(Error::Git(e)),
    };

    let commit = repo.find_commit(oid)?;
    repo.branch(branch.short(), &commit, true)?;
    repo.set_head(&branch.to_ref())?;
    repo.checkout_head(Some(CheckoutBuilder::new().force()))?;

    let mut local = repo.find_branch(branch.short(), BranchType::Local)?;
    local.set_upstream(Some(&format!("{CANONICAL_REMOTE}/{}", branch.short())))?;

    Ok(())
}

impl Mirror for GitMirror {
    fn head(&self) -> Result<String> {
        match self.repo.head() {
            Ok(head) => Ok(head.name().unwrap_or("HEAD").to_string()),
            Err(source) => Err(Error::HeadUnresolvable { source }),
        }
    }

    fn remote(&self, name: &str) -> Result<RemoteDescriptor> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(RemoteDescriptor::new(name, remote.url().unwrap_or_default())),
            Err(e) if e.code() == ErrorCode::NotFound => Err(Error::RemoteNotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(Error::Git(e)),
        }
    }

    fn create_remote(&self, descriptor: &RemoteDescriptor) -> Result<()> {
        self.repo.remote(&descriptor.name, &descriptor.url)?;
        Ok(())
    }

    fn delete_remote(&self, name: &str) -> Result<()> {
        match self.repo.remote_delete(name) {
            Ok(()) => Ok(()),
            Err(e) if e.code() == ErrorCode::NotFound => Err(Error::RemoteNotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(Error::Git(e)),
        }
    }

    fn checkout(&self, branch: &BranchName, create_if_absent: bool, force: bool) -> Result<()> {
        let refname = branch.to_ref();

        if self.repo.find_reference(&refname).is_err() {
            if !create_if_absent {
                return Err(Error::BranchNotFound {
                    name: branch.short().to_string(),
                });
            }
            // New local branch starts at the current HEAD commit; a
            // subsequent pull moves it to the remote tip.
            let commit = self.repo.head()?.peel_to_commit()?;
            self.repo.branch(branch.short(), &commit, false)?;
        }

        self.repo.set_head(&refname)?;
        let mut opts = CheckoutBuilder::new();
        if force {
            opts.force();
        }
        self.repo.checkout_head(Some(&mut opts))?;
        Ok(())
    }

    fn pull(
        &self,
        cancel: &CancelToken,
        branch: &BranchName,
        credential: Option<&Credential>,
        progress: Option<&Arc<dyn ProgressSink>>,
        force: bool,
    ) -> Result<PullOutcome> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tracing::debug!(branch = branch.short(), "pulling");

        {
            let mut remote = match self.repo.find_remote(CANONICAL_REMOTE) {
                Ok(remote) => remote,
                Err(e) if e.code() == ErrorCode::NotFound => {
                    return Err(Error::RemoteNotFound {
                        name: CANONICAL_REMOTE.to_string(),
                    });
                }
                Err(e) => return Err(Error::Git(e)),
            };

            let refspec = format!(
                "+{}:refs/remotes/{CANONICAL_REMOTE}/{}",
                branch.to_ref(),
                branch.short()
            );
            let mut options = FetchOptions::new();
            options.remote_callbacks(callbacks(cancel, credential, progress));
            remote
                .fetch(&[refspec.as_str()], Some(&mut options), None)
                .map_err(|e| cancelled_or_git(cancel, e))?;
        }

        let fetch_head = self.repo.find_reference("FETCH_HEAD")?;
        let fetch_commit = fetch_head.peel_to_commit()?;
        let annotated = self.repo.find_annotated_commit(fetch_commit.id())?;
        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            return Ok(PullOutcome::AlreadyUpToDate);
        }
        if !analysis.is_fast_forward() && !force {
            return Err(Error::CannotFastForward {
                branch: branch.short().to_string(),
            });
        }

        let message = if analysis.is_fast_forward() {
            format!("pull: fast-forward to {}", fetch_commit.id())
        } else {
            format!("pull: forced update to {}", fetch_commit.id())
        };
        let refname = branch.to_ref();
        self.repo
            .reference(&refname, fetch_commit.id(), true, &message)?;
        self.repo.set_head(&refname)?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force()))?;

        Ok(PullOutcome::Updated)
    }
}

fn callbacks<'cb>(
    cancel: &CancelToken,
    credential: Option<&Credential>,
    progress: Option<&Arc<dyn ProgressSink>>,
) -> RemoteCallbacks<'cb> {
    let mut cb = RemoteCallbacks::new();

    let token = cancel.clone();
    cb.transfer_progress(move |_stats| !token.is_cancelled());

    if let Some(credential) = credential {
        let credential = credential.clone();
        cb.credentials(move |_url, username_from_url, allowed| {
            credential.acquire(username_from_url, allowed)
        });
    }

    if let Some(sink) = progress {
        let sink = Arc::clone(sink);
        cb.sideband_progress(move |data| {
            sink.data(data);
            true
        });
    }

    cb
}

fn cancelled_or_git(cancel: &CancelToken, error: git2::Error) -> Error {
    if cancel.is_cancelled() {
        Error::Cancelled
    } else {
        Error::Git(error)
    }
}
