//! In-memory backend for driving the reconciliation algorithm in tests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use mirror_git::{
    Backend, BranchName, CANONICAL_REMOTE, CancelToken, Credential, Error, Mirror, ProgressSink,
    PullOutcome, RemoteDescriptor, Result,
};

/// Mutable repository state shared by a [`FakeBackend`] and the mirrors it
/// hands out.
#[derive(Debug)]
pub struct FakeState {
    /// Whether a mirror currently exists at the synchronized path.
    pub exists: bool,
    /// Fully-qualified reference HEAD points at; `None` is unresolvable.
    pub head: Option<String>,
    /// Local branch references, fully qualified.
    pub branches: Vec<String>,
    /// Remote name → URL.
    pub remotes: BTreeMap<String, String>,

    /// When set, HEAD stays unresolvable even after a clone, simulating a
    /// persistently corrupted mirror.
    pub head_always_unresolvable: bool,
    /// Outcome returned by successful pulls.
    pub pull_outcome: PullOutcome,
    /// When set, pulls fail with a generic git error.
    pub pull_fails: bool,
    /// When set, opening fails with a non-"not found" error.
    pub open_fails: bool,
    /// When set, metadata removal fails.
    pub delete_fails: bool,

    // Call counters.
    pub opens: usize,
    pub clones: usize,
    pub deletes: usize,
    pub checkouts: usize,
    pub pulls: usize,
    pub created_remotes: usize,
    pub deleted_remotes: usize,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            exists: false,
            head: None,
            branches: Vec::new(),
            remotes: BTreeMap::new(),
            head_always_unresolvable: false,
            pull_outcome: PullOutcome::AlreadyUpToDate,
            pull_fails: false,
            open_fails: false,
            delete_fails: false,
            opens: 0,
            clones: 0,
            deletes: 0,
            checkouts: 0,
            pulls: 0,
            created_remotes: 0,
            deleted_remotes: 0,
        }
    }
}

/// Backend whose repository state lives in memory.
///
/// Clones share state, so a test can keep a handle for inspection while the
/// synchronizer owns another.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose path already holds a valid mirror on `branch` with the
    /// canonical remote set to `origin`.
    pub fn with_existing_mirror(origin: &str, branch: &BranchName) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state();
            state.exists = true;
            state.head = Some(branch.to_ref());
            state.branches.push(branch.to_ref());
            state
                .remotes
                .insert(CANONICAL_REMOTE.to_string(), origin.to_string());
        }
        backend
    }

    /// Lock the shared state for inspection or setup.
    ///
    /// # Panics
    /// Panics if the state mutex is poisoned.
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }
}

impl Backend for FakeBackend {
    type Repo = FakeMirror;

    fn open(&self, path: &Path) -> Result<FakeMirror> {
        let mut state = self.state();
        state.opens += 1;
        if state.open_fails {
            return Err(Error::Git(git2::Error::from_str("simulated open failure")));
        }
        if !state.exists {
            return Err(Error::RepositoryNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(FakeMirror {
            state: Arc::clone(&self.state),
        })
    }

    fn clone_into(
        &self,
        cancel: &CancelToken,
        _path: &Path,
        origin: &str,
        branch: &BranchName,
        _credential: Option<&Credential>,
        _progress: Option<&Arc<dyn ProgressSink>>,
    ) -> Result<FakeMirror> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut state = self.state();
        state.clones += 1;
        state.exists = true;
        state.branches = vec![branch.to_ref()];
        state.remotes.clear();
        state
            .remotes
            .insert(CANONICAL_REMOTE.to_string(), origin.to_string());
        state.head = if state.head_always_unresolvable {
            None
        } else {
            Some(branch.to_ref())
        };
        Ok(FakeMirror {
            state: Arc::clone(&self.state),
        })
    }

    fn remove_metadata(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        if state.delete_fails {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("simulated deletion failure"),
            });
        }
        state.deletes += 1;
        state.exists = false;
        state.head = None;
        state.branches.clear();
        state.remotes.clear();
        Ok(())
    }
}

/// Mirror handle produced by [`FakeBackend`].
pub struct FakeMirror {
    state: Arc<Mutex<FakeState>>,
}

impl FakeMirror {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }
}

impl Mirror for FakeMirror {
    fn head(&self) -> Result<String> {
        self.state()
            .head
            .clone()
            .ok_or_else(|| Error::HeadUnresolvable {
                source: git2::Error::from_str("simulated unresolvable HEAD"),
            })
    }

    fn remote(&self, name: &str) -> Result<RemoteDescriptor> {
        match self.state().remotes.get(name) {
            Some(url) => Ok(RemoteDescriptor::new(name, url.clone())),
            None => Err(Error::RemoteNotFound {
                name: name.to_string(),
            }),
        }
    }

    fn create_remote(&self, descriptor: &RemoteDescriptor) -> Result<()> {
        let mut state = self.state();
        state.created_remotes += 1;
        state
            .remotes
            .insert(descriptor.name.clone(), descriptor.url.clone());
        Ok(())
    }

    fn delete_remote(&self, name: &str) -> Result<()> {
        let mut state = self.state();
        if state.remotes.remove(name).is_none() {
            return Err(Error::RemoteNotFound {
                name: name.to_string(),
            });
        }
        state.deleted_remotes += 1;
        Ok(())
    }

    fn checkout(&self, branch: &BranchName, create_if_absent: bool, _force: bool) -> Result<()> {
        let mut state = self.state();
        state.checkouts += 1;
        let reference = branch.to_ref();
        if !state.branches.contains(&reference) {
            if !create_if_absent {
                return Err(Error::BranchNotFound {
                    name: branch.short().to_string(),
                });
            }
            state.branches.push(reference.clone());
        }
        state.head = Some(reference);
        Ok(())
    }

    fn pull(
        &self,
        cancel: &CancelToken,
        _branch: &BranchName,
        _credential: Option<&Credential>,
        _progress: Option<&Arc<dyn ProgressSink>>,
        _force: bool,
    ) -> Result<PullOutcome> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut state = self.state();
        state.pulls += 1;
        if state.pull_fails {
            return Err(Error::Git(git2::Error::from_str("simulated pull failure")));
        }
        Ok(state.pull_outcome)
    }
}
