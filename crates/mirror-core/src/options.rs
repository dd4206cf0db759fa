//! Synchronizer configuration.

use std::sync::Arc;

use mirror_git::{BranchName, Credential, ProgressSink};

/// Options accepted at synchronizer construction.
///
/// All fields have usable defaults: the default branch, no authentication,
/// and silent operation.
#[derive(Clone, Default)]
pub struct SyncOptions {
    /// Target branch.
    pub branch: BranchName,

    /// Authentication material handed to the backend for clone and pull.
    pub credential: Option<Credential>,

    /// Sink for human-readable progress lines. `None` is silent.
    pub progress: Option<Arc<dyn ProgressSink>>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target branch by name. Accepts a short name or a
    /// fully-qualified `refs/heads/` reference.
    pub fn branch(mut self, name: impl AsRef<str>) -> Self {
        self.branch = BranchName::new(name);
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }
}
