//! Git backend for Git Mirror
//!
//! A narrow capability surface over libgit2: open/clone, HEAD resolution,
//! remote management, checkout, pull, and the guarded metadata deletion used
//! for corruption recovery. The synchronizer in `mirror-core` consumes the
//! [`Backend`] and [`Mirror`] traits, so it can be driven by an in-memory
//! implementation in tests.

pub mod backend;
pub mod cancel;
pub mod credential;
pub mod error;
pub mod git;
pub mod naming;
pub mod progress;

pub use backend::{Backend, Mirror, PullOutcome, RemoteDescriptor};
pub use cancel::CancelToken;
pub use credential::Credential;
pub use error::{Error, Result};
pub use git::{GitBackend, GitMirror};
pub use naming::{
    BranchName, CANONICAL_REMOTE, DEFAULT_BRANCH, LOCAL_HEADS_NAMESPACE, METADATA_DIR,
};
pub use progress::{ProgressSink, StdoutSink, WriterSink};
