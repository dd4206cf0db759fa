//! File tree mirroring via git.
//!
//! This crate keeps a local directory synchronized with the head of one
//! branch on a remote repository. It clones when the local copy is missing,
//! pulls when it exists, and repairs it when it is broken.
//!
//! The local copy is non-authoritative: any local changes found may be
//! discarded. Synchronization performs the equivalent of a hard reset to
//! the remote whenever the two disagree.
//!
//! # Example
//!
//! ```no_run
//! use mirror_core::{CancelToken, SyncOptions, Synchronizer};
//!
//! fn main() -> mirror_core::Result<()> {
//!     let options = SyncOptions::new().branch("main");
//!     let sync = Synchronizer::new("/srv/app-config", "https://example.com/config.git", options);
//!     sync.synchronize(&CancelToken::new())
//! }
//! ```

pub mod error;
pub mod options;
pub mod sync;

pub use error::{Error, Result};
pub use options::SyncOptions;
pub use sync::{Synchronizer, synchronize};

// Backend-facing vocabulary, re-exported so library consumers need only one
// crate.
pub use mirror_git::{
    Backend, BranchName, CANONICAL_REMOTE, CancelToken, Credential, DEFAULT_BRANCH, GitBackend,
    Mirror, ProgressSink, PullOutcome, RemoteDescriptor, StdoutSink, WriterSink,
};
