//! Corruption recovery and cancellation against real repositories

use std::fs;

use mirror_core::{CancelToken, SyncOptions, Synchronizer};
use mirror_test_utils::git::{corrupt_head, fake_git_dir, real_git_repo, repo_with_commit};
use tempfile::TempDir;

fn origin_url(origin: &TempDir) -> String {
    origin.path().to_str().unwrap().to_string()
}

#[test]
fn test_malformed_mirror_is_recovered_by_reclone() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    sync.synchronize(&CancelToken::new()).unwrap();

    // Break HEAD and leave an unrelated file next to the working tree.
    corrupt_head(&mirror);
    fs::write(mirror.join("notes.txt"), "keep me").unwrap();

    sync.synchronize(&CancelToken::new()).unwrap();

    let repo = git2::Repository::open(&mirror).unwrap();
    assert_eq!(repo.head().unwrap().name(), Some("refs/heads/main"));
    assert_eq!(
        fs::read_to_string(mirror.join("README.md")).unwrap(),
        "# Test"
    );
    // Recovery deleted only the metadata directory.
    assert_eq!(
        fs::read_to_string(mirror.join("notes.txt")).unwrap(),
        "keep me"
    );
}

#[test]
fn test_unborn_repository_is_recovered() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");
    fs::create_dir(&mirror).unwrap();
    real_git_repo(&mirror);

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    sync.synchronize(&CancelToken::new()).unwrap();

    let repo = git2::Repository::open(&mirror).unwrap();
    assert_eq!(repo.head().unwrap().name(), Some("refs/heads/main"));
    assert!(mirror.join("README.md").exists());
}

#[test]
fn test_partial_metadata_without_object_store_is_cloned_over() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");
    fs::create_dir(&mirror).unwrap();
    fake_git_dir(&mirror);

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    sync.synchronize(&CancelToken::new()).unwrap();

    let repo = git2::Repository::open(&mirror).unwrap();
    assert_eq!(repo.head().unwrap().name(), Some("refs/heads/main"));
    assert!(mirror.join("README.md").exists());
}

#[test]
fn test_cancellation_before_clone_leaves_path_untouched() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let token = CancelToken::new();
    token.cancel();
    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    let err = sync.synchronize(&token).unwrap_err();

    assert!(err.is_cancelled());
    assert!(!mirror.exists());
}

#[test]
fn test_cancelled_sync_is_retryable() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));

    let token = CancelToken::new();
    token.cancel();
    sync.synchronize(&token).unwrap_err();

    sync.synchronize(&CancelToken::new()).unwrap();
    assert!(mirror.join("README.md").exists());
}
