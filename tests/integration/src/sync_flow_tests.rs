//! End-to-end synchronization against real repositories

use std::fs;
use std::sync::Arc;

use mirror_core::{CancelToken, SyncOptions, Synchronizer};
use mirror_test_utils::RecordingSink;
use mirror_test_utils::git::{branch_with_commit, commit_file, repo_with_commit, rev_parse};
use tempfile::TempDir;

fn origin_url(origin: &TempDir) -> String {
    origin.path().to_str().unwrap().to_string()
}

#[test]
fn test_bootstrap_clones_into_empty_path() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    sync.synchronize(&CancelToken::new()).unwrap();

    assert!(mirror.join(".git").is_dir());
    assert_eq!(
        fs::read_to_string(mirror.join("README.md")).unwrap(),
        "# Test"
    );
    assert_eq!(rev_parse(&mirror, "HEAD"), rev_parse(origin.path(), "HEAD"));
}

#[test]
fn test_synchronize_twice_is_idempotent() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    sync.synchronize(&CancelToken::new()).unwrap();
    let tip_after_first = rev_parse(&mirror, "HEAD");

    sync.synchronize(&CancelToken::new()).unwrap();

    assert_eq!(rev_parse(&mirror, "HEAD"), tip_after_first);
    let repo = git2::Repository::open(&mirror).unwrap();
    assert_eq!(
        repo.find_remote("origin").unwrap().url(),
        Some(origin_url(&origin).as_str())
    );
    assert_eq!(repo.head().unwrap().name(), Some("refs/heads/main"));
}

#[test]
fn test_upstream_commits_are_pulled() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    sync.synchronize(&CancelToken::new()).unwrap();

    commit_file(
        origin.path(),
        "service.conf",
        "port = 8080",
        "Add service config",
    );
    sync.synchronize(&CancelToken::new()).unwrap();

    assert_eq!(
        fs::read_to_string(mirror.join("service.conf")).unwrap(),
        "port = 8080"
    );
    assert_eq!(rev_parse(&mirror, "HEAD"), rev_parse(origin.path(), "HEAD"));
}

#[test]
fn test_local_modifications_are_discarded_on_update() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    sync.synchronize(&CancelToken::new()).unwrap();

    fs::write(mirror.join("README.md"), "local edit").unwrap();
    commit_file(origin.path(), "README.md", "# Updated", "Update readme");
    sync.synchronize(&CancelToken::new()).unwrap();

    assert_eq!(
        fs::read_to_string(mirror.join("README.md")).unwrap(),
        "# Updated"
    );
}

#[test]
fn test_remote_url_drift_is_corrected() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let sync = Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"));
    sync.synchronize(&CancelToken::new()).unwrap();

    {
        let repo = git2::Repository::open(&mirror).unwrap();
        repo.remote_set_url("origin", "https://example.com/elsewhere.git")
            .unwrap();
    }

    let sink = Arc::new(RecordingSink::new());
    let sync = Synchronizer::new(
        &mirror,
        origin_url(&origin),
        SyncOptions::new().branch("main").progress(sink.clone()),
    );
    sync.synchronize(&CancelToken::new()).unwrap();

    assert!(sink.contains("Updating origin"));
    let repo = git2::Repository::open(&mirror).unwrap();
    assert_eq!(
        repo.find_remote("origin").unwrap().url(),
        Some(origin_url(&origin).as_str())
    );
}

#[test]
fn test_switches_to_branch_present_only_on_remote() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    branch_with_commit(origin.path(), "release", "release.txt", "v1.0");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    // Bootstrap on main, then retarget the same path at release.
    Synchronizer::new(&mirror, origin_url(&origin), SyncOptions::new().branch("main"))
        .synchronize(&CancelToken::new())
        .unwrap();
    Synchronizer::new(
        &mirror,
        origin_url(&origin),
        SyncOptions::new().branch("release"),
    )
    .synchronize(&CancelToken::new())
    .unwrap();

    let repo = git2::Repository::open(&mirror).unwrap();
    assert_eq!(repo.head().unwrap().name(), Some("refs/heads/release"));
    assert_eq!(
        fs::read_to_string(mirror.join("release.txt")).unwrap(),
        "v1.0"
    );
}

#[test]
fn test_one_shot_synchronize() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    mirror_core::synchronize(
        &CancelToken::new(),
        &mirror,
        origin_url(&origin),
        SyncOptions::new().branch("main"),
    )
    .unwrap();

    assert!(mirror.join("README.md").exists());
}

#[test]
fn test_progress_reports_bootstrap_phases() {
    let origin = TempDir::new().unwrap();
    repo_with_commit(origin.path(), "main");
    let work = TempDir::new().unwrap();
    let mirror = work.path().join("mirror");

    let sink = Arc::new(RecordingSink::new());
    let sync = Synchronizer::new(
        &mirror,
        origin_url(&origin),
        SyncOptions::new().branch("main").progress(sink.clone()),
    );
    sync.synchronize(&CancelToken::new()).unwrap();

    assert!(sink.contains("Opening repository at"));
    assert!(sink.contains("Repository does not exist"));
    assert!(sink.contains("Cloning from"));
    assert!(sink.contains("Sync completed in"));
}
