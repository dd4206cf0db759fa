//! On-disk git repository fixtures at several realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs —
//! fakes are faster and have fewer external dependencies.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Creates a minimal `.git` directory structure **without** initialising a
/// real git repository.
///
/// Realism level: **FAKE** — directory structure only, no git object store.
///
/// Use for: metadata-deletion tests that only need a `.git` marker on disk.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir(path.join(".git"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/master\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create refs/heads: {e}"));
}

/// Initialises a real git repository using `git2` (no commits, no config).
///
/// Realism level: **REAL** — valid git object store, unborn HEAD.
///
/// Use for: tests that need an openable repository whose HEAD does not
/// resolve yet.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a real repository with one commit on `branch`, using the
/// `git` CLI.
///
/// Realism level: **REAL WITH HISTORY** — valid git state, named branch,
/// one commit.
///
/// Use for: origin fixtures that synchronization clones and pulls from.
///
/// # Panics
/// Panics if any git operation fails.
pub fn repo_with_commit(path: &Path, branch: &str) {
    run_git(path, &["init"]);
    run_git(path, &["config", "user.email", "test@test.com"]);
    run_git(path, &["config", "user.name", "Test User"]);
    run_git(path, &["config", "commit.gpgsign", "false"]);
    run_git(path, &["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")]);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("repo_with_commit: failed to write README.md: {e}"));

    run_git(path, &["add", "."]);
    run_git(path, &["commit", "-m", "Initial commit"]);
}

/// Adds a commit touching `file` to an existing fixture repository.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_file(path: &Path, file: &str, contents: &str, message: &str) {
    fs::write(path.join(file), contents)
        .unwrap_or_else(|e| panic!("commit_file: failed to write {file}: {e}"));
    run_git(path, &["add", "."]);
    run_git(path, &["commit", "-m", message]);
}

/// Creates `branch` with one extra commit, then returns to the previous
/// branch.
///
/// # Panics
/// Panics if any git operation fails.
pub fn branch_with_commit(path: &Path, branch: &str, file: &str, contents: &str) {
    run_git(path, &["checkout", "-b", branch]);
    commit_file(path, file, contents, &format!("Add {file}"));
    run_git(path, &["checkout", "-"]);
}

/// Rewrites HEAD to point at a reference that does not exist, so the
/// repository opens but its HEAD no longer resolves.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn corrupt_head(path: &Path) {
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/missing\n")
        .unwrap_or_else(|e| panic!("corrupt_head: failed to rewrite HEAD: {e}"));
}

/// Current commit id of `reference`, via the `git` CLI.
///
/// # Panics
/// Panics if the git operation fails.
pub fn rev_parse(path: &Path, reference: &str) -> String {
    let output = Command::new("git")
        .args(["rev-parse", reference])
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("rev_parse: failed to run git: {e}"));
    if !output.status.success() {
        panic!(
            "rev_parse: `git rev-parse {reference}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn run_git(path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("run_git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "run_git: `git {args:?}` failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}
