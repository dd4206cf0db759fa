//! Branch and reference naming

/// Namespace prefix for local branch references.
pub const LOCAL_HEADS_NAMESPACE: &str = "refs/heads/";

/// Canonical name of the single tracked remote.
pub const CANONICAL_REMOTE: &str = "origin";

/// Branch used when the caller does not configure one.
pub const DEFAULT_BRANCH: &str = "master";

/// Name of the metadata directory removed during corruption recovery.
pub const METADATA_DIR: &str = ".git";

/// A branch, held as its short name.
///
/// Rendering as a reference prefixes the local-heads namespace; a
/// fully-qualified name passed in is normalized back to the short form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchName(String);

impl BranchName {
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let short = name.strip_prefix(LOCAL_HEADS_NAMESPACE).unwrap_or(name);
        Self(short.to_string())
    }

    /// Short name, e.g. `master`.
    pub fn short(&self) -> &str {
        &self.0
    }

    /// Fully-qualified local reference name, e.g. `refs/heads/master`.
    pub fn to_ref(&self) -> String {
        format!("{LOCAL_HEADS_NAMESPACE}{}", self.0)
    }

    /// Whether `reference` is this branch's fully-qualified name.
    pub fn matches_ref(&self, reference: &str) -> bool {
        reference
            .strip_prefix(LOCAL_HEADS_NAMESPACE)
            .is_some_and(|short| short == self.0)
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self::new(DEFAULT_BRANCH)
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
