//! Authentication material passed through to git transport callbacks.

use std::path::PathBuf;

use git2::{Cred, CredentialType};

/// Authentication method for remote operations.
///
/// The synchronizer treats this as opaque and hands it to the backend for
/// clone and pull; the git implementation resolves it to a libgit2
/// credential from inside the remote callbacks.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Plaintext username and password (or access token).
    UserPass { username: String, password: String },

    /// SSH private key on disk.
    SshKey {
        username: String,
        private_key: PathBuf,
        passphrase: Option<String>,
    },

    /// Key held by a running ssh-agent.
    SshAgent { username: String },

    /// Whatever default the transport negotiates.
    Default,
}

impl Credential {
    /// Resolve to a libgit2 credential. Called from
    /// `RemoteCallbacks::credentials` during fetch and clone.
    pub(crate) fn acquire(
        &self,
        username_from_url: Option<&str>,
        _allowed: CredentialType,
    ) -> std::result::Result<Cred, git2::Error> {
        match self {
            Credential::UserPass { username, password } => {
                Cred::userpass_plaintext(username, password)
            }
            Credential::SshKey {
                username,
                private_key,
                passphrase,
            } => Cred::ssh_key(username, None, private_key, passphrase.as_deref()),
            Credential::SshAgent { username } => {
                Cred::ssh_key_from_agent(username_from_url.unwrap_or(username))
            }
            Credential::Default => Cred::default(),
        }
    }
}
