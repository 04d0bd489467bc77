//! Per-repository identity names.

use std::fmt::{self, Display};

/// The normalized, per-repository token used to namespace key overrides.
///
/// Derived purely from the repository path named by the SSH remote command:
/// leading path separators are stripped, and every remaining separator is
/// replaced with an underscore. No external state is consulted, so the same
/// path always maps to the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Normalize a repository path into an identity name.
    ///
    /// This is total: any input produces an identity, although an empty or
    /// all-slash path produces the empty identity.
    pub fn from_repo_path(path: &str) -> Self {
        let trimmed = path.trim_start_matches('/');
        Self(trimmed.replace('/', "_"))
    }

    /// The file name of the on-disk key override for this identity,
    /// looked up relative to the working directory. Case is preserved.
    pub fn override_file_name(&self) -> String {
        format!("git_ssh_key_{}", self.0)
    }

    /// The name of the environment variable that may carry a key override
    /// for this identity. Only here is the identity uppercased.
    pub fn override_env_name(&self) -> String {
        format!("GIT_SSH_KEY_{}", self.0.to_uppercase())
    }

    /// View the identity as a plain string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
