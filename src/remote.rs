//! Parse the SSH remote command to find the repository path.

use error_stack::{bail, Report};
use thiserror::Error;

use crate::ext::error_stack::{ErrorHelper, IntoContext};
use crate::ext::result::WrapOk;

/// Errors encountered while extracting the repository path.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote command could not be split into shell words,
    /// usually due to unterminated quoting.
    #[error("tokenize remote command: {0:?}")]
    Tokenize(String),

    /// The remote command tokenized cleanly but did not contain enough words
    /// to name a repository. A valid remote command has at least a command
    /// name and a path argument.
    #[error("remote command {0:?} has no repository path argument")]
    MissingPath(String),
}

/// Extract the repository path from an SSH remote command string.
///
/// The remote command is the server-side command the VCS client asks SSH to
/// run, for example `git-upload-pack '/org/repo.git'`; by convention its
/// final shell word is the repository path. Splitting honors POSIX quoting
/// rules (single quotes, double quotes, backslash escapes) rather than naive
/// whitespace splitting, since the path or command may contain quoted
/// segments. The returned path is the final token verbatim, with no
/// unescaping beyond tokenization.
#[tracing::instrument]
pub fn repo_path(remote_command: &str) -> Result<String, Report<Error>> {
    let mut words = shell_words::split(remote_command)
        .context_lazy(|| Error::Tokenize(remote_command.to_string()))
        .help("check the remote command for unterminated quotes")?;

    if words.len() < 2 {
        bail!(Error::MissingPath(remote_command.to_string()));
    }

    match words.pop() {
        Some(path) => path.wrap_ok(),
        None => bail!(Error::MissingPath(remote_command.to_string())),
    }
}
