//! Resolve the SSH key override for a repository identity.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use error_stack::Report;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ext::error_stack::{DescribeContext, ErrorHelper, IntoContext};
use crate::ext::result::WrapOk;
use crate::ext::secrecy::ComparableSecretString;
use crate::identity::Identity;

/// Errors encountered while materializing key material to disk.
///
/// All of these are fatal to the invocation: without confidence that the key
/// is correctly and privately persisted, falling back to default ssh identity
/// selection could silently authenticate as the wrong identity.
#[derive(Debug, Error)]
pub enum Error {
    /// Creating the uniquely named temporary key file failed.
    #[error("create temporary ssh key file")]
    CreateKeyFile,

    /// Writing the key bytes to the temporary file failed.
    #[error("write key material to temporary key file")]
    WriteKeyFile,

    /// Restricting the temporary key file to owner read/write failed.
    #[error("restrict temporary key file permissions")]
    RestrictKeyFile,
}

/// A key override resolved for one invocation.
///
/// The `Materialized` variant owns the temporary file holding the key bytes:
/// dropping the override deletes the file, which is how the cleanup
/// obligation is scoped to the invocation regardless of which path the
/// program takes out of its run. The `File` variant points at a file this
/// invocation does not own, so dropping it removes nothing.
#[derive(Debug)]
pub enum KeyOverride {
    /// An operator-supplied key file on disk.
    File(PathBuf),

    /// Key material from the environment, written to a temporary file.
    Materialized(NamedTempFile),
}

impl KeyOverride {
    /// The path to hand to ssh via its identity-file flag.
    pub fn path(&self) -> &Path {
        match self {
            KeyOverride::File(path) => path,
            KeyOverride::Materialized(file) => file.path(),
        }
    }
}

/// Resolve the key override for `identity` against the real process
/// environment: file overrides relative to the working directory, and
/// environment overrides via [`std::env::var`].
pub fn resolve(identity: &Identity) -> Result<Option<KeyOverride>, Report<Error>> {
    resolve_in(identity, Path::new("."), |name| env::var(name).ok())
}

/// Resolve the key override for `identity`, with file lookups rooted at
/// `dir` and environment reads going through `env`.
///
/// Sources are tried in priority order; the first hit wins:
/// 1. a file named `git_ssh_key_<identity>` under `dir`;
/// 2. the `GIT_SSH_KEY_<IDENTITY>` environment variable, whose value is
///    treated as a path to a key file when one exists at that value, and as
///    literal key material otherwise.
///
/// Only the literal-material case creates state owned by this invocation.
#[tracing::instrument(skip(env))]
pub fn resolve_in<F>(
    identity: &Identity,
    dir: &Path,
    env: F,
) -> Result<Option<KeyOverride>, Report<Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let file_name = identity.override_file_name();
    if let Some(path) = existing_key_file(dir, Path::new(&file_name)) {
        debug!("got key override at path {path:?}");
        return Some(KeyOverride::File(path)).wrap_ok();
    }
    debug!("no key override at path {file_name:?}");

    let env_name = identity.override_env_name();
    match env(&env_name).filter(|value| !value.is_empty()) {
        Some(value) => {
            debug!("got key override from env {env_name}");

            // The variable may hold a path to a key rather than the key itself.
            if let Some(path) = existing_key_file(dir, Path::new(&value)) {
                debug!("env override names an existing key file at {path:?}");
                return Some(KeyOverride::File(path)).wrap_ok();
            }

            let material = ComparableSecretString::from(value);
            materialize(&material)
                .map(KeyOverride::Materialized)
                .map(Some)
        }
        None => {
            debug!("no key override in env {env_name}");
            None.wrap_ok()
        }
    }
}

/// Check for an existing key file at `candidate` (relative to `dir`, unless
/// already absolute) and best-effort resolve it to an absolute path. If
/// absolute resolution fails the relative path is still usable, since the
/// working directory doesn't change before ssh runs.
fn existing_key_file(dir: &Path, candidate: &Path) -> Option<PathBuf> {
    let joined = dir.join(candidate);
    if !joined.is_file() {
        return None;
    }

    warn_if_permissive(&joined);
    match joined.canonicalize() {
        Ok(absolute) => Some(absolute),
        Err(err) => {
            warn!("couldn't make {joined:?} absolute: {err}");
            Some(joined)
        }
    }
}

/// Operator-supplied key files aren't required to be private, but ssh is
/// likely to refuse ones that aren't; surface that early.
#[cfg(unix)]
fn warn_if_permissive(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(metadata) => {
            let mode = metadata.permissions().mode();
            if mode & 0o077 != 0 {
                warn!(
                    "key file {path:?} is group- or world-accessible (mode {:03o}); ssh may refuse it",
                    mode & 0o777
                );
            }
        }
        Err(err) => warn!("couldn't read permissions of key file {path:?}: {err}"),
    }
}

#[cfg(not(unix))]
fn warn_if_permissive(_path: &Path) {}

/// Write key material to a fresh, uniquely named, owner-only temporary file.
///
/// The bytes are written verbatim, with no trailing-newline normalization.
#[tracing::instrument(skip_all)]
fn materialize(material: &ComparableSecretString) -> Result<NamedTempFile, Report<Error>> {
    let mut file = tempfile::Builder::new()
        .prefix("repokey-")
        .tempfile()
        .context(Error::CreateKeyFile)
        .describe("temporary file location uses $TMPDIR on Linux and macOS; for Windows it uses the 'GetTempPath' system call")
        .help("altering the temporary directory location may resolve this issue")?;

    file.write_all(material.expose_secret().as_bytes())
        .context(Error::WriteKeyFile)?;
    file.as_file().sync_all().context(Error::WriteKeyFile)?;

    restrict_to_owner(file.path())?;
    file.wrap_ok()
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<(), Report<Error>> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .context(Error::RestrictKeyFile)
        .help("private keys must not be group- or world-readable, or ssh will refuse them")
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<(), Report<Error>> {
    Ok(())
}
