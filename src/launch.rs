//! Invoke the real ssh client with the augmented argument list.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use error_stack::{bail, Report};
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::ext::error_stack::{ErrorHelper, IntoContext};
use crate::ext::result::WrapOk;

/// The ssh client binary, resolved through `PATH` at spawn time.
const SSH_PROGRAM: &str = "ssh";

/// The ssh flag naming the identity file to authenticate with.
const IDENTITY_FLAG: &str = "-i";

/// Errors encountered while delegating to ssh.
#[derive(Debug, Error)]
pub enum Error {
    /// The ssh client could not be started at all.
    #[error("start the ssh client")]
    Start,

    /// The ssh client terminated without an exit code
    /// (on unix, this means it was killed by a signal).
    #[error("ssh exited without an exit code")]
    NoExitCode,
}

/// Build the final ssh argument list.
///
/// When a key was resolved, the identity-file flag and the key path are
/// prepended; the original arguments follow in their original order, with
/// their content untouched.
pub fn augmented_args(args: &[String], key: Option<&Path>) -> Vec<OsString> {
    key.into_iter()
        .flat_map(|path| [OsString::from(IDENTITY_FLAG), path.into()])
        .chain(args.iter().map(OsString::from))
        .collect_vec()
}

/// Run the real ssh client with `args`, augmented with the identity flag
/// when a key override was resolved, and return its exit code.
///
/// The child inherits this process's standard streams so interactive and
/// binary protocol traffic passes through untouched; nothing is buffered or
/// inspected. The call blocks until ssh exits.
#[tracing::instrument(skip_all)]
pub fn invoke(args: &[String], key: Option<&Path>) -> Result<i32, Report<Error>> {
    let args = augmented_args(args, key);
    debug!("running {SSH_PROGRAM} with params {args:?}");

    let status = Command::new(SSH_PROGRAM)
        .args(&args)
        .status()
        .context(Error::Start)
        .help("ensure the ssh client is installed and available on PATH")?;

    match status.code() {
        Some(code) => code.wrap_ok(),
        None => bail!(Error::NoExitCode),
    }
}
