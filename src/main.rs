//! The `repokey` binary.
//!
//! A transport shim: substituted for the ssh client via a hook such as
//! `GIT_SSH_COMMAND`, it derives a per-repository identity from the remote
//! command, resolves a key override for it, injects the identity-file flag
//! into the ssh argument list, and delegates to the real client.

#![deny(clippy::unwrap_used)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

use std::env;
use std::process::ExitCode;

use error_stack::{fmt::ColorMode, Report, Result, ResultExt};
use repokey::ext::error_stack::ErrorHelper;
use repokey::identity::Identity;
use repokey::key::KeyOverride;
use repokey::{key, launch, remote};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("parse remote command for the repository path")]
    ParseRemoteCommand,

    #[error("resolve key override")]
    ResolveKey,

    #[error("run the ssh client")]
    RunSsh,
}

fn main() -> ExitCode {
    // App-wide setup goes here.
    Report::set_color_mode(ColorMode::Color);
    init_tracing();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let Some(remote_command) = args.last() else {
        let program = env::args()
            .next()
            .unwrap_or_else(|| String::from("repokey"));
        eprintln!("Usage: GIT_SSH_COMMAND={program} git clone ...");
        return ExitCode::FAILURE;
    };

    match run(&args, remote_command) {
        Ok(code) => subprocess_exit_code(code),
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve the key override and delegate to ssh.
///
/// The temporary key file (if one was materialized) is owned by `resolved`:
/// it is removed when `resolved` drops at the end of this scope, after ssh
/// has exited and on every path out of this function, so no key material is
/// left behind in the temp directory.
fn run(args: &[String], remote_command: &str) -> Result<i32, Error> {
    debug!("ssh params: {args:?}");

    let repo_path = remote::repo_path(remote_command)
        .change_context(Error::ParseRemoteCommand)
        .help("this program is meant to be invoked by a VCS client, receiving the full ssh argument list as its own")?;

    let identity = Identity::from_repo_path(&repo_path);
    debug!("repo path {repo_path:?} maps to identity {identity:?}");

    let resolved = key::resolve(&identity).change_context(Error::ResolveKey)?;

    launch::invoke(args, resolved.as_ref().map(KeyOverride::path)).change_context(Error::RunSsh)
}

/// Map the subprocess's exit code onto our own.
///
/// Codes outside `0..=255` can't be represented as a process exit code;
/// those fall back to the generic failure code.
fn subprocess_exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
}

/// Diagnostics go to stderr only: stdout belongs to the forwarded ssh
/// stream and must not be corrupted.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("REPOKEY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
