#![cfg(target_family = "unix")]
//! Shared helpers for binary-level tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// The ssh argument list a VCS client conventionally hands a transport shim.
/// The trailing remote command names the `/org/repo.git` repository, so the
/// derived identity is `org_repo.git`.
pub fn ssh_args() -> Vec<String> {
    vec![
        String::from("git@example.com"),
        String::from("git-upload-pack '/org/repo.git'"),
    ]
}

/// The file-override name matching [`ssh_args`].
pub const OVERRIDE_FILE_NAME: &str = "git_ssh_key_org_repo.git";

/// The environment-override name matching [`ssh_args`].
pub const OVERRIDE_ENV_NAME: &str = "GIT_SSH_KEY_ORG_REPO.GIT";

/// A harness that runs the repokey binary against a stub ssh client.
///
/// The stub is an executable shell script in its own directory, prepended to
/// `PATH`; the binary runs in a fresh working directory so file-override
/// lookups are hermetic.
pub struct Shim {
    workdir: TempDir,
    stubs: TempDir,
}

impl Shim {
    /// Install `script` as the stub `ssh` and set up a fresh working directory.
    pub fn new(script: &str) -> Self {
        let workdir = TempDir::new().expect("create workdir");
        let stubs = TempDir::new().expect("create stub dir");

        let stub = stubs.path().join("ssh");
        fs::write(&stub, script).expect("write stub ssh");
        fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).expect("chmod stub ssh");

        Self { workdir, stubs }
    }

    /// The working directory the binary will run in.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// A file path inside the working directory.
    pub fn workdir_file(&self, name: &str) -> PathBuf {
        self.workdir.path().join(name)
    }

    /// Run the binary with `args`, capturing its output.
    /// `envs` are set on the child only, so parallel tests don't interfere.
    pub fn run(&self, args: &[String], envs: &[(&str, &str)]) -> Output {
        let bin = env!("CARGO_BIN_EXE_repokey");
        let path = std::env::var("PATH").unwrap_or_default();
        let path = format!("{}:{path}", self.stubs.path().display());

        let mut command = Command::new(bin);
        command
            .args(args)
            .current_dir(self.workdir.path())
            .env("PATH", path);
        for (name, value) in envs {
            command.env(name, value);
        }
        command.output().expect("must run repokey")
    }
}

/// A stub ssh that records its argument list, one per line, into the file
/// named by `REPOKEY_TEST_OUT`, then exits with `code`.
pub fn recording_stub(code: i32) -> String {
    format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$REPOKEY_TEST_OUT\"\nexit {code}\n")
}

/// Like [`recording_stub`], but also copies the identity file (permissions
/// preserved) to `$REPOKEY_TEST_OUT.key` when an `-i` flag is present.
/// The copy is taken while the key file still exists, so tests can inspect
/// its content and mode after the shim has cleaned it up.
pub fn key_capturing_stub(code: i32) -> String {
    format!(
        concat!(
            "#!/bin/sh\n",
            "printf '%s\\n' \"$@\" > \"$REPOKEY_TEST_OUT\"\n",
            "if [ \"$1\" = \"-i\" ]; then cp -p \"$2\" \"$REPOKEY_TEST_OUT.key\"; fi\n",
            "exit {code}\n",
        ),
        code = code
    )
}

/// Read the argument list recorded by a recording stub.
pub fn recorded_args(out: &Path) -> Vec<String> {
    let recorded = fs::read_to_string(out).expect("stub ssh must have recorded its args");
    recorded.lines().map(String::from).collect()
}
