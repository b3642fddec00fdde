//! Shared integration-test harness for running the `cheatcode` binary as a
//! child process.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Helpers for invoking the compiled binary.
pub struct CheatcodeProcess;

impl CheatcodeProcess {
    /// Runs the binary with `args` and an empty stdin.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::run_with_stdin(args, "")
    }

    /// Runs the binary with `args`, writes `stdin`, then closes it.
    #[allow(clippy::missing_panics_doc)]
    pub fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_cheatcode"))
            .args(args)
            .env_remove("CHEATCODE_CONFIG")
            .env_remove("CHEATCODE_LOG_LEVEL")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn cheatcode");

        // Dropping the handle closes stdin so the binary sees EOF
        child
            .stdin
            .take()
            .expect("stdin not captured")
            .write_all(stdin.as_bytes())
            .expect("failed to write stdin");

        child.wait_with_output().expect("failed to wait for cheatcode")
    }

    /// Returns the path to a test fixture.
    #[must_use]
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}
