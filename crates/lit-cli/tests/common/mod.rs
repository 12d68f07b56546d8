//! Shared test harness for lit-cli integration tests.
//!
//! Spawns the compiled `lit` binary in a fresh temp directory with a pinned
//! environment so commit output is deterministic across machines.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

fn pin_env(cmd: &mut Command) {
    cmd.env("LIT_AUTHOR_NAME", "Test Author")
        .env("LIT_AUTHOR_EMAIL", "test@example.com")
        .env("LIT_COMMITTER_NAME", "Test Committer")
        .env("LIT_COMMITTER_EMAIL", "test@example.com")
        .env("TZ", "UTC")
        .env("LC_ALL", "C");
}

/// Run the `lit` binary in `dir` with the given arguments.
pub fn lit(dir: &Path, args: &[&str]) -> CommandResult {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lit"));
    cmd.args(args).current_dir(dir);
    pin_env(&mut cmd);
    let output = cmd.output().expect("failed to run lit");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

impl CommandResult {
    pub fn assert_success(&self) -> &Self {
        assert_eq!(self.exit_code, 0, "expected success, stderr: {}", self.stderr);
        self
    }
}
