//! Command execution abstraction for testability.
//!
//! Backends never touch `std::process` directly. They go through
//! [`CommandExecutor`] so unit tests can script tool output and spawn
//! failures without running `ip` or `ifconfig`.

use anyhow::Result;
use std::process::{Command, Stdio};

#[cfg(test)]
use mockall::automock;

/// Output from command execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output from the command, lossily decoded
    pub stdout: String,
    /// Standard error from the command, lossily decoded
    pub stderr: String,
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// The exit code, if the process was not killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Output of a command that exited with status 0.
    pub fn succeeded(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    /// Output of a command that exited with a non-zero status.
    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.to_string(),
            success: false,
            code: Some(code),
        }
    }
}

/// Trait for command execution, allowing dependency injection for testing.
///
/// An `Err` means the process could not be started at all. A process that
/// ran and failed is an `Ok` with `success == false`.
#[cfg_attr(test, automock)]
pub trait CommandExecutor: Send + Sync {
    /// Execute `cmd` with the given argument vector and wait for it to exit.
    fn execute(&self, cmd: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Real implementation of CommandExecutor that runs actual system commands.
#[derive(Debug, Clone, Default)]
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, cmd: &str, args: &[String]) -> Result<CommandOutput> {
        // stdin is closed so a tool that prompts cannot hang on our terminal
        let output = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Helper function to convert a slice of &str to Vec<String>.
///
/// mockall has trouble with lifetimes in `&[&str]`, so the trait takes
/// `&[String]` instead.
pub fn args_to_strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
