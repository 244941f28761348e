//! Best-effort invocation of external network tools.
//!
//! [`ToolRunner::try_run`] models a tool call as a fallible function.
//! [`ToolRunner::run`] collapses the failure into an empty string and one
//! warning, which is the contract the backends rely on: reconciliation is
//! retried by the caller's next cycle, so a failed tool never aborts it.

use std::sync::Arc;
use tracing::debug;

use crate::cmd_abstraction::CommandExecutor;
use crate::error::IpfwdError;
use crate::logger::Logger;

/// Insertion-ordered option map appended to a command as `key value` pairs.
///
/// Setting an existing key replaces its value in place, so overrides keep
/// the position of the default they replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOptions {
    entries: Vec<(String, String)>,
}

impl ToolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
        self
    }

    /// Builder form of [`ToolOptions::set`].
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten into command tokens: `k1 v1 k2 v2 ...`
    pub fn to_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(k, v)| [k.clone(), v.clone()])
            .collect()
    }
}

/// Build the full argument vector for a tool call, tool name first.
pub fn build_command(tool: &str, args: &[String], options: &ToolOptions) -> Vec<String> {
    let mut command = Vec::with_capacity(1 + args.len() + options.len() * 2);
    command.push(tool.to_string());
    command.extend(args.iter().cloned());
    command.extend(options.to_args());
    command
}

/// Runs tools through an injected executor and reports failures to an
/// injected logger.
#[derive(Clone)]
pub struct ToolRunner {
    executor: Arc<dyn CommandExecutor>,
    logger: Arc<dyn Logger>,
}

impl ToolRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>, logger: Arc<dyn Logger>) -> Self {
        Self { executor, logger }
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Run a tool and return its stdout, or the reason it failed.
    pub fn try_run(
        &self,
        tool: &str,
        args: &[String],
        options: &ToolOptions,
    ) -> Result<String, IpfwdError> {
        let command = build_command(tool, args, options);
        let rendered = command.join(" ");
        debug!("Running {}", rendered);

        let output = self
            .executor
            .execute(&command[0], &command[1..])
            .map_err(|e| IpfwdError::Spawn {
                command: rendered.clone(),
                reason: e.to_string(),
            })?;

        if !output.success {
            return Err(IpfwdError::NonZeroExit {
                command: rendered,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }

    /// Run a tool, logging one warning and returning an empty string on any
    /// failure.
    pub fn run(&self, tool: &str, args: &[String], options: &ToolOptions) -> String {
        match self.try_run(tool, args, options) {
            Ok(stdout) => stdout,
            Err(e) => {
                self.logger.warning(&e.to_string());
                String::new()
            }
        }
    }
}
