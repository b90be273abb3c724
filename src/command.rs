//! External command execution.
//!
//! The pool never manipulates namespaces or cgroups itself; it drives
//! caller-supplied shell helpers. `CommandRunner` is the seam between the
//! lifecycle controller and the host: production code runs real processes
//! through [`HostCommandRunner`], tests substitute a recording runner and
//! assert over the observed [`CommandSpec`] history.

use crate::error::{Error, Result};
use std::process::Command;
use tracing::debug;

/// A fully-specified external command.
///
/// `env` is ordered and exact: an empty list means the child inherits the
/// parent environment, a non-empty list is the complete curated environment
/// for the child (helpers that need `PATH` have it appended explicitly).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program path or name.
    pub program: String,
    /// Positional arguments.
    pub args: Vec<String>,
    /// Exact child environment; empty = inherit.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Creates a command spec with an inherited environment.
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
        }
    }

    /// Sets the exact child environment.
    #[must_use]
    pub fn with_env<K, V>(mut self, env: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env = env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }
}

/// Synchronous command executor.
///
/// The caller's thread blocks until the child exits. A non-zero exit is an
/// error; helper script failures are surfaced to the pool's caller verbatim.
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion.
    fn run(&self, spec: &CommandSpec) -> Result<()>;
}

/// Runs commands as real host processes.
#[derive(Debug, Default)]
pub struct HostCommandRunner;

impl HostCommandRunner {
    /// Creates a new host command runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for HostCommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<()> {
        debug!(program = %spec.program, args = ?spec.args, "running command");

        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if !spec.env.is_empty() {
            command.env_clear();
            command.envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let status = command.status().map_err(|e| Error::CommandFailed {
            program: spec.program.clone(),
            reason: format!("failed to spawn: {e}"),
        })?;

        if !status.success() {
            return Err(Error::CommandFailed {
                program: spec.program.clone(),
                reason: format!("exited with {status}"),
            });
        }

        Ok(())
    }
}
