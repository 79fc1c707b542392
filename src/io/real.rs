//! Production implementation of [`CommandRunner`].
//!
//! Programs are located on `PATH` with `which` and run to completion with
//! stdout and stderr captured. Environment overrides are applied on top of
//! the inherited environment.

use crate::errors::CaplockError;
use crate::io::traits::{CommandOutput, CommandRunner, Invocation};
use std::process::Command;

/// Runs invocations as real child processes.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CaplockError> {
        let program = which::which(invocation.program()).map_err(|e| {
            CaplockError::environment(format!("{}: {}", invocation.program(), e))
        })?;

        log::debug!("running {}", invocation.command_line());

        let mut cmd = Command::new(&program);
        cmd.args(invocation.arguments());
        for (key, value) in invocation.env_overrides() {
            cmd.env(key, value);
        }
        if let Some(dir) = invocation.dir() {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| {
            CaplockError::environment(format!("failed to run {}: {}", program.display(), e))
        })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        };
        if !result.is_success() {
            log::debug!(
                "{} finished with {}",
                invocation.program(),
                result.status_text()
            );
        }
        Ok(result)
    }
}
