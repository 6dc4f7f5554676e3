// src/exec/retry.rs

//! Bounded retry on timeout around a [`CommandRunner`].

use tracing::{debug, info};

use crate::errors::ExecError;

use super::{CommandInvocation, CommandRunner, ProcessRunner, RunOptions};

/// Re-runs a command from scratch while attempts time out.
///
/// Only [`ExecError::Timeout`] consumes the retry budget. Aborts and spawn
/// failures are returned immediately, whatever budget is left.
#[derive(Debug, Clone)]
pub struct RetryingExecutor<R = ProcessRunner> {
    runner: R,
}

impl<R: CommandRunner> RetryingExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `command` with the given options until the first success.
    pub async fn run(&self, command: impl Into<String>, options: RunOptions) -> Result<String, ExecError> {
        let invocation = options.invocation(command);
        self.run_invocation(&invocation, options.retries).await
    }

    /// Run a prepared invocation with an explicit retry budget.
    ///
    /// `retries` is the number of additional attempts after the first, so
    /// a command that always times out is attempted `retries + 1` times.
    pub async fn run_invocation(
        &self,
        invocation: &CommandInvocation,
        mut retries: u32,
    ) -> Result<String, ExecError> {
        let mut attempt = 1u32;
        loop {
            match self.runner.run_once(invocation).await {
                Ok(output) => {
                    debug!(cmd = %invocation.command, attempt, "command succeeded");
                    return Ok(output);
                }
                Err(err) if err.is_retryable() && retries > 0 => {
                    retries -= 1;
                    attempt += 1;
                    info!(
                        cmd = %invocation.command,
                        retries_left = retries,
                        "no response for {}, retrying",
                        invocation.command
                    );
                }
                Err(err) => {
                    debug!(cmd = %invocation.command, attempt, error = %err, "command failed");
                    return Err(err);
                }
            }
        }
    }
}
