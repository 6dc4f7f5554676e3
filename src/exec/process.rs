// src/exec/process.rs

//! Single-attempt command execution with a wall-clock deadline.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{AbortReason, ExecError};

use super::backend::{AttemptFuture, CommandRunner};
use super::{AbortFlag, CommandInvocation};

/// Shell interpreter used when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Output recorded in place of the real output when it could not be read.
pub const OUTPUT_ERROR_SENTINEL: &str = "ERROR";

/// Spawns one command through a shell and waits for it, killing it when the
/// attempt's deadline passes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    shell: String,
    abort_on_error: AbortFlag,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL, AbortFlag::default())
    }
}

/// What the attempt observed once the child was done.
struct Completion {
    status: io::Result<ExitStatus>,
    /// `None` when output was passed through instead of captured.
    output: Option<io::Result<Vec<u8>>>,
}

impl ProcessRunner {
    pub fn new(shell: impl Into<String>, abort_on_error: AbortFlag) -> Self {
        Self {
            shell: shell.into(),
            abort_on_error,
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn abort_flag(&self) -> &AbortFlag {
        &self.abort_on_error
    }

    fn build_command(&self, invocation: &CommandInvocation) -> Command {
        let mut cmd = Command::new(&self.shell);
        // stderr is folded into stdout by the shell itself, so both streams
        // share one pipe and keep the order the OS delivered them in.
        cmd.arg("-c")
            .arg(format!("exec 2>&1\n{}", invocation.command))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if invocation.capture_output {
            cmd.stdout(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
        }

        // Own process group, so a timeout can take down everything the
        // command started, not just the shell.
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    async fn attempt(&self, invocation: &CommandInvocation) -> Result<String, ExecError> {
        let command = invocation.command.as_str();
        let deadline = invocation.effective_timeout();

        debug!(
            cmd = %command,
            timeout = ?deadline,
            capture = invocation.capture_output,
            "starting command attempt"
        );

        let started = Instant::now();
        let mut child = self
            .build_command(invocation)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: command.to_string(),
                source,
            })?;
        let pid = child.id();
        let mut group = GroupGuard::new(pid, command);

        let reader = child.stdout.take().map(|mut stdout| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                stdout.read_to_end(&mut buf).await.map(|_| buf)
            })
        });
        let reader_abort = reader.as_ref().map(JoinHandle::abort_handle);

        // The deadline covers both the exit and draining the output, so a
        // background grandchild holding the pipe open cannot hang us.
        let completion = wait_and_collect(&mut child, reader);
        let finished = match deadline {
            Some(limit) => tokio::time::timeout(limit, completion).await.ok(),
            None => Some(completion.await),
        };

        let Some(completion) = finished else {
            self.kill_attempt(&mut child, pid, command).await;
            group.disarm();
            if let Some(handle) = reader_abort {
                handle.abort();
            }
            debug!(
                cmd = %command,
                elapsed = ?started.elapsed(),
                "about to raise a timeout"
            );
            return Err(ExecError::Timeout {
                command: command.to_string(),
                timeout: deadline.unwrap_or_default(),
            });
        };

        if completion.status.is_ok() {
            group.disarm();
        }
        self.settle(command, started, completion)
    }

    /// Turn what a finished attempt observed into its result.
    fn settle(
        &self,
        command: &str,
        started: Instant,
        completion: Completion,
    ) -> Result<String, ExecError> {
        let Completion { status, output } = completion;
        let mut error_flag = None;

        let output = match output {
            None => String::new(),
            Some(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Some(Err(err)) => {
                debug!(cmd = %command, "failed to retrieve stdout");
                info!(error = %err, "could not read command output");
                error_flag = Some(AbortReason::OutputUnavailable);
                OUTPUT_ERROR_SENTINEL.to_string()
            }
        };

        match status {
            Ok(status) => match termination_signal(&status) {
                Some(signal) => {
                    debug!(cmd = %command, signal, "command was terminated by signal");
                    error_flag = Some(AbortReason::Signal(signal));
                }
                None => debug!(
                    cmd = %command,
                    exit_code = ?status.code(),
                    elapsed = ?started.elapsed(),
                    "command exited"
                ),
            },
            Err(err) => {
                // The child is still reclaimed through kill_on_drop.
                warn!(cmd = %command, error = %err, "failed waiting for command");
                if error_flag.is_none() {
                    error_flag = Some(AbortReason::OutputUnavailable);
                }
            }
        }

        if let Some(reason) = error_flag {
            if self.abort_on_error.is_set() {
                return Err(ExecError::Abort {
                    command: command.to_string(),
                    reason,
                });
            }
        }

        Ok(output)
    }

    /// Forcefully stop a timed-out attempt and reap it.
    ///
    /// Losing the race against a natural exit is not an error.
    async fn kill_attempt(&self, child: &mut Child, pid: Option<u32>, command: &str) {
        #[cfg(unix)]
        let signalled = pid.is_some_and(|pid| kill_process_group(pid, command));
        #[cfg(not(unix))]
        let signalled = {
            let _ = pid;
            false
        };

        if !signalled {
            if let Err(err) = child.start_kill() {
                debug!(cmd = %command, error = %err, "kill raced with process exit");
            }
        }

        if let Err(err) = child.wait().await {
            warn!(cmd = %command, error = %err, "failed to reap killed command");
        }
    }
}

/// Kills the attempt's process group when the attempt is dropped before its
/// child was reaped, e.g. when the whole run is cancelled by Ctrl-C.
///
/// `kill_on_drop` alone only reaches the shell, not what it started.
struct GroupGuard {
    pid: Option<u32>,
    command: String,
}

impl GroupGuard {
    fn new(pid: Option<u32>, command: &str) -> Self {
        Self {
            pid,
            command: command.to_string(),
        }
    }

    fn disarm(&mut self) {
        self.pid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if let Some(pid) = self.pid.take() {
            debug!(cmd = %self.command, pid, "attempt dropped while running");
            #[cfg(unix)]
            kill_process_group(pid, &self.command);
        }
    }
}

async fn wait_and_collect(
    child: &mut Child,
    reader: Option<JoinHandle<io::Result<Vec<u8>>>>,
) -> Completion {
    let status = child.wait().await;
    let output = match reader {
        Some(handle) => Some(match handle.await {
            Ok(read) => read,
            Err(join_err) => Err(io::Error::other(join_err)),
        }),
        None => None,
    };
    Completion { status, output }
}

/// SIGKILL the whole process group led by `pid`.
///
/// Returns false only when the signal could not be delivered for a reason
/// other than the group already being gone.
#[cfg(unix)]
fn kill_process_group(pid: u32, command: &str) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };

    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => {
            debug!(cmd = %command, pid, "sent SIGKILL to process group");
            true
        }
        Err(Errno::ESRCH) => {
            debug!(cmd = %command, pid, "process group already exited");
            true
        }
        Err(err) => {
            warn!(cmd = %command, pid, error = %err, "failed to signal process group");
            false
        }
    }
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

impl CommandRunner for ProcessRunner {
    fn run_once<'a>(&'a self, invocation: &'a CommandInvocation) -> AttemptFuture<'a> {
        Box::pin(self.attempt(invocation))
    }
}
