// src/exec/invocation.rs

//! Immutable description of one command execution request.

use std::time::Duration;

/// Default number of additional attempts after a timed-out first attempt.
pub const DEFAULT_RETRIES: u32 = 3;

/// A shell command line plus how a single attempt should treat it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Opaque shell command line (pipes, redirects etc. are honoured).
    pub command: String,
    /// Wall-clock limit per attempt. `None` or zero means "no deadline".
    pub timeout: Option<Duration>,
    /// Buffer combined stdout/stderr and return it, or pass it through to
    /// the controlling terminal.
    pub capture_output: bool,
}

impl CommandInvocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
            capture_output: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// The deadline that actually applies to an attempt.
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }
}

/// Per-call options for [`RetryingExecutor::run`](super::RetryingExecutor::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub timeout: Option<Duration>,
    pub retries: u32,
    pub capture_output: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: DEFAULT_RETRIES,
            capture_output: true,
        }
    }
}

impl RunOptions {
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Let output go straight to the terminal instead of buffering it.
    pub fn streamed(mut self) -> Self {
        self.capture_output = false;
        self
    }

    pub fn invocation(&self, command: impl Into<String>) -> CommandInvocation {
        CommandInvocation::new(command)
            .with_timeout(self.timeout)
            .capture_output(self.capture_output)
    }
}

/// Convert a user-facing timeout in seconds into an optional deadline.
///
/// Non-positive, non-finite or unrepresentably large values mean "no
/// deadline".
pub fn timeout_from_secs(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

/// Double-quote `arg` for the shell so spaces do not split it.
pub fn shell_quote(arg: impl std::fmt::Display) -> String {
    let raw = arg.to_string();
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for ch in raw.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
