// src/errors.rs

//! Crate-wide error types.

use std::time::Duration;

use thiserror::Error;

/// Why an attempt was escalated into an [`ExecError::Abort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The child was terminated by this signal instead of exiting.
    Signal(i32),
    /// Reading the child's combined output failed at the OS level.
    OutputUnavailable,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::Signal(sig) => write!(f, "terminated by signal {sig}"),
            AbortReason::OutputUnavailable => f.write_str("failed to retrieve output"),
        }
    }
}

/// Failure of a single command execution.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("no response from `{command}` within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("aborting: `{command}` {reason}")]
    Abort { command: String, reason: AbortReason },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// Only timeouts consume the retry budget; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecError::Timeout { .. })
    }

    pub fn command(&self) -> &str {
        match self {
            ExecError::Timeout { command, .. }
            | ExecError::Abort { command, .. }
            | ExecError::Spawn { command, .. } => command,
        }
    }
}

#[derive(Error, Debug)]
pub enum RuntestError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Test definition error in {path}: {message}")]
    TestDefinition { path: String, message: String },

    #[error("Test not found: {0}")]
    TestNotFound(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Caller-level "stop everything" that did not come from a command.
    #[error("Aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RuntestError {
    /// True for errors the top level reports as "timed out waiting for response".
    pub fn is_timeout(&self) -> bool {
        matches!(self, RuntestError::Exec(ExecError::Timeout { .. }))
    }

    /// True for errors that mean the whole run was deliberately stopped.
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            RuntestError::Exec(ExecError::Abort { .. })
                | RuntestError::Aborted(_)
                | RuntestError::TestNotFound(_)
                | RuntestError::TestDefinition { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RuntestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeout_is_retryable() {
        let timeout = ExecError::Timeout {
            command: "sleep 5".into(),
            timeout: Duration::from_millis(200),
        };
        let abort = ExecError::Abort {
            command: "kill -9 $$".into(),
            reason: AbortReason::Signal(9),
        };
        let spawn = ExecError::Spawn {
            command: "x".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };

        assert!(timeout.is_retryable());
        assert!(!abort.is_retryable());
        assert!(!spawn.is_retryable());
        assert_eq!(abort.command(), "kill -9 $$");
    }

    #[test]
    fn abort_message_names_signal() {
        let err = ExecError::Abort {
            command: "adb sync".into(),
            reason: AbortReason::Signal(9),
        };
        assert_eq!(err.to_string(), "aborting: `adb sync` terminated by signal 9");
    }

    #[test]
    fn runtest_error_classification() {
        let timeout: RuntestError = ExecError::Timeout {
            command: "adb get-state".into(),
            timeout: Duration::from_secs(20),
        }
        .into();
        assert!(timeout.is_timeout());
        assert!(!timeout.is_abort());

        assert!(RuntestError::TestNotFound("foo".into()).is_abort());
        assert!(!RuntestError::ConfigError("bad".into()).is_abort());
    }
}
