// src/exec/mod.rs

//! Process execution layer.
//!
//! Every build and device command the tool issues goes through here.
//!
//! - [`process`] owns a single attempt: spawn through a shell, race the exit
//!   against the deadline, kill on timeout, collect output.
//! - [`retry`] wraps a runner in a bounded retry loop that only retries
//!   timeouts.
//! - [`backend`] provides the `CommandRunner` trait so tests can replace the
//!   real process runner with a scripted one.
//! - [`abort`] holds the shared abort-on-error flag.
//! - [`invocation`] describes what to run and how.

pub mod abort;
pub mod backend;
pub mod invocation;
pub mod process;
pub mod retry;

pub use abort::AbortFlag;
pub use backend::{AttemptFuture, CommandRunner};
pub use invocation::{CommandInvocation, DEFAULT_RETRIES, RunOptions, shell_quote, timeout_from_secs};
pub use process::ProcessRunner;
pub use retry::RetryingExecutor;
