// src/exec/backend.rs

//! Pluggable single-attempt runner abstraction.
//!
//! The retry loop talks to a `CommandRunner` instead of spawning processes
//! itself. Production code uses [`ProcessRunner`](super::ProcessRunner);
//! tests can provide a runner that records invocations and replays scripted
//! outcomes without touching the OS.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::ExecError;

use super::CommandInvocation;

pub type AttemptFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ExecError>> + Send + 'a>>;

/// Runs exactly one attempt of a command.
pub trait CommandRunner: Send + Sync {
    /// Execute `invocation` once and return its captured output.
    ///
    /// Implementations must not return before the attempt's process (if
    /// any) has exited or been killed.
    fn run_once<'a>(&'a self, invocation: &'a CommandInvocation) -> AttemptFuture<'a>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for Arc<R> {
    fn run_once<'a>(&'a self, invocation: &'a CommandInvocation) -> AttemptFuture<'a> {
        (**self).run_once(invocation)
    }
}
