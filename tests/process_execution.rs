// tests/process_execution.rs

//! End-to-end behaviour of the retrying executor over real processes.

#![cfg(unix)]

mod common;
use crate::common::init_tracing;

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use runtest::errors::{AbortReason, ExecError};
use runtest::exec::{AbortFlag, CommandInvocation, CommandRunner, ProcessRunner, RetryingExecutor, RunOptions};
use runtest_test_utils::LogCapture;

const RETRY_NOTICE: &str = "no response for";

fn executor(abort: bool) -> RetryingExecutor<ProcessRunner> {
    RetryingExecutor::new(ProcessRunner::new("sh", AbortFlag::new(abort)))
}

fn attempts_recorded(path: &Path) -> usize {
    fs::read_to_string(path).map(|s| s.lines().count()).unwrap_or(0)
}

#[tokio::test]
async fn success_returns_output_without_retry() {
    init_tracing();
    let (logs, _guard) = LogCapture::install();
    let out = executor(true)
        .run("echo hello", RunOptions::default())
        .await
        .unwrap();
    assert_eq!(out.matches("hello").count(), 1);
    assert_eq!(logs.lines_containing(RETRY_NOTICE), 0);
}

#[tokio::test]
async fn persistent_timeout_uses_whole_budget() {
    init_tracing();
    let (logs, _guard) = LogCapture::install();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("attempts");
    let cmd = format!("echo attempt >> '{}'; sleep 5", marker.display());

    let started = Instant::now();
    let err = executor(true)
        .run(
            cmd,
            RunOptions::default()
                .timeout(Some(Duration::from_millis(200)))
                .retries(2),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ExecError::Timeout { .. }), "got {err:?}");
    assert_eq!(attempts_recorded(&marker), 3);
    assert_eq!(logs.lines_containing(RETRY_NOTICE), 2);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn zero_retries_is_a_single_attempt() {
    init_tracing();
    let (logs, _guard) = LogCapture::install();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("attempts");
    let cmd = format!("echo attempt >> '{}'; sleep 5", marker.display());

    let err = executor(false)
        .run(
            cmd,
            RunOptions::default()
                .timeout(Some(Duration::from_millis(200)))
                .retries(0),
        )
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(attempts_recorded(&marker), 1);
    assert_eq!(logs.lines_containing(RETRY_NOTICE), 0);
}

#[tokio::test]
async fn no_deadline_lets_command_finish() {
    init_tracing();
    for timeout in [None, Some(Duration::ZERO)] {
        let out = executor(false)
            .run("sleep 0.5; echo finished", RunOptions::default().timeout(timeout))
            .await
            .unwrap();
        assert_eq!(out, "finished\n");
    }
}

#[tokio::test]
async fn signal_death_aborts_without_retry() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("attempts");
    let cmd = format!("echo attempt >> '{}'; kill -9 $$", marker.display());

    let err = executor(true)
        .run(
            cmd,
            RunOptions::default()
                .timeout(Some(Duration::from_secs(5)))
                .retries(3),
        )
        .await
        .unwrap_err();

    match err {
        ExecError::Abort { reason, .. } => assert_eq!(reason, AbortReason::Signal(9)),
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(attempts_recorded(&marker), 1);
}

#[tokio::test]
async fn abort_flag_set_later_is_seen_by_existing_executor() {
    init_tracing();
    let flag = AbortFlag::default();
    let exec = RetryingExecutor::new(ProcessRunner::new("sh", flag.clone()));

    assert!(exec.run("kill -9 $$", RunOptions::default()).await.is_ok());

    flag.set();
    let err = exec.run("kill -9 $$", RunOptions::default()).await.unwrap_err();
    assert!(matches!(err, ExecError::Abort { .. }));
}

#[tokio::test]
async fn output_keeps_production_order() {
    init_tracing();
    let out = executor(false)
        .run("echo a; echo b", RunOptions::default())
        .await
        .unwrap();
    assert_eq!(out, "a\nb\n");
}

#[tokio::test]
async fn shell_features_are_honoured() {
    init_tracing();
    let out = executor(false)
        .run("printf 'x\\ny\\n' | grep y && echo $((1 + 2))", RunOptions::default())
        .await
        .unwrap();
    assert_eq!(out, "y\n3\n");
}

#[tokio::test]
async fn streamed_output_is_not_returned() {
    init_tracing();
    let out = executor(false)
        .run("echo streamed", RunOptions::default().streamed())
        .await
        .unwrap();
    assert_eq!(out, "");
}

#[cfg(target_os = "linux")]
fn pid_is_running(pid: u32) -> bool {
    // Zombies count as gone: they are waiting for init to reap them.
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z" && state != "X"),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn dropping_an_attempt_kills_background_children() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let inv = CommandInvocation::new(format!(
        "sleep 30 & echo $! > '{}'; wait",
        pid_file.display()
    ));
    let runner = ProcessRunner::new("sh", AbortFlag::default());

    let raced = tokio::time::timeout(Duration::from_millis(500), runner.run_once(&inv)).await;
    assert!(raced.is_err(), "attempt should still be running");

    let pid: u32 = fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(3);
    while pid_is_running(pid) && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(!pid_is_running(pid), "background child {pid} survived the drop");
}
