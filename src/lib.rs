// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod device;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod orchestrator;
pub mod suites;

use clap::CommandFactory;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::device::{AdbInterface, AdbTarget};
use crate::errors::{Result, RuntestError};
use crate::exec::{AbortFlag, ProcessRunner, RetryingExecutor};
use crate::orchestrator::TestRunner;
use crate::suites::discovery::default_user_definitions_path;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - Android root and test definition discovery
/// - the process runner, retry loop and adb client
/// - Ctrl-C handling
///
/// Timeouts that exhausted their retries and aborts are logged here and
/// returned as errors so the process exits with failure.
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let outcome = tokio::select! {
        res = run_inner(args) => res,
        Ok(()) = tokio::signal::ctrl_c() => {
            // Dropping the run future kills any in-flight child.
            info!("Exiting...");
            return Ok(());
        }
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err) if err.is_timeout() => {
            info!("Timed out waiting for response");
            Err(err.into())
        }
        Err(err) if err.is_abort() => {
            debug!("Exiting due to abort...");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_inner(args: CliArgs) -> Result<()> {
    let config = config::resolve(args.config.as_deref())?;

    if !args.selects_tests_implicitly() && args.tests.is_empty() {
        CliArgs::command().print_help()?;
        debug!("at least one test name must be specified");
        return Err(RuntestError::Aborted(
            "at least one test name must be specified".to_string(),
        ));
    }

    let mut runner = build_test_runner(args, config)?;
    runner.run_tests().await
}

/// Construct the production `TestRunner` from parsed arguments and config.
pub fn build_test_runner(args: CliArgs, config: ConfigFile) -> Result<TestRunner<ProcessRunner>> {
    let root = build::android_root(config.build.android_root.as_deref())?;

    let user_file = args
        .user_tests_file
        .clone()
        .or_else(default_user_definitions_path);
    let known_tests = suites::load_all(&root, user_file.as_deref())?;

    // The flag starts cleared; `run_tests` sets it per config.
    let abort_flag = AbortFlag::default();
    let runner = ProcessRunner::new(config.exec.shell.clone(), abort_flag.clone());
    let executor = RetryingExecutor::new(runner);

    let mut adb = AdbInterface::new(executor, &config.adb).with_retries(config.exec.retries);
    adb.set_target(adb_target(&args));

    Ok(TestRunner::new(args, config, root, known_tests, adb, abort_flag))
}

/// Device selection from `-e` / `-d` / `-s`.
pub fn adb_target(args: &CliArgs) -> AdbTarget {
    if args.emulator {
        AdbTarget::Emulator
    } else if args.device {
        AdbTarget::Device
    } else if let Some(serial) = &args.serial {
        AdbTarget::Serial(serial.clone())
    } else {
        AdbTarget::Any
    }
}
