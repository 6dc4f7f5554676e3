// src/device/adb.rs

//! Thin client over the `adb` command line tool.
//!
//! Every call becomes one shell command run through the
//! [`RetryingExecutor`], so device hangs surface as timeouts and signal
//! deaths follow the shared abort policy.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, info};

use crate::config::AdbSection;
use crate::errors::{ExecError, Result};
use crate::exec::{
    CommandRunner, DEFAULT_RETRIES, RetryingExecutor, RunOptions, shell_quote, timeout_from_secs,
};

use super::instrumentation::InstrumentationRequest;

/// Which device `adb` should talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AdbTarget {
    /// Whatever single device adb picks.
    #[default]
    Any,
    /// `-e`: the only running emulator.
    Emulator,
    /// `-d`: the only attached USB device.
    Device,
    /// `-s <serial>`.
    Serial(String),
}

impl AdbTarget {
    fn args(&self) -> Option<String> {
        match self {
            AdbTarget::Any => None,
            AdbTarget::Emulator => Some("-e".to_string()),
            AdbTarget::Device => Some("-d".to_string()),
            AdbTarget::Serial(serial) => Some(format!("-s {}", shell_quote(serial))),
        }
    }
}

/// Poll interval while waiting for the package manager to come up.
const DEVICE_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct AdbInterface<R> {
    executor: RetryingExecutor<R>,
    target: AdbTarget,
    adb_path: String,
    command_timeout: Option<Duration>,
    sync_timeout: Option<Duration>,
    /// `None` waits for the package manager indefinitely.
    device_wait: Option<Duration>,
    retries: u32,
}

impl<R: CommandRunner> AdbInterface<R> {
    pub fn new(executor: RetryingExecutor<R>, settings: &AdbSection) -> Self {
        Self {
            executor,
            target: AdbTarget::Any,
            adb_path: settings.path.clone(),
            command_timeout: timeout_from_secs(settings.command_timeout_secs),
            sync_timeout: timeout_from_secs(settings.sync_timeout_secs),
            device_wait: timeout_from_secs(settings.device_wait_secs),
            retries: DEFAULT_RETRIES,
        }
    }

    /// Retry budget for ordinary adb commands.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn set_target(&mut self, target: AdbTarget) {
        self.target = target;
    }

    pub fn target(&self) -> &AdbTarget {
        &self.target
    }

    pub fn executor(&self) -> &RetryingExecutor<R> {
        &self.executor
    }

    /// Full `adb` command line for the given adb sub-command.
    pub fn command_line(&self, command: &str) -> String {
        match self.target.args() {
            Some(target) => format!("{} {} {}", self.adb_path, target, command),
            None => format!("{} {}", self.adb_path, command),
        }
    }

    /// Run an adb sub-command with the default command timeout.
    pub async fn send_command(&self, command: &str) -> Result<String> {
        let options = RunOptions::default()
            .timeout(self.command_timeout)
            .retries(self.retries);
        self.send_command_with(command, options).await
    }

    pub async fn send_command_with(&self, command: &str, options: RunOptions) -> Result<String> {
        let adb_cmd = self.command_line(command);
        debug!(cmd = %adb_cmd, "about to run adb command");
        match self.executor.run(adb_cmd, options).await {
            Ok(output) => Ok(output),
            Err(err @ ExecError::Timeout { .. }) => {
                info!("Error: response time exceeded");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn send_shell_command(&self, command: &str) -> Result<String> {
        self.send_command(&format!("shell {command}")).await
    }

    /// True if the selected device answers `get-state` with `device`.
    pub async fn is_device_present(&self) -> bool {
        let options = RunOptions::default()
            .timeout(self.command_timeout)
            .retries(0);
        match self.send_command_with("get-state", options).await {
            Ok(output) => output.lines().any(|line| line.trim() == "device"),
            Err(err) => {
                debug!(error = %err, "device presence check failed");
                false
            }
        }
    }

    /// Copy `src` from the device to the local `dest`.
    ///
    /// Returns `false` without pulling when the device file does not exist.
    pub async fn pull(&self, src: &str, dest: &Path) -> Result<bool> {
        let listing = self
            .send_shell_command(&format!("ls {}", shell_quote(src)))
            .await?;
        if listing.trim().is_empty() || listing.contains("No such file") {
            info!("Error: {src} not found on device");
            return Ok(false);
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating dir {}", parent.display()))?;
        }

        self.send_command(&format!(
            "pull {} {}",
            shell_quote(src),
            shell_quote(dest.display())
        ))
        .await?;
        Ok(true)
    }

    /// Remount, push built files to the device and wait until it is usable.
    pub async fn sync(&self) -> Result<()> {
        self.send_command("remount").await?;
        let options = RunOptions::default()
            .timeout(self.sync_timeout)
            .retries(self.retries);
        let output = self.send_command_with("sync", options).await?;
        debug!(output = %output.trim(), "adb sync finished");
        self.wait_for_device_ready().await
    }

    /// Poll the package manager until it responds or the wait limit passes.
    pub async fn wait_for_device_ready(&self) -> Result<()> {
        info!("Waiting for device package manager...");
        let started = Instant::now();
        let command = self.command_line("shell pm path android");
        let options = RunOptions::default()
            .timeout(self.command_timeout)
            .retries(0);

        loop {
            // Unanswered polls are expected while the device boots.
            match self.executor.run(command.as_str(), options).await {
                Ok(output) if output.contains("package:") => {
                    debug!(elapsed = ?started.elapsed(), "package manager is up");
                    return Ok(());
                }
                Ok(_) => {}
                Err(err) if err.is_retryable() => {
                    debug!(elapsed = ?started.elapsed(), "package manager poll timed out");
                }
                Err(err) => return Err(err.into()),
            }

            if let Some(limit) = self.device_wait {
                if started.elapsed() >= limit {
                    return Err(ExecError::Timeout {
                        command,
                        timeout: limit,
                    }
                    .into());
                }
            }
            tokio::time::sleep(DEVICE_POLL_INTERVAL).await;
        }
    }

    /// Full `adb ... am instrument ...` command line, for preview mode.
    pub fn preview_instrumentation_command(&self, request: &InstrumentationRequest) -> String {
        self.command_line(&format!("shell {}", request.shell_command()))
    }

    /// Launch an instrumentation run with its output going straight to the
    /// terminal.
    pub async fn start_instrumentation_no_results(
        &self,
        request: &InstrumentationRequest,
    ) -> Result<()> {
        let options = RunOptions::default().retries(0).streamed();
        self.send_command_with(&format!("shell {}", request.shell_command()), options)
            .await?;
        Ok(())
    }
}
