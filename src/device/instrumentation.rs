// src/device/instrumentation.rs

//! `am instrument` command line formatting.

use std::collections::BTreeMap;

/// `-e key value` pairs passed to the instrumentation runner.
///
/// Kept sorted so the generated command line is stable.
pub type InstrumentationArgs = BTreeMap<String, String>;

/// What to instrument and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentationRequest {
    pub package: String,
    pub runner: String,
    /// Emit raw `INSTRUMENTATION_STATUS` output (`-r`) for other tools.
    pub raw_mode: bool,
    pub args: InstrumentationArgs,
}

impl InstrumentationRequest {
    pub fn new(package: impl Into<String>, runner: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            runner: runner.into(),
            raw_mode: false,
            args: InstrumentationArgs::new(),
        }
    }

    pub fn raw_mode(mut self, raw: bool) -> Self {
        self.raw_mode = raw;
        self
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// The shell command run on the device.
    pub fn shell_command(&self) -> String {
        let mut cmd = String::from("am instrument -w");
        if self.raw_mode {
            cmd.push_str(" -r");
        }
        for (key, value) in &self.args {
            cmd.push_str(&format!(" -e {key} {value}"));
        }
        cmd.push_str(&format!(" {}/{}", self.package, self.runner));
        cmd
    }
}
