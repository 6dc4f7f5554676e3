// src/config/model.rs

use serde::Deserialize;

use crate::exec::process::DEFAULT_SHELL;
use crate::exec::DEFAULT_RETRIES;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [exec]
/// shell = "/bin/bash"
/// abort_on_error = true
/// retries = 3
///
/// [adb]
/// path = "adb"
/// command_timeout_secs = 20.0
///
/// [build]
/// android_root = "/src/android"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub exec: ExecSection,

    #[serde(default)]
    pub adb: AdbSection,

    #[serde(default)]
    pub build: BuildSection,
}

/// Validated configuration. Only constructible through `TryFrom<RawConfigFile>`
/// (see `validate.rs`) or [`ConfigFile::default`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub exec: ExecSection,
    pub adb: AdbSection,
    pub build: BuildSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            exec: raw.exec,
            adb: raw.adb,
            build: raw.build,
        }
    }
}

/// `[exec]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecSection {
    /// Shell interpreter every command is run through (`<shell> -c <cmd>`).
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Initial state of the shared abort flag. When set, a command killed by
    /// a signal stops the whole run instead of being ignored.
    #[serde(default = "default_true")]
    pub abort_on_error: bool,

    /// Default number of retries after a timed-out attempt.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            abort_on_error: true,
            retries: default_retries(),
        }
    }
}

/// `[adb]` section. Timeouts are in seconds; `0` disables the deadline.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdbSection {
    #[serde(default = "default_adb_path")]
    pub path: String,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: f64,

    #[serde(default = "default_sync_timeout")]
    pub sync_timeout_secs: f64,

    /// How long to wait for the package manager after a sync.
    #[serde(default = "default_device_wait")]
    pub device_wait_secs: f64,
}

impl Default for AdbSection {
    fn default() -> Self {
        Self {
            path: default_adb_path(),
            command_timeout_secs: default_command_timeout(),
            sync_timeout_secs: default_sync_timeout(),
            device_wait_secs: default_device_wait(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Android source root; overrides `ANDROID_BUILD_TOP` when set.
    #[serde(default)]
    pub android_root: Option<String>,

    #[serde(default = "default_make")]
    pub make: String,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            android_root: None,
            make: default_make(),
        }
    }
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_command_timeout() -> f64 {
    20.0
}

fn default_sync_timeout() -> f64 {
    300.0
}

fn default_device_wait() -> f64 {
    120.0
}

fn default_make() -> String {
    "make".to_string()
}
