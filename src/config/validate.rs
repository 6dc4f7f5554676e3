// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RuntestError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RuntestError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_exec(cfg)?;
    validate_adb(cfg)?;
    validate_build(cfg)?;
    Ok(())
}

fn validate_exec(cfg: &RawConfigFile) -> Result<()> {
    if cfg.exec.shell.trim().is_empty() {
        return Err(RuntestError::ConfigError(
            "[exec].shell must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_adb(cfg: &RawConfigFile) -> Result<()> {
    if cfg.adb.path.trim().is_empty() {
        return Err(RuntestError::ConfigError(
            "[adb].path must not be empty".to_string(),
        ));
    }

    let timeouts = [
        ("command_timeout_secs", cfg.adb.command_timeout_secs),
        ("sync_timeout_secs", cfg.adb.sync_timeout_secs),
        ("device_wait_secs", cfg.adb.device_wait_secs),
    ];
    for (name, value) in timeouts {
        if !value.is_finite() || value < 0.0 {
            return Err(RuntestError::ConfigError(format!(
                "[adb].{name} must be a finite number >= 0 (got {value})"
            )));
        }
    }
    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.make.trim().is_empty() {
        return Err(RuntestError::ConfigError(
            "[build].make must not be empty".to_string(),
        ));
    }
    if let Some(root) = &cfg.build.android_root {
        if root.trim().is_empty() {
            return Err(RuntestError::ConfigError(
                "[build].android_root must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}
