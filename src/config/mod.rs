// src/config/mod.rs

//! Configuration loading and validation for runtest.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate values that serde alone cannot check (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve};
pub use model::{AdbSection, BuildSection, ConfigFile, ExecSection, RawConfigFile};
pub use validate::validate_config;
