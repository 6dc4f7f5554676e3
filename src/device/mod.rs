// src/device/mod.rs

//! Device communication through `adb`.

pub mod adb;
pub mod instrumentation;

pub use adb::{AdbInterface, AdbTarget};
pub use instrumentation::{InstrumentationArgs, InstrumentationRequest};
