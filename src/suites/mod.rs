// src/suites/mod.rs

//! Predefined test suites.
//!
//! - [`definition`]: `TestSuite` and the `TestDefinitions` registry.
//! - [`parse`]: `test_defs.xml` parsing.
//! - [`discovery`]: where definition files live in an Android tree.

pub mod definition;
pub mod discovery;
pub mod parse;

pub use definition::{DEFAULT_RUNNER, TestDefinitions, TestSuite};
pub use discovery::load_all;
