// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

/// Command-line arguments for `runtest`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "runtest",
    version,
    about = "Build, deploy and run predefined Android instrumentation tests.",
    long_about = "The runtest tool works in two ways. You can query it for a list of \
                  tests, or you can launch one or more tests.",
    group(ArgGroup::new("target").args(["emulator", "device", "serial"]))
)]
pub struct CliArgs {
    /// Short names of the tests to run.
    #[arg(value_name = "TEST")]
    pub tests: Vec<String>,

    /// To view the list of tests.
    #[arg(short = 'l', long)]
    pub list_tests: bool,

    /// Skip build - just launch.
    #[arg(short = 'b', long)]
    pub skip_build: bool,

    /// Do not execute, just preview commands.
    #[arg(short = 'n', long = "skip-execute")]
    pub preview: bool,

    /// Raw mode (for output to other tools).
    #[arg(short = 'r', long)]
    pub raw_mode: bool,

    /// Suite assignment (see InstrumentationTestRunner).
    #[arg(short = 'a', long = "suite-assign")]
    pub suite_assign_mode: bool,

    /// Increase verbosity (debug logging).
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Wait for debugger before launching tests.
    #[arg(short = 'w', long)]
    pub wait_for_debugger: bool,

    /// Restrict test to a specific class.
    #[arg(short = 'c', long, value_name = "CLASS")]
    pub test_class: Option<String>,

    /// Restrict test to a specific method.
    #[arg(short = 'm', long, value_name = "METHOD")]
    pub test_method: Option<String>,

    /// Alternate source of user test definitions.
    ///
    /// Default: `$HOME/.android/test_defs.xml`.
    #[arg(short = 'u', long, value_name = "FILE")]
    pub user_tests_file: Option<PathBuf>,

    /// Generate code coverage metrics for test(s).
    #[arg(short = 'o', long)]
    pub coverage: bool,

    /// Run all defined tests.
    #[arg(short = 't', long)]
    pub all_tests: bool,

    /// Run all tests defined as part of the continuous test set.
    #[arg(long = "continuous")]
    pub continuous_tests: bool,

    /// Use emulator.
    #[arg(short = 'e', long, help_heading = "Targets")]
    pub emulator: bool,

    /// Use device.
    #[arg(short = 'd', long, help_heading = "Targets")]
    pub device: bool,

    /// Use specific serial.
    #[arg(short = 's', long, value_name = "SERIAL", help_heading = "Targets")]
    pub serial: Option<String>,

    /// Path to a TOML config file.
    ///
    /// Default: `$HOME/.android/runtest.toml` if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `--verbose`, `RUNTEST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// True when the arguments select something to do without naming tests.
    pub fn selects_tests_implicitly(&self) -> bool {
        self.list_tests || self.all_tests || self.continuous_tests
    }

    /// The class passed to the instrumentation runner, after applying
    /// `--test-class` and `--test-method` to the suite's own class.
    pub fn effective_class(&self, suite_class: Option<&str>) -> Option<String> {
        let class = self.test_class.as_deref().or(suite_class);
        match (class, self.test_method.as_deref()) {
            (Some(class), Some(method)) => Some(format!("{class}#{method}")),
            (Some(class), None) => Some(class.to_string()),
            (None, _) => None,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
