// src/orchestrator.rs

//! Top-level test flow: list, build, deploy and launch the selected suites.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::build;
use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::coverage::CoverageGenerator;
use crate::device::{AdbInterface, InstrumentationRequest};
use crate::errors::{Result, RuntestError};
use crate::exec::{AbortFlag, CommandRunner, RunOptions};
use crate::suites::{TestDefinitions, TestSuite};

/// Runs pre-defined Android instrumentation tests according to the command
/// line.
#[derive(Debug)]
pub struct TestRunner<R> {
    args: CliArgs,
    config: ConfigFile,
    root: PathBuf,
    known_tests: TestDefinitions,
    adb: AdbInterface<R>,
    coverage: CoverageGenerator,
    abort_flag: AbortFlag,
}

impl<R: CommandRunner> TestRunner<R> {
    /// `abort_flag` must be the flag shared with the runner behind `adb`.
    pub fn new(
        args: CliArgs,
        config: ConfigFile,
        root: PathBuf,
        known_tests: TestDefinitions,
        adb: AdbInterface<R>,
        abort_flag: AbortFlag,
    ) -> Self {
        let coverage = CoverageGenerator::new(&root);
        Self {
            args,
            config,
            root,
            known_tests,
            adb,
            coverage,
            abort_flag,
        }
    }

    pub fn known_tests(&self) -> &TestDefinitions {
        &self.known_tests
    }

    /// Main entry method: executes the tests according to command line args.
    pub async fn run_tests(&mut self) -> Result<()> {
        if self.config.exec.abort_on_error {
            self.abort_flag.set();
        }

        if self.args.list_tests {
            self.dump_tests();
            return Ok(());
        }

        if !self.adb.is_device_present().await {
            info!("Error: specified device cannot be found");
            return Ok(());
        }

        if !self.args.skip_build {
            self.do_build().await?;
        }

        for suite in self.tests_to_run()? {
            self.run_test(&suite).await?;
        }
        Ok(())
    }

    /// Prints out the set of defined tests.
    pub fn dump_tests(&self) {
        println!("The following tests are currently defined:");
        for suite in self.known_tests.tests() {
            println!("{}", suite.name);
        }
    }

    /// Suites selected by `--all-tests`, `--continuous` or by name.
    pub fn tests_to_run(&self) -> Result<Vec<TestSuite>> {
        if self.args.all_tests {
            return Ok(self.known_tests.tests().cloned().collect());
        }
        if self.args.continuous_tests {
            return Ok(self.known_tests.continuous_tests().cloned().collect());
        }

        let mut suites = Vec::with_capacity(self.args.tests.len());
        for name in &self.args.tests {
            match self.known_tests.get_test(name) {
                Some(suite) => suites.push(suite.clone()),
                None => {
                    info!("Error: Could not find test {name}");
                    self.dump_tests();
                    return Err(RuntestError::TestNotFound(name.clone()));
                }
            }
        }
        Ok(suites)
    }

    async fn do_build(&mut self) -> Result<()> {
        debug!("Building tests...");
        let suites = self.tests_to_run()?;
        let mut targets = build::build_targets(&self.root, &suites);
        if targets.is_empty() {
            debug!("nothing to build");
            return Ok(());
        }

        if self.args.coverage {
            self.coverage.enable_coverage_build();
            if let Some(emma) = build::build_target(&self.root, self.coverage.emma_build_path()) {
                targets.insert(emma);
            }
        }

        let target_list: Vec<&str> = targets.iter().map(String::as_str).collect();
        info!("mmm {}", target_list.join(" "));

        let cmd = build::one_shot_make_command(
            &self.root,
            &targets,
            &self.config.build.make,
            self.coverage.is_coverage_build(),
        );

        if self.args.preview {
            // Only show what would have been run.
            debug!(cmd = %cmd, "preview: skipping build");
            info!("adb sync");
            return Ok(());
        }

        let options = RunOptions::default()
            .retries(self.config.exec.retries)
            .streamed();
        self.adb.executor().run(cmd, options).await?;

        info!("Syncing to device...");
        self.adb.sync().await
    }

    /// Instrumentation request for `suite`, with the command-line overrides
    /// applied.
    pub fn instrumentation_request(&self, suite: &TestSuite) -> InstrumentationRequest {
        let mut request = InstrumentationRequest::new(&suite.package, &suite.runner)
            .raw_mode(self.args.raw_mode);

        if let Some(class) = self.args.effective_class(suite.class_name.as_deref()) {
            request = request.arg("class", class);
        }
        if self.args.wait_for_debugger {
            request = request.arg("debug", "true");
        }
        if self.args.suite_assign_mode {
            request = request.arg("suiteAssignment", "true");
        }
        if self.args.coverage {
            request = request.arg("coverage", "true");
        }
        request
    }

    async fn run_test(&self, suite: &TestSuite) -> Result<()> {
        let request = self.instrumentation_request(suite);

        if self.args.preview {
            info!("{}", self.adb.preview_instrumentation_command(&request));
            return Ok(());
        }

        debug!(suite = %suite.name, "launching instrumentation");
        self.adb.start_instrumentation_no_results(&request).await?;

        if self.args.coverage && suite.coverage_target.is_some() {
            if let Some(report) = self.coverage.extract_report(&self.adb, suite).await? {
                info!("Coverage report generated at {}", report.display());
            }
        }
        Ok(())
    }
}
