// src/coverage.rs

//! Code coverage support: instrumented builds and emma report generation.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::device::AdbInterface;
use crate::errors::Result;
use crate::exec::{CommandRunner, RunOptions, shell_quote};
use crate::suites::TestSuite;

/// Where the instrumentation runner writes coverage data on the device.
pub const DEVICE_COVERAGE_PATH: &str = "/sdcard/coverage.ec";

const EMMA_BUILD_PATH: &str = "external/emma";
const EMMA_JAR: &str = "external/emma/lib/emma.jar";
const COVERAGE_REPORT_PATH: &str = "out/emma";
const TARGET_INTERMEDIATES_PATH: &str = "out/target/common/obj";
const TARGET_TYPE: &str = "APPS";

#[derive(Debug, Clone)]
pub struct CoverageGenerator {
    root: PathBuf,
    enabled: bool,
}

impl CoverageGenerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            enabled: false,
        }
    }

    /// Build path of the emma tool, to be added to the build targets.
    pub fn emma_build_path(&self) -> &'static str {
        EMMA_BUILD_PATH
    }

    /// Make subsequent builds instrumented for coverage.
    pub fn enable_coverage_build(&mut self) {
        self.enabled = true;
    }

    pub fn is_coverage_build(&self) -> bool {
        self.enabled
    }

    /// Local directory a suite's coverage data and report go to.
    pub fn output_dir(&self, target: &str, suite: &TestSuite) -> PathBuf {
        self.root
            .join(COVERAGE_REPORT_PATH)
            .join(target)
            .join(&suite.name)
    }

    /// Emma metadata produced by the instrumented build of `target`.
    pub fn metadata_path(&self, target: &str) -> PathBuf {
        self.root
            .join(TARGET_INTERMEDIATES_PATH)
            .join(TARGET_TYPE)
            .join(format!("{target}_intermediates"))
            .join("coverage.em")
    }

    pub fn report_command(&self, metadata: &Path, coverage_file: &Path, report: &Path) -> String {
        format!(
            "java -cp {} emma report -r html -in {} -in {} {}",
            shell_quote(self.root.join(EMMA_JAR).display()),
            shell_quote(metadata.display()),
            shell_quote(coverage_file.display()),
            shell_quote(format_args!("-Dreport.html.out.file={}", report.display()))
        )
    }

    /// Pull the suite's coverage data and render an html report.
    ///
    /// Returns the report path, or `None` when the suite has no coverage
    /// target or no coverage data was found on the device.
    pub async fn extract_report<R: CommandRunner>(
        &self,
        adb: &AdbInterface<R>,
        suite: &TestSuite,
    ) -> Result<Option<PathBuf>> {
        let Some(target) = suite.coverage_target.as_deref() else {
            debug!(suite = %suite.name, "no coverage target defined");
            return Ok(None);
        };

        let output_dir = self.output_dir(target, suite);
        let coverage_file = output_dir.join(format!("{}.ec", suite.name));
        if !adb.pull(DEVICE_COVERAGE_PATH, &coverage_file).await? {
            return Ok(None);
        }

        let metadata = self.metadata_path(target);
        if !metadata.is_file() {
            info!(
                "Warning: coverage metadata {} not found; was the build instrumented?",
                metadata.display()
            );
        }

        let report = output_dir.join(format!("{}.html", suite.name));
        let cmd = self.report_command(&metadata, &coverage_file, &report);
        adb.executor()
            .run(cmd, RunOptions::default().retries(0))
            .await?;
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite() -> TestSuite {
        TestSuite {
            name: "frameworks-core".into(),
            build_path: None,
            package: "android.core".into(),
            runner: crate::suites::DEFAULT_RUNNER.into(),
            class_name: None,
            coverage_target: Some("framework".into()),
            continuous: false,
            description: None,
        }
    }

    #[test]
    fn paths_follow_build_layout() {
        let cov = CoverageGenerator::new("/src/android");
        assert_eq!(
            cov.output_dir("framework", &suite()),
            Path::new("/src/android/out/emma/framework/frameworks-core")
        );
        assert_eq!(
            cov.metadata_path("framework"),
            Path::new("/src/android/out/target/common/obj/APPS/framework_intermediates/coverage.em")
        );
    }

    #[test]
    fn report_command_line() {
        let cov = CoverageGenerator::new("/r");
        let cmd = cov.report_command(Path::new("/m.em"), Path::new("/c.ec"), Path::new("/o.html"));
        assert_eq!(
            cmd,
            "java -cp \"/r/external/emma/lib/emma.jar\" emma report -r html -in \"/m.em\" \
             -in \"/c.ec\" \"-Dreport.html.out.file=/o.html\""
        );
    }

    #[test]
    fn report_command_quotes_paths_with_spaces() {
        let cov = CoverageGenerator::new("/src/my android");
        let cmd = cov.report_command(
            Path::new("/m.em"),
            Path::new("/out dir/c.ec"),
            Path::new("/out dir/r.html"),
        );
        assert!(cmd.starts_with("java -cp \"/src/my android/external/emma/lib/emma.jar\""));
        assert!(cmd.contains("-in \"/out dir/c.ec\""));
        assert!(cmd.ends_with("\"-Dreport.html.out.file=/out dir/r.html\""));
    }

    #[test]
    fn coverage_build_toggle() {
        let mut cov = CoverageGenerator::new("/r");
        assert!(!cov.is_coverage_build());
        cov.enable_coverage_build();
        assert!(cov.is_coverage_build());
        assert_eq!(cov.emma_build_path(), "external/emma");
    }
}
