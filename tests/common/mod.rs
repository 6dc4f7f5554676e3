#![allow(dead_code)]

use std::fs;
use std::path::Path;

use runtest::cli::CliArgs;
use runtest::config::ConfigFile;
use runtest::device::AdbInterface;
use runtest::exec::{AbortFlag, RetryingExecutor};
use runtest::orchestrator::TestRunner;
use runtest::suites::TestDefinitions;
use runtest_test_utils::ScriptedRunner;

pub use runtest_test_utils::init_tracing;

/// Create `rel` (and its parents) under `root` with `body`.
pub fn write_file(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

/// A `TestRunner` whose commands all go to `runner`.
pub fn scripted_test_runner(
    args: CliArgs,
    root: &Path,
    known_tests: TestDefinitions,
    runner: ScriptedRunner,
) -> (TestRunner<ScriptedRunner>, AbortFlag) {
    let config = ConfigFile::default();
    let abort_flag = AbortFlag::default();
    let adb = AdbInterface::new(RetryingExecutor::new(runner), &config.adb);
    let test_runner = TestRunner::new(
        args,
        config,
        root.to_path_buf(),
        known_tests,
        adb,
        abort_flag.clone(),
    );
    (test_runner, abort_flag)
}
