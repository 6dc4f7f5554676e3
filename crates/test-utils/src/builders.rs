#![allow(dead_code)]

use runtest::suites::{DEFAULT_RUNNER, TestDefinitions, TestSuite};

/// Builder for `TestSuite` to simplify test setup.
pub struct TestSuiteBuilder {
    suite: TestSuite,
}

impl TestSuiteBuilder {
    pub fn new(name: &str, package: &str) -> Self {
        Self {
            suite: TestSuite {
                name: name.to_string(),
                build_path: None,
                package: package.to_string(),
                runner: DEFAULT_RUNNER.to_string(),
                class_name: None,
                coverage_target: None,
                continuous: false,
                description: None,
            },
        }
    }

    pub fn build_path(mut self, path: &str) -> Self {
        self.suite.build_path = Some(path.to_string());
        self
    }

    pub fn runner(mut self, runner: &str) -> Self {
        self.suite.runner = runner.to_string();
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.suite.class_name = Some(class.to_string());
        self
    }

    pub fn coverage_target(mut self, target: &str) -> Self {
        self.suite.coverage_target = Some(target.to_string());
        self
    }

    pub fn continuous(mut self, val: bool) -> Self {
        self.suite.continuous = val;
        self
    }

    pub fn build(self) -> TestSuite {
        self.suite
    }
}

/// Builder for a `TestDefinitions` registry.
#[derive(Default)]
pub struct TestDefinitionsBuilder {
    defs: TestDefinitions,
}

impl TestDefinitionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suite(mut self, suite: TestSuite) -> Self {
        self.defs.insert(suite);
        self
    }

    pub fn build(self) -> TestDefinitions {
        self.defs
    }
}
