// src/suites/definition.rs

//! In-memory test registry.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::errors::{Result, RuntestError};

use super::parse::parse_definitions;

/// Instrumentation runner used when a definition does not name one.
pub const DEFAULT_RUNNER: &str = "android.test.InstrumentationTestRunner";

/// One predefined instrumentation test suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    pub name: String,
    /// Directory (relative to the Android root) holding the suite's `Android.mk`.
    pub build_path: Option<String>,
    pub package: String,
    pub runner: String,
    /// Restricts the run to one class when set.
    pub class_name: Option<String>,
    /// Build module whose coverage metadata the report is generated against.
    pub coverage_target: Option<String>,
    /// Part of the continuous test set.
    pub continuous: bool,
    pub description: Option<String>,
}

impl TestSuite {
    /// `package/runner`, as passed to `am instrument`.
    pub fn instrumentation_target(&self) -> String {
        format!("{}/{}", self.package, self.runner)
    }
}

/// All known suites, keyed by name.
///
/// Later definitions replace earlier ones with the same name, so vendor and
/// user files can override the core set.
#[derive(Debug, Clone, Default)]
pub struct TestDefinitions {
    suites: BTreeMap<String, TestSuite>,
}

impl TestDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `path` and merge its suites into the registry.
    pub fn parse_file(&mut self, path: &Path) -> Result<usize> {
        let contents = std::fs::read_to_string(path).map_err(|err| RuntestError::TestDefinition {
            path: path.display().to_string(),
            message: format!("cannot read file: {err}"),
        })?;
        self.parse_str(&contents, path)
    }

    /// Parse XML text; `origin` is only used in error messages.
    pub fn parse_str(&mut self, xml: &str, origin: &Path) -> Result<usize> {
        let suites = parse_definitions(xml).map_err(|message| RuntestError::TestDefinition {
            path: origin.display().to_string(),
            message,
        })?;

        let count = suites.len();
        for suite in suites {
            self.insert(suite);
        }
        debug!(path = %origin.display(), count, "parsed test definitions");
        Ok(count)
    }

    pub fn insert(&mut self, suite: TestSuite) {
        if self.suites.contains_key(&suite.name) {
            debug!(name = %suite.name, "test definition overridden");
        }
        self.suites.insert(suite.name.clone(), suite);
    }

    pub fn get_test(&self, name: &str) -> Option<&TestSuite> {
        self.suites.get(name)
    }

    /// All suites, ordered by name.
    pub fn tests(&self) -> impl Iterator<Item = &TestSuite> {
        self.suites.values()
    }

    pub fn continuous_tests(&self) -> impl Iterator<Item = &TestSuite> {
        self.suites.values().filter(|s| s.continuous)
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: &str = r#"
<test-definitions>
  <test name="apidemos" package="com.example.android.apis.tests" />
  <test name="frameworks-core" build_path="frameworks/base/tests/CoreTests"
        package="android.core" class="android.core.CoreTests"
        coverage_target="framework" continuous="true" />
</test-definitions>
"#;

    #[test]
    fn later_definition_overrides_earlier() {
        let mut defs = TestDefinitions::new();
        defs.parse_str(CORE, Path::new("core.xml")).unwrap();
        defs.parse_str(
            r#"<test-definitions><test name="apidemos" package="com.vendor" /></test-definitions>"#,
            Path::new("user.xml"),
        )
        .unwrap();

        assert_eq!(defs.len(), 2);
        assert_eq!(defs.get_test("apidemos").unwrap().package, "com.vendor");
    }

    #[test]
    fn continuous_filter_and_order() {
        let mut defs = TestDefinitions::new();
        defs.parse_str(CORE, Path::new("core.xml")).unwrap();

        let names: Vec<_> = defs.tests().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["apidemos", "frameworks-core"]);

        let continuous: Vec<_> = defs.continuous_tests().map(|s| s.name.as_str()).collect();
        assert_eq!(continuous, ["frameworks-core"]);
    }

    #[test]
    fn instrumentation_target_uses_default_runner() {
        let mut defs = TestDefinitions::new();
        defs.parse_str(CORE, Path::new("core.xml")).unwrap();
        assert_eq!(
            defs.get_test("apidemos").unwrap().instrumentation_target(),
            "com.example.android.apis.tests/android.test.InstrumentationTestRunner"
        );
    }

    #[test]
    fn parse_error_names_the_file() {
        let mut defs = TestDefinitions::new();
        let err = defs
            .parse_str("<test-definitions><test name=\"x\" /></test-definitions>", Path::new("bad.xml"))
            .unwrap_err();
        match err {
            RuntestError::TestDefinition { path, message } => {
                assert_eq!(path, "bad.xml");
                assert!(message.contains("package"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
