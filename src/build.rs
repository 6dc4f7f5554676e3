// src/build.rs

//! Android build tree helpers: locating the root and composing the
//! one-shot make invocation for the selected suites.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::errors::{Result, RuntestError};
use crate::exec::shell_quote;
use crate::suites::TestSuite;

pub const BUILD_TOP_ENV: &str = "ANDROID_BUILD_TOP";

const MAKEFILE_NAME: &str = "Android.mk";

/// Resolve the Android source root.
///
/// An explicit override wins over `ANDROID_BUILD_TOP`.
pub fn android_root(override_root: Option<&str>) -> Result<PathBuf> {
    let root = match override_root {
        Some(root) => PathBuf::from(root),
        None => match std::env::var_os(BUILD_TOP_ENV) {
            Some(root) if !root.is_empty() => PathBuf::from(root),
            _ => {
                return Err(RuntestError::Aborted(format!(
                    "{BUILD_TOP_ENV} not defined. Please run envsetup.sh"
                )));
            }
        },
    };

    if !root.is_dir() {
        return Err(RuntestError::Aborted(format!(
            "Android root {} is not a directory. Please run envsetup.sh",
            root.display()
        )));
    }
    Ok(root)
}

/// Makefile path (relative to `root`) for `build_dir`, if it exists.
pub fn build_target(root: &Path, build_dir: &str) -> Option<String> {
    let makefile = Path::new(build_dir).join(MAKEFILE_NAME);
    root.join(&makefile)
        .is_file()
        .then(|| makefile.to_string_lossy().into_owned())
}

/// Makefiles for every suite that has a buildable `build_path`.
pub fn build_targets<'a>(root: &Path, suites: impl IntoIterator<Item = &'a TestSuite>) -> BTreeSet<String> {
    suites
        .into_iter()
        .filter_map(|suite| suite.build_path.as_deref())
        .filter_map(|dir| build_target(root, dir))
        .collect()
}

/// `ONE_SHOT_MAKEFILE="<targets>" make -C "<root>" files`.
pub fn one_shot_make_command(
    root: &Path,
    targets: &BTreeSet<String>,
    make: &str,
    coverage: bool,
) -> String {
    let makefiles = targets.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    let env_prefix = if coverage { "EMMA_INSTRUMENT=true " } else { "" };
    format!(
        "{env_prefix}ONE_SHOT_MAKEFILE=\"{makefiles}\" {make} -C {} files",
        shell_quote(root.display())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn suite(name: &str, build_path: Option<&str>) -> TestSuite {
        TestSuite {
            name: name.into(),
            build_path: build_path.map(Into::into),
            package: format!("pkg.{name}"),
            runner: crate::suites::DEFAULT_RUNNER.into(),
            class_name: None,
            coverage_target: None,
            continuous: false,
            description: None,
        }
    }

    #[test]
    fn only_existing_makefiles_are_targets() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("tests/a")).unwrap();
        fs::write(dir.path().join("tests/a/Android.mk"), "").unwrap();

        let suites = [
            suite("a", Some("tests/a")),
            suite("a2", Some("tests/a")),
            suite("b", Some("tests/b")),
            suite("c", None),
        ];
        let targets = build_targets(dir.path(), &suites);
        assert_eq!(targets.into_iter().collect::<Vec<_>>(), ["tests/a/Android.mk"]);
    }

    #[test]
    fn make_command_with_and_without_coverage() {
        let targets: BTreeSet<String> = ["a/Android.mk", "b/Android.mk"]
            .into_iter()
            .map(String::from)
            .collect();
        let root = Path::new("/src/android");

        assert_eq!(
            one_shot_make_command(root, &targets, "make", false),
            r#"ONE_SHOT_MAKEFILE="a/Android.mk b/Android.mk" make -C "/src/android" files"#
        );
        assert!(one_shot_make_command(root, &targets, "make", true).starts_with("EMMA_INSTRUMENT=true "));
    }

    #[test]
    fn explicit_root_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let root = android_root(Some(dir.path().to_str().unwrap())).unwrap();
        assert_eq!(root, dir.path());

        let missing = dir.path().join("missing");
        assert!(android_root(Some(missing.to_str().unwrap())).is_err());
    }
}
