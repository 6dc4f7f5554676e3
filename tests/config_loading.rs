// tests/config_loading.rs

use std::io::Write;
use tempfile::NamedTempFile;
use runtest::config::load_and_validate;
use runtest::errors::RuntestError;

fn config_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{body}").unwrap();
    file
}

#[test]
fn empty_file_gives_defaults() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.exec.shell, "/bin/bash");
    assert!(cfg.exec.abort_on_error);
    assert_eq!(cfg.exec.retries, 3);
    assert_eq!(cfg.adb.path, "adb");
    assert_eq!(cfg.adb.command_timeout_secs, 20.0);
    assert_eq!(cfg.build.make, "make");
    assert!(cfg.build.android_root.is_none());
}

#[test]
fn sections_override_defaults() {
    let file = config_file(
        r#"
[exec]
shell = "/bin/sh"
abort_on_error = false
retries = 1

[adb]
path = "/opt/sdk/platform-tools/adb"
command_timeout_secs = 0

[build]
android_root = "/src/android"
make = "make -j8"
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.exec.shell, "/bin/sh");
    assert!(!cfg.exec.abort_on_error);
    assert_eq!(cfg.exec.retries, 1);
    assert_eq!(cfg.adb.path, "/opt/sdk/platform-tools/adb");
    assert_eq!(cfg.adb.command_timeout_secs, 0.0);
    assert_eq!(cfg.build.android_root.as_deref(), Some("/src/android"));
    assert_eq!(cfg.build.make, "make -j8");
}

#[test]
fn negative_timeout_is_config_error() {
    let file = config_file("[adb]\nsync_timeout_secs = -1\n");

    match load_and_validate(file.path()) {
        Err(RuntestError::ConfigError(msg)) => {
            assert!(msg.contains("sync_timeout_secs"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn empty_shell_is_config_error() {
    let file = config_file("[exec]\nshell = \"  \"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(RuntestError::ConfigError(_))
    ));
}

#[test]
fn unknown_key_is_toml_error() {
    let file = config_file("[exec]\nshel = \"/bin/sh\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(RuntestError::TomlError(_))
    ));
}
