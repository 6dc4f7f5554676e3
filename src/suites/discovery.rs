// src/suites/discovery.rs

//! Locating `test_defs.xml` files under an Android source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, info};

use crate::errors::Result;

use super::TestDefinitions;

pub const TEST_FILE_NAME: &str = "test_defs.xml";

/// Core platform definitions, relative to the Android root.
pub const CORE_TEST_PATH: &str = "development/testrunner/test_defs.xml";

/// Vendor definitions, relative to the Android root.
pub const VENDOR_TEST_PATTERN: &str = "vendor/*/tests/testinfo/test_defs.xml";

/// Deepest directory level below the root the vendor pattern can match.
const VENDOR_SCAN_DEPTH: usize = 4;

pub fn core_definitions_path(root: &Path) -> PathBuf {
    root.join(CORE_TEST_PATH)
}

/// `$HOME/.android/test_defs.xml`, if `HOME` is set.
pub fn default_user_definitions_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".android").join(TEST_FILE_NAME))
}

/// All vendor definition files under `root`, sorted.
pub fn vendor_definition_paths(root: &Path) -> Result<Vec<PathBuf>> {
    let matcher = vendor_matcher()?;
    let mut found = Vec::new();

    let vendor_dir = root.join("vendor");
    if vendor_dir.is_dir() {
        collect_matches(root, &vendor_dir, 1, &matcher, &mut found)?;
    }

    found.sort();
    Ok(found)
}

fn vendor_matcher() -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(VENDOR_TEST_PATTERN)
        .literal_separator(true)
        .build()
        .context("building vendor test definition pattern")?;
    Ok(glob.compile_matcher())
}

fn collect_matches(
    root: &Path,
    dir: &Path,
    depth: usize,
    matcher: &GlobMatcher,
    found: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("reading dir {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if depth < VENDOR_SCAN_DEPTH {
                collect_matches(root, &path, depth + 1, matcher, found)?;
            }
        } else if let Ok(relative) = path.strip_prefix(root) {
            if matcher.is_match(relative) {
                found.push(path);
            }
        }
    }
    Ok(())
}

/// Build the registry from the core file, every vendor file, and the user
/// file (if it exists), in that order.
pub fn load_all(root: &Path, user_file: Option<&Path>) -> Result<TestDefinitions> {
    let mut defs = TestDefinitions::new();

    let core = core_definitions_path(root);
    if !core.is_file() {
        info!("test file {} does not exist", core.display());
    }
    defs.parse_file(&core)?;

    for path in vendor_definition_paths(root)? {
        defs.parse_file(&path)?;
    }

    if let Some(user) = user_file {
        if user.is_file() {
            defs.parse_file(user)?;
        } else {
            debug!(path = %user.display(), "no user test definitions");
        }
    }

    debug!(count = defs.len(), "loaded test definitions");
    Ok(defs)
}
