//! Configuration fixture tests using datatest-stable for test data discovery
//!
//! Every YAML file under `tests/testdata/configs/valid` must parse and
//! validate; every file under `tests/testdata/configs/invalid` must be
//! rejected.

use repo_provision::config::{self, Config};
use std::path::Path;

fn read(path: &Path) -> datatest_stable::Result<String> {
    Ok(std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read test file {}: {}", path.display(), e))?)
}

/// A valid configuration parses and yields a usable spec skeleton.
fn test_valid_config(path: &Path) -> datatest_stable::Result<()> {
    let content = read(path)?;
    let config: Config = config::parse(&content)
        .map_err(|e| format!("Failed to parse config from {}: {}", path.display(), e))?;

    assert!(!config.user.is_empty(), "{} has no user", path.display());
    assert!(
        !config.project_types.is_empty(),
        "{} has no project types",
        path.display()
    );
    for label in &config.labels {
        assert!(
            !label.color.starts_with('#') && label.color == label.color.to_lowercase(),
            "Label colour in {} was not normalized: {}",
            path.display(),
            label.color
        );
    }

    let compiled = config.codeowners.compile();
    assert_eq!(compiled.rules.len(), config.codeowners.patterns.len());
    Ok(())
}

/// An invalid configuration is rejected with a message.
fn test_invalid_config(path: &Path) -> datatest_stable::Result<()> {
    let content = read(path)?;
    match config::parse(&content) {
        Ok(_) => Err(format!("{} should have been rejected", path.display()).into()),
        Err(err) => {
            assert!(!err.to_string().is_empty());
            Ok(())
        }
    }
}

datatest_stable::harness!(
    test_valid_config,
    "tests/testdata/configs/valid",
    r".*\.yaml$",
    test_invalid_config,
    "tests/testdata/configs/invalid",
    r".*\.yaml$"
);
