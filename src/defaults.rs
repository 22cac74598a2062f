//! Default values for repo-provision configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Configuration file used when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "repo-provision.yaml";

/// Template choice meaning "create an empty repository".
pub const NO_TEMPLATE: &str = "No template";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Returns the directory holding repo-provision's user configuration.
///
/// Uses the platform-appropriate config directory:
/// - Linux: `~/.config/repo-provision` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/repo-provision`
/// - Windows: `{FOLDERID_RoamingAppData}\repo-provision`
///
/// Falls back to `.repo-provision` in the current directory if the
/// platform config directory cannot be determined.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("repo-provision"))
        .unwrap_or_else(|| PathBuf::from(".repo-provision"))
}

/// Returns the file `init` stores the API token in.
pub fn default_token_file() -> PathBuf {
    default_config_dir().join("github_token")
}
