//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `repo-provision` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic, calling into the `repo_provision` library.

pub mod create;
pub mod delete;
pub mod init;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use repo_provision::config::{self, Config};
use repo_provision::defaults::default_token_file;
use repo_provision::github::GithubClient;
use repo_provision::suggestions;

/// Loads the configuration, turning a missing file into a hinted error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.is_file() {
        return Err(suggestions::config_not_found(path));
    }
    Ok(config::from_file(path)?)
}

/// Builds an API client for the configured endpoint, resolving the token.
pub fn github_client(config: &Config, token: Option<&str>) -> Result<GithubClient> {
    let token_file = default_token_file();
    let token = config
        .resolve_token(token, &token_file)
        .ok_or_else(|| suggestions::token_missing(&token_file))?;
    Ok(GithubClient::with_base_url(config.api_url(), token)?)
}
