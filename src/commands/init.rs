//! # Init Command Implementation
//!
//! This module implements the `init` subcommand, which writes a starter
//! `repo-provision.yaml` and, on request, stores an API token.
//!
//! ## Functionality
//!
//! - **Starter Config**: writes a commented configuration with the common
//!   labels and an empty reviewer model.
//! - **Token Prompt**: asks for a token with hidden input and saves it to the
//!   token file, readable only by the current user on Unix.
//! - **Force Mode**: overwrites an existing configuration file when specified.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Password};
use std::fs;
use std::path::{Path, PathBuf};

use repo_provision::config::STARTER_CONFIG;
use repo_provision::defaults::{default_token_file, DEFAULT_CONFIG_FILE};
use repo_provision::output::{emoji, OutputConfig};
use repo_provision::suggestions;

/// Write a starter configuration file
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the configuration
    #[arg(value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,

    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,

    /// Ask for a GitHub token and store it in the token file
    #[arg(long)]
    pub token_prompt: bool,
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, out: &OutputConfig) -> Result<()> {
    write_config(&args.path, args.force)?;
    println!(
        "{} Created {}",
        emoji(out, "✅", "[OK]"),
        args.path.display()
    );

    if args.token_prompt {
        let token = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("GitHub token")
            .interact()?;
        let token_file = default_token_file();
        store_token(&token_file, &token)?;
        println!(
            "{} Token stored in {}",
            emoji(out, "🔑", "[OK]"),
            token_file.display()
        );
    }

    println!(
        "{} Edit the file, then run `repo-provision validate {}`",
        emoji(out, "💡", "[NEXT]"),
        args.path.display()
    );
    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    if !is_yaml {
        return Err(suggestions::init_not_yaml(path));
    }
    if path.exists() && !force {
        return Err(suggestions::init_target_exists(path));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, STARTER_CONFIG)?;
    Ok(())
}

fn store_token(path: &Path, token: &str) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("The token cannot be empty");
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}\n", token))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
