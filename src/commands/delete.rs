//! # Delete Command Implementation
//!
//! Deletes a repository owned by the configured account. Meant for the
//! repositories a failed run leaves behind (`--keep-on-failure` or a rate
//! limit).

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::PathBuf;

use repo_provision::defaults::{DEFAULT_CONFIG_FILE, TOKEN_ENV};
use repo_provision::output::OutputConfig;
use repo_provision::provision::Provisioner;

/// Delete a repository
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Repository name, without the owner
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// GitHub token
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `delete` command.
pub fn execute(args: DeleteArgs, out: &OutputConfig) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let full_name = format!("{}/{}", config.user, args.name);

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Permanently delete {}?", full_name))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let client = super::github_client(&config, args.token.as_deref())?;
    let provisioner = Provisioner::new(Box::new(client), config.user.clone());
    provisioner.delete(&args.name)?;

    println!("{}", out.success(&format!("Deleted {}", full_name)));
    Ok(())
}
