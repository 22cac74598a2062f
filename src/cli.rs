//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use repo_provision::output::{ColorChoice, OutputConfig};

/// Provision fully configured GitHub repositories from a YAML file
#[derive(Parser, Debug)]
#[command(name = "repo-provision")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output
    #[arg(long, global = true, value_name = "WHEN", value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create and configure a new repository
    Create(commands::create::CreateArgs),

    /// Write a starter configuration file
    Init(commands::init::InitArgs),

    /// Check a configuration file without calling the API
    Validate(commands::validate::ValidateArgs),

    /// Delete a repository, for example one kept after a failed run
    Delete(commands::delete::DeleteArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let level = self
            .log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Warn);
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp(None)
            .init();

        let out = OutputConfig::new(self.color);

        match self.command {
            Commands::Create(args) => commands::create::execute(args, &out),
            Commands::Init(args) => commands::init::execute(args, &out),
            Commands::Validate(args) => commands::validate::execute(args, &out),
            Commands::Delete(args) => commands::delete::execute(args, &out),
        }
    }
}
