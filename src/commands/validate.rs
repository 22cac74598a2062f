//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a
//! configuration file without calling the API.
//!
//! ## Functionality
//!
//! - **Configuration Validation**: parses the file and runs every
//!   configuration check.
//! - **Spec Assembly**: builds the repository spec from the configured
//!   defaults, which reads every local file and issue body.
//! - **Ownership Preview**: with `--codeowners`, prints the `CODEOWNERS`
//!   file that would be committed.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use repo_provision::config::Config;
use repo_provision::defaults::DEFAULT_CONFIG_FILE;
use repo_provision::loader::{Answers, SpecLoader};
use repo_provision::output::{emoji, OutputConfig};
use repo_provision::spec::RepositorySpec;

/// Validate a configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate
    #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print the generated CODEOWNERS file
    #[arg(long)]
    pub codeowners: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, out: &OutputConfig) -> Result<()> {
    println!(
        "{} Validating configuration: {}",
        emoji(out, "🔍", "[SCAN]"),
        args.config.display()
    );

    let config = super::load_config(&args.config)?;
    println!("{}", out.success("Configuration file parsed successfully"));

    let spec = SpecLoader::new(&config).load(&sample_answers(&config))?;
    spec.validate()?;
    println!("{}", out.success("Repository spec assembled"));

    for (label, value) in summary(&config, &spec) {
        println!("{}", out.field(&label, value));
    }
    if !config.ci_checks().is_empty() {
        println!(
            "{}",
            out.warning("pull_requests.ci_checks is declared but no status checks are configured")
        );
    }

    if args.codeowners {
        let compiled = spec.codeowners().compile();
        if compiled.has_owners() {
            println!();
            print!("{}", compiled.render());
        } else {
            println!("{}", out.warning("No CODEOWNERS file would be generated"));
        }
    }

    println!("{}", out.success("Configuration is valid"));
    Ok(())
}

/// Answers from the configured defaults, with placeholders for a missing
/// identity so the rest of the configuration can still be checked.
fn sample_answers(config: &Config) -> Answers {
    let mut answers = Answers::from_defaults(config);
    if answers.client_name.trim().is_empty() {
        answers.client_name = "client".to_string();
    }
    if answers.project_name.trim().is_empty() {
        answers.project_name = "project".to_string();
    }
    answers
}

fn summary(config: &Config, spec: &RepositorySpec) -> Vec<(String, String)> {
    let templates = config.template_names();
    vec![
        ("Owner".to_string(), config.user.clone()),
        ("Example name".to_string(), spec.name().to_string()),
        ("Project types".to_string(), config.project_types.join(", ")),
        (
            "Templates".to_string(),
            if templates.is_empty() {
                "none".to_string()
            } else {
                templates.join(", ")
            },
        ),
        ("Files".to_string(), spec.files().len().to_string()),
        ("Folders".to_string(), spec.folders().len().to_string()),
        ("Labels".to_string(), spec.labels().len().to_string()),
        ("Milestones".to_string(), spec.milestones().len().to_string()),
        ("Issues".to_string(), spec.issues().len().to_string()),
        (
            "Reviewers".to_string(),
            spec.codeowners().list_reviewers().len().to_string(),
        ),
    ]
}
