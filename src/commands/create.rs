//! # Create Command Implementation
//!
//! This module implements the `create` subcommand, which provisions a new
//! repository from the configuration file.
//!
//! ## Functionality
//!
//! - **Answers**: client, project, type, description, visibility, template,
//!   main branch and extra contributors are asked interactively, pre-filled
//!   from the configuration defaults and command line flags. `--yes` skips
//!   the questions.
//! - **Provisioning**: the repository is created and configured step by step
//!   while a spinner runs.
//! - **Failure reporting**: the failed step and the rollback outcome are
//!   printed, with a hint when the repository was left behind.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::path::PathBuf;

use repo_provision::config::Config;
use repo_provision::defaults::{DEFAULT_CONFIG_FILE, TOKEN_ENV};
use repo_provision::error::Error;
use repo_provision::loader::{Answers, SpecLoader};
use repo_provision::output::{emoji, OutputConfig};
use repo_provision::provision::{ProvisionError, Provisioner};
use repo_provision::spec::Visibility;
use repo_provision::suggestions;

/// Create and configure a new repository
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Path to the configuration file
    #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Keep the partially created repository when a step fails
    #[arg(long)]
    pub keep_on_failure: bool,

    /// GitHub token
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Accept the defaults instead of asking
    #[arg(short, long)]
    pub yes: bool,

    /// Client name
    #[arg(long)]
    pub client: Option<String>,

    /// Project name
    #[arg(long)]
    pub project: Option<String>,

    /// Project type, one of the configured project types
    #[arg(long = "type", value_name = "TYPE")]
    pub project_type: Option<String>,

    /// Repository description
    #[arg(long)]
    pub description: Option<String>,

    /// public or private
    #[arg(long)]
    pub visibility: Option<String>,

    /// Template repository (owner/repo) or "No template"
    #[arg(long)]
    pub template: Option<String>,

    /// Name of the default branch
    #[arg(long)]
    pub main_branch: Option<String>,

    /// Additional collaborator (repeatable)
    #[arg(long = "contributor", value_name = "USERNAME")]
    pub contributors: Vec<String>,
}

/// Execute the `create` command.
pub fn execute(args: CreateArgs, out: &OutputConfig) -> Result<()> {
    let config = super::load_config(&args.config)?;

    let mut answers = answers_from_flags(&config, &args)?;
    if !args.yes {
        answers = ask(&config, answers, out)?;
    }
    check_choices(&config, &answers)?;

    let spec = SpecLoader::new(&config).load(&answers)?;
    let client = super::github_client(&config, args.token.as_deref())?;
    let provisioner =
        Provisioner::new(Box::new(client), config.user.clone()).keep_on_failure(args.keep_on_failure);

    let spinner = out.spinner(format!("Provisioning {}/{}", config.user, spec.name()));
    let result = provisioner.provision(&spec);
    spinner.finish_and_clear();

    match result {
        Ok(provisioned) => {
            println!(
                "{}",
                out.success(&format!("Created {}", provisioned.repository.full_name()))
            );
            if let Some(url) = &provisioned.repository.html_url {
                println!("{}", out.field("URL", url));
            }
            println!("{}", out.field("Visibility", spec.visibility()));
            println!("{}", out.field("Default branch", spec.default_branch()));
            if let Some(template) = spec.template() {
                println!("{}", out.field("Template", template));
            }
            if provisioned.codeowners_committed {
                println!("{}", out.field("Code owners", "generated"));
            }
            Ok(())
        }
        Err(err) => {
            println!("{}", out.failure(&format!("{} failed during {}", err.repository, err.step)));
            println!("{}", out.field("Rollback", &err.rollback));
            Err(failure_report(err))
        }
    }
}

/// Converts a failed run into the error returned to the operator.
fn failure_report(err: ProvisionError) -> anyhow::Error {
    if let Error::RateLimited { reset_at, .. } = &err.source {
        return suggestions::rate_limited(&err.repository, &err.to_string(), *reset_at);
    }
    if err.rollback.repository_left_behind() {
        return suggestions::repository_left_behind(&err.repository, &err.to_string());
    }
    anyhow::Error::new(err)
}

/// Configuration defaults overridden by whatever was passed on the command
/// line.
fn answers_from_flags(config: &Config, args: &CreateArgs) -> Result<Answers> {
    let mut answers = Answers::from_defaults(config);

    let overrides = [
        (&args.client, &mut answers.client_name),
        (&args.project, &mut answers.project_name),
        (&args.project_type, &mut answers.project_type),
        (&args.description, &mut answers.description),
        (&args.main_branch, &mut answers.main_branch),
    ];
    for (flag, answer) in overrides {
        if let Some(value) = flag {
            *answer = value.trim().to_string();
        }
    }

    if let Some(visibility) = &args.visibility {
        answers.visibility = parse_visibility(visibility)?;
    }
    if args.template.is_some() {
        answers.template = args.template.clone();
    }
    for contributor in &args.contributors {
        if !answers.contributors.contains(contributor) {
            answers.contributors.push(contributor.clone());
        }
    }

    Ok(answers)
}

fn parse_visibility(value: &str) -> Result<Visibility> {
    Visibility::parse(value).ok_or_else(|| {
        anyhow::anyhow!("Unknown visibility: {value}\n\nhint: Use 'public' or 'private'")
    })
}

/// Rejects project types and templates the configuration does not offer.
fn check_choices(config: &Config, answers: &Answers) -> Result<()> {
    if !config.project_types.contains(&answers.project_type) {
        return Err(suggestions::unknown_project_type(
            &answers.project_type,
            &config.project_types,
        ));
    }
    if let Some(template) = &answers.template {
        let names = config.template_names();
        if !names.contains(template) {
            return Err(suggestions::unknown_template(template, &names));
        }
    }
    Ok(())
}

fn ask(config: &Config, mut answers: Answers, out: &OutputConfig) -> Result<Answers> {
    let theme = ColorfulTheme::default();
    println!("{} New repository for {}", emoji(out, "🚀", "[NEW]"), config.user);

    answers.client_name = prompt_text(&theme, "Client name", &answers.client_name, false)?;
    answers.project_name = prompt_text(&theme, "Project name", &answers.project_name, false)?;
    answers.project_type = prompt_select(
        &theme,
        "Project type",
        &config.project_types,
        &answers.project_type,
    )?;
    answers.description = prompt_text(&theme, "Description", &answers.description, true)?;

    let visibilities = vec![
        Visibility::Public.to_string(),
        Visibility::Private.to_string(),
    ];
    let visibility = prompt_select(
        &theme,
        "Visibility",
        &visibilities,
        answers.visibility.as_str(),
    )?;
    answers.visibility = parse_visibility(&visibility)?;

    let templates = config.template_names();
    if !templates.is_empty() {
        let current = answers.template.clone().unwrap_or_default();
        answers.template = Some(prompt_select(&theme, "Template", &templates, &current)?);
    }

    answers.main_branch = prompt_text(&theme, "Main branch", &answers.main_branch, false)?;

    let extra = prompt_text(
        &theme,
        "Additional contributors (comma separated)",
        "",
        true,
    )?;
    for username in extra.split(',').map(str::trim).filter(|u| !u.is_empty()) {
        if !answers.contributors.iter().any(|c| c == username) {
            answers.contributors.push(username.to_string());
        }
    }

    Ok(answers)
}

fn prompt_text(theme: &ColorfulTheme, prompt: &str, default: &str, allow_empty: bool) -> Result<String> {
    let mut input = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(allow_empty);
    if !default.is_empty() {
        input = input.default(default.to_string());
    }
    Ok(input.interact_text()?.trim().to_string())
}

fn prompt_select(theme: &ColorfulTheme, prompt: &str, items: &[String], default: &str) -> Result<String> {
    let index = items.iter().position(|item| item == default).unwrap_or(0);
    let chosen = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(index)
        .interact()?;
    Ok(items[chosen].clone())
}
