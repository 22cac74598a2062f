//! # Configuration File
//!
//! This module defines the data structures that represent the
//! `repo-provision.yaml` configuration file and the logic for parsing and
//! validating it. Everything lives under a single `create_repository` root
//! key:
//!
//! ```yaml
//! create_repository:
//!   user: my-account
//!   project_types: [web, api]
//!   main_branch: main
//!   labels:
//!     - { name: bug, color: "#d73a4a" }
//! ```
//!
//! ## Parsing
//!
//! [`parse`] deserializes the YAML, normalizes a few values (label colours
//! lose their leading `#`) and runs [`Config::validate`], so a [`Config`]
//! returned by [`parse`] or [`from_file`] is always consistent. Lists may be
//! left empty or set to `~`.
//!
//! ## Token lookup
//!
//! [`Config::resolve_token`] picks the API token from, in order: the explicit
//! value (command line flag or `GITHUB_TOKEN`), the `github_token` key, and
//! the token file written by `repo-provision init`.

use crate::codeowners::OwnershipModel;
use crate::defaults::NO_TEMPLATE;
use crate::error::{Error, Result};
use crate::github::DEFAULT_API_URL;
use crate::spec::{Label, Milestone, TemplateRef, Visibility};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Key every configuration file nests its settings under.
pub const ROOT_KEY: &str = "create_repository";

/// Configuration written by `repo-provision init`.
pub const STARTER_CONFIG: &str = r##"create_repository:
  locale: en
  # Prefer the GITHUB_TOKEN environment variable or `repo-provision init --token-prompt`.
  github_token: ~
  user: my-account
  templates_dir: templates
  issues_dir: issues
  defaults:
    client_name: ~
    project_name: ~
    project_type: web
    description: ~
    visibility: private
    main_branch: main
    contributors: []
  project_types:
    - web
    - api
  main_branch: main
  develop_branch: develop
  branches: []
  labels:
    - { name: bug, color: "#d73a4a", description: "Something isn't working" }
    - { name: documentation, color: "#0075ca", description: "Improvements or additions to documentation" }
    - { name: enhancement, color: "#a2eeef", description: "New feature or request" }
  enable_no_template: true
  templates: []
  files: []
  folders: []
  milestones: []
  codeowners:
    reviewers: {}
    patterns: []
  pull_requests:
    ci_checks: []
  issues: []
"##;

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_locale() -> String {
    "en".to_string()
}

/// Answers offered when the operator does not type their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub main_branch: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub contributors: Vec<String>,
}

/// A template repository offered to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// `owner/repo`
    pub name: String,
    #[serde(default)]
    pub include_all_branches: bool,
}

/// A file to seed the repository with.
///
/// A bare string is a path below the templates directory; a mapping with a
/// `url` mirrors a file from another repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileSource {
    Local(String),
    Remote { path: String, url: String },
}

impl FileSource {
    pub fn path(&self) -> &str {
        match self {
            FileSource::Local(path) | FileSource::Remote { path, .. } => path,
        }
    }
}

/// An issue to open. Exactly one of `path` and `url` supplies the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEntry {
    pub title: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub milestone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequests {
    /// Declared for compatibility; no step uses it.
    #[serde(default, deserialize_with = "nullable")]
    pub ci_checks: Vec<String>,
}

/// Settings found under `create_repository`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
    #[serde(default)]
    pub issues_dir: Option<PathBuf>,
    #[serde(default, deserialize_with = "nullable")]
    pub defaults: Defaults,
    #[serde(default, deserialize_with = "nullable")]
    pub project_types: Vec<String>,
    #[serde(default)]
    pub main_branch: String,
    #[serde(default)]
    pub develop_branch: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub branches: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub enable_no_template: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub templates: Vec<TemplateEntry>,
    #[serde(default, deserialize_with = "nullable")]
    pub files: Vec<FileSource>,
    #[serde(default, deserialize_with = "nullable")]
    pub folders: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub milestones: Vec<Milestone>,
    #[serde(default, deserialize_with = "nullable")]
    pub codeowners: OwnershipModel,
    #[serde(default, deserialize_with = "nullable")]
    pub pull_requests: PullRequests,
    #[serde(default, deserialize_with = "nullable")]
    pub issues: Vec<IssueEntry>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Deserialize)]
struct ConfigFile {
    create_repository: Option<Config>,
}

/// Parses and validates a configuration document.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let file: ConfigFile = serde_yaml::from_str(yaml_content).map_err(|e| {
        Error::config_with_hint(
            format!("Invalid configuration: {}", e),
            format!("Settings must be nested under a '{}' key", ROOT_KEY),
        )
    })?;

    let mut config = file.create_repository.ok_or_else(|| {
        Error::config_with_hint(
            format!("The '{}' section is empty", ROOT_KEY),
            "Run 'repo-provision init' to generate a starter configuration",
        )
    })?;

    for label in &mut config.labels {
        label.color = label.color.trim().trim_start_matches('#').to_lowercase();
    }
    config.base_dir = PathBuf::from(".");
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a configuration file. Relative directories
/// in the file are resolved against the file's own directory.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::config_with_hint(
            format!("Configuration file not found: {}", path.display()),
            "Run 'repo-provision init' to generate one",
        ));
    }
    let content = std::fs::read_to_string(path)?;
    let mut config = parse(&content)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        config.base_dir = parent.to_path_buf();
    }
    Ok(config)
}

impl Config {
    /// Checks the configuration for values that would make provisioning
    /// fail half-way.
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(Error::config_with_hint(
                "The user cannot be empty",
                "Set 'user' to the account that will own the repositories",
            ));
        }
        if self.project_types.is_empty() {
            return Err(Error::config_with_hint(
                "There must be at least one project type",
                "Add entries under 'project_types', for example 'web'",
            ));
        }
        if self.main_branch.trim().is_empty() {
            return Err(Error::config_with_hint(
                "The main_branch cannot be empty",
                "Set 'main_branch', for example to 'main'",
            ));
        }

        for template in &self.templates {
            TemplateRef::parse(&template.name, template.include_all_branches)?;
        }

        for label in &self.labels {
            if label.color.len() != 6 || !label.color.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::config_with_hint(
                    format!("Label '{}' has invalid colour '{}'", label.name, label.color),
                    "Colours are six hexadecimal digits, such as d73a4a",
                ));
            }
        }

        let mut titles = HashSet::new();
        for milestone in &self.milestones {
            if !titles.insert(milestone.title.as_str()) {
                return Err(Error::config_with_hint(
                    format!("Milestone '{}' is declared more than once", milestone.title),
                    "Milestone titles identify milestones and must be unique",
                ));
            }
        }

        for issue in &self.issues {
            if issue.path.is_some() == issue.url.is_some() {
                return Err(Error::config_with_hint(
                    format!("Issue '{}' must have exactly one of 'path' or 'url'", issue.title),
                    "Use 'path' for a local body file or 'url' for a file in another repository",
                ));
            }
            if let Some(milestone) = &issue.milestone {
                if !titles.contains(milestone.as_str()) {
                    return Err(Error::MilestoneNotFound {
                        issue: issue.title.clone(),
                        milestone: milestone.clone(),
                    });
                }
            }
        }

        if let Some(visibility) = &self.defaults.visibility {
            if Visibility::parse(visibility).is_none() {
                return Err(Error::config_with_hint(
                    format!("Unknown default visibility '{}'", visibility),
                    "Use 'public' or 'private'",
                ));
            }
        }

        Ok(())
    }

    /// Template names to offer, with the "No template" choice first when it
    /// is enabled.
    pub fn template_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.templates.len() + 1);
        if self.enable_no_template {
            names.push(NO_TEMPLATE.to_string());
        }
        names.extend(self.templates.iter().map(|t| t.name.clone()));
        names
    }

    /// First template choice, if any.
    pub fn default_template(&self) -> Option<String> {
        self.template_names().into_iter().next()
    }

    /// Whether generating from `name` copies every branch. Unknown names
    /// copy only the default branch.
    pub fn include_all_branches(&self, name: &str) -> bool {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.include_all_branches)
            .unwrap_or(false)
    }

    /// Resolves a template choice. `None` and "No template" mean an empty
    /// repository.
    pub fn template_ref(&self, choice: Option<&str>) -> Result<Option<TemplateRef>> {
        match choice.map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) if name == NO_TEMPLATE => Ok(None),
            Some(name) => TemplateRef::parse(name, self.include_all_branches(name)).map(Some),
        }
    }

    pub fn default_visibility(&self) -> Visibility {
        self.defaults
            .visibility
            .as_deref()
            .and_then(Visibility::parse)
            .unwrap_or_default()
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn ci_checks(&self) -> &[String] {
        &self.pull_requests.ci_checks
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.base_dir
            .join(self.templates_dir.as_deref().unwrap_or(Path::new("templates")))
    }

    pub fn issues_dir(&self) -> PathBuf {
        self.base_dir
            .join(self.issues_dir.as_deref().unwrap_or(Path::new("issues")))
    }

    /// Picks the API token: `explicit`, then `github_token`, then the first
    /// non-empty line of `token_file`.
    pub fn resolve_token(&self, explicit: Option<&str>, token_file: &Path) -> Option<String> {
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        explicit
            .and_then(non_empty)
            .or_else(|| self.github_token.as_deref().and_then(non_empty))
            .or_else(|| {
                std::fs::read_to_string(token_file)
                    .ok()
                    .and_then(|content| content.lines().next().and_then(non_empty))
            })
    }
}
