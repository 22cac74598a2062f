//! Building a [`RepositorySpec`] from configuration and operator answers.
//!
//! Local files are looked up under the templates directory, first in the
//! locale subdirectory and then at the top level, so a localized `README.md`
//! can shadow a generic one. Issue bodies given as `path` follow the same
//! rule below the issues directory.

use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{Config, FileSource};
use crate::error::{Error, Result};
use crate::spec::{FileEntry, Issue, IssueBody, RepositorySpec, Visibility};

/// What the operator chose for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub client_name: String,
    pub project_name: String,
    pub project_type: String,
    pub description: String,
    pub visibility: Visibility,
    /// Template name, or `None`/"No template" for an empty repository.
    pub template: Option<String>,
    pub main_branch: String,
    pub contributors: Vec<String>,
}

impl Answers {
    /// Answers made of the configuration defaults alone.
    pub fn from_defaults(config: &Config) -> Self {
        let defaults = &config.defaults;
        Self {
            client_name: defaults.client_name.clone().unwrap_or_default(),
            project_name: defaults.project_name.clone().unwrap_or_default(),
            project_type: defaults
                .project_type
                .clone()
                .or_else(|| config.project_types.first().cloned())
                .unwrap_or_default(),
            description: defaults.description.clone().unwrap_or_default(),
            visibility: config.default_visibility(),
            template: config.default_template(),
            main_branch: defaults
                .main_branch
                .clone()
                .unwrap_or_else(|| config.main_branch.clone()),
            contributors: defaults.contributors.clone(),
        }
    }
}

/// Turns [`Answers`] into a [`RepositorySpec`] using a [`Config`].
pub struct SpecLoader<'a> {
    config: &'a Config,
}

impl<'a> SpecLoader<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn load(&self, answers: &Answers) -> Result<RepositorySpec> {
        for (field, value) in [
            ("client name", &answers.client_name),
            ("project name", &answers.project_name),
            ("project type", &answers.project_type),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config_with_hint(
                    format!("The {} cannot be empty", field),
                    "Answer the prompt or set it under 'defaults'",
                ));
            }
        }
        if answers.main_branch.trim().is_empty() {
            return Err(Error::config("The main branch cannot be empty"));
        }

        let config = self.config;
        let mut builder = RepositorySpec::builder(
            answers.client_name.trim(),
            answers.project_name.trim(),
            answers.project_type.trim(),
        )
        .with_description(answers.description.trim())
        .with_visibility(answers.visibility)
        .with_template(config.template_ref(answers.template.as_deref())?)
        .with_default_branch(answers.main_branch.trim());

        if let Some(develop) = &config.develop_branch {
            builder = builder.with_branch(develop.as_str());
        }
        for branch in &config.branches {
            builder = builder.with_branch(branch.as_str());
        }

        let templates_dir = config.templates_dir();
        for file in &config.files {
            let entry = match file {
                FileSource::Local(path) => FileEntry::Local {
                    path: path.clone(),
                    content: self.read_local(&templates_dir, path)?,
                },
                FileSource::Remote { path, url } => FileEntry::Remote {
                    path: path.clone(),
                    source_url: url.clone(),
                },
            };
            builder = builder.with_file(entry);
        }

        for folder in &config.folders {
            builder = builder.with_folder(folder.as_str());
        }

        let issues_dir = config.issues_dir();
        for entry in &config.issues {
            let body = match (&entry.path, &entry.url) {
                (_, Some(url)) => IssueBody::Remote(url.clone()),
                (Some(path), None) => IssueBody::Text(
                    String::from_utf8_lossy(&self.read_local(&issues_dir, path)?).into_owned(),
                ),
                (None, None) => IssueBody::Text(String::new()),
            };
            builder = builder.with_issue(Issue {
                title: entry.title.clone(),
                body,
                labels: entry.labels.clone(),
                milestone: entry.milestone.clone(),
            });
        }

        Ok(builder
            .with_labels(config.labels.iter().cloned())
            .with_milestones(config.milestones.iter().cloned())
            .with_contributors(answers.contributors.iter().cloned())
            .with_codeowners(config.codeowners.clone())
            .build())
    }

    /// Candidate locations of `path` below `base`, in lookup order.
    pub fn candidates(&self, base: &Path, path: &str) -> Vec<PathBuf> {
        let relative = path.trim_start_matches('/');
        vec![
            base.join(&self.config.locale).join(relative),
            base.join(relative),
        ]
    }

    fn read_local(&self, base: &Path, path: &str) -> Result<Vec<u8>> {
        let candidates = self.candidates(base, path);
        for candidate in &candidates {
            if candidate.is_file() {
                debug!("Reading {}", candidate.display());
                return Ok(std::fs::read(candidate)?);
            }
        }
        Err(Error::config_with_hint(
            format!("Local file '{}' not found", path),
            format!(
                "Looked in {}",
                candidates
                    .iter()
                    .map(|c| c.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" and ")
            ),
        ))
    }
}
