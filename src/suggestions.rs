//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell the operator what
//! went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repo_provision::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

use crate::defaults::TOKEN_ENV;

/// Generate an error for when the configuration file is not found.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Run 'repo-provision init {path}' to create a starter configuration\n\
         hint: Pass the configuration path as the first argument",
        path = path.display()
    )
}

/// Generate an error for when no API token could be found.
pub fn token_missing(token_file: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "No GitHub token available\n\n\
         hint: Pass --token or set the {TOKEN_ENV} environment variable\n\
         hint: Set 'github_token' in the configuration file\n\
         hint: Run 'repo-provision init --token-prompt' to store one in {file}",
        file = token_file.display()
    )
}

/// Generate an error for a repository left behind by a failed run.
pub fn repository_left_behind(name: &str, cause: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "{cause}\n\n\
         hint: The partially provisioned repository '{name}' still exists\n\
         hint: Run 'repo-provision delete {name}' before retrying"
    )
}

/// Generate an error for an exhausted API quota.
pub fn rate_limited(name: &str, cause: &str, reset_at: Option<u64>) -> anyhow::Error {
    let wait = reset_at
        .map(|reset| format!("\nhint: The quota resets at unix time {reset}"))
        .unwrap_or_default();
    anyhow::anyhow!(
        "{cause}\n\n\
         hint: The repository '{name}' was kept; delete it with 'repo-provision delete {name}'{wait}"
    )
}

/// Generate an error for a project type that is not configured.
pub fn unknown_project_type(project_type: &str, valid: &[String]) -> anyhow::Error {
    unknown_choice("project type", project_type, valid, "project_types")
}

/// Generate an error for a template that is not configured.
pub fn unknown_template(template: &str, valid: &[String]) -> anyhow::Error {
    unknown_choice("template", template, valid, "templates")
}

fn unknown_choice(kind: &str, input: &str, valid: &[String], key: &str) -> anyhow::Error {
    let candidates: Vec<&str> = valid.iter().map(String::as_str).collect();
    let did_you_mean = find_similar(input, &candidates)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown {kind}: {input}{did_you_mean}\n\n\
         Valid choices are: {choices}\n\
         hint: Add it under '{key}' in the configuration file",
        choices = candidates.join(", ")
    )
}

/// Generate an error for when `init` would overwrite a file.
pub fn init_target_exists(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file already exists: {path}\n\n\
         hint: Use --force to overwrite it",
        path = path.display()
    )
}

/// Generate an error for a configuration path without a YAML extension.
pub fn init_not_yaml(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "The configuration file must be a YAML file: {path}\n\n\
         hint: Use a path ending in .yaml or .yml",
        path = path.display()
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }
    previous[b.len()]
}
