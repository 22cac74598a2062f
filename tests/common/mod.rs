//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and a recording
//! [`RemoteRepository`] to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::MINIMAL);
//!     fixture.command().arg("validate").assert().success();
//! }
//! ```

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use repo_provision::error::{Error, Result};
use repo_provision::remote::{
    BranchProtection, NewFile, NewIssue, RemoteRepository, RepoRef, TemplateRequest,
};
use repo_provision::spec::{Label, Milestone};

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::configs;
    pub use super::{Call, Failure, RecordingRemote};
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
pub mod configs {
    /// Smallest valid configuration.
    pub const MINIMAL: &str = r#"
create_repository:
  user: me
  project_types: [web]
  main_branch: main
"#;

    /// Configuration exercising every section.
    pub const FULL: &str = r##"
create_repository:
  locale: en
  user: me
  defaults:
    client_name: acme
    project_name: site
    project_type: web
    visibility: public
    contributors: [carol]
  project_types: [web, api]
  main_branch: main
  develop_branch: develop
  labels:
    - { name: bug, color: "#d73a4a", description: "Something isn't working" }
  enable_no_template: true
  templates:
    - { name: acme/template-web, include_all_branches: true }
  files:
    - README.md
    - { path: LICENSE, url: "https://github.com/acme/files/blob/main/LICENSE" }
  folders: [docs]
  milestones:
    - { title: v1, due_on: "2030-01-01T00:00:00Z" }
  codeowners:
    reviewers:
      defaults: alice
      web: [bob, alice]
    patterns:
      - { pattern: "*", owners: [defaults] }
      - { pattern: "*.css", owners: [web] }
  pull_requests:
    ci_checks: [build]
  issues:
    - { title: Kick-off, path: kickoff.md, labels: [bug], milestone: v1 }
"##;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "create_repository: [unclosed";
}

/// A test fixture that provides a temporary directory with optional config.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `repo-provision.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("repo-provision.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// The full configuration together with the local files it reads.
    pub fn with_full_config(self) -> Self {
        self.with_config(configs::FULL)
            .with_file("templates/README.md", "# Site")
            .with_file("issues/kickoff.md", "Let's go")
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("repo-provision.yaml")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory, with
    /// no token in the environment and the user config directory redirected
    /// into the fixture.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-provision");
        cmd.current_dir(self.path())
            .env_remove("GITHUB_TOKEN")
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A remote call observed by [`RecordingRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateRepository { name: String, public: bool },
    CreateFromTemplate { template: String, name: String, private: bool, include_all_branches: bool },
    DeleteRepository { owner: String, name: String },
    Download { owner: String, repo: String, path: String },
    CreateFile { path: String, content: String, message: String, branch: String },
    AddCollaborator { username: String },
    CreateLabel { name: String, color: String },
    CreateMilestone { title: String },
    CreateIssue { title: String, body: String, labels: Vec<String>, milestone: Option<u64> },
    EnableVulnerabilityAlerts,
    EnableAutomatedSecurityFixes,
    ProtectBranch { branch: String, protection: BranchProtection },
    UserExists { username: String },
}

impl Call {
    /// Short name used to select a call to fail.
    pub fn kind(&self) -> &'static str {
        match self {
            Call::CreateRepository { .. } => "create_repository",
            Call::CreateFromTemplate { .. } => "create_from_template",
            Call::DeleteRepository { .. } => "delete_repository",
            Call::Download { .. } => "download",
            Call::CreateFile { .. } => "create_file",
            Call::AddCollaborator { .. } => "add_collaborator",
            Call::CreateLabel { .. } => "create_label",
            Call::CreateMilestone { .. } => "create_milestone",
            Call::CreateIssue { .. } => "create_issue",
            Call::EnableVulnerabilityAlerts => "enable_vulnerability_alerts",
            Call::EnableAutomatedSecurityFixes => "enable_automated_security_fixes",
            Call::ProtectBranch { .. } => "protect_branch",
            Call::UserExists { .. } => "user_exists",
        }
    }
}

/// How an injected failure presents itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    RateLimited,
    Remote,
}

/// In-memory [`RemoteRepository`] that records every call. Clones share the
/// same log, so a test keeps one handle while the provisioner owns another.
#[derive(Clone, Default)]
pub struct RecordingRemote {
    calls: Arc<Mutex<Vec<Call>>>,
    fail: Option<(&'static str, Failure)>,
    missing_users: Vec<String>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the first call of the given kind.
    pub fn failing_on(mut self, kind: &'static str, failure: Failure) -> Self {
        self.fail = Some((kind, failure));
        self
    }

    /// Reports `username` as unknown to `user_exists`.
    pub fn without_user(mut self, username: &str) -> Self {
        self.missing_users.push(username.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|c| c.kind() == kind).count()
    }

    fn record(&self, call: Call) -> Result<()> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);
        match self.fail {
            Some((failing, Failure::RateLimited)) if failing == kind => Err(Error::RateLimited {
                operation: kind.to_string(),
                reset_at: Some(1_700_000_000),
            }),
            Some((failing, Failure::Remote)) if failing == kind => Err(Error::RemoteApi {
                operation: kind.to_string(),
                status: 422,
                message: "Validation Failed".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl RemoteRepository for RecordingRemote {
    fn create_repository(&self, name: &str, _description: &str, public: bool) -> Result<RepoRef> {
        self.record(Call::CreateRepository {
            name: name.to_string(),
            public,
        })?;
        Ok(RepoRef::new("me", name))
    }

    fn create_repository_from_template(&self, request: &TemplateRequest<'_>) -> Result<RepoRef> {
        self.record(Call::CreateFromTemplate {
            template: format!("{}/{}", request.template_owner, request.template_repo),
            name: request.name.to_string(),
            private: request.private,
            include_all_branches: request.include_all_branches,
        })?;
        Ok(RepoRef::new(request.owner, request.name))
    }

    fn delete_repository(&self, owner: &str, name: &str) -> Result<()> {
        self.record(Call::DeleteRepository {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    fn download_file_content(&self, owner: &str, repo: &str, path: &str) -> Result<Vec<u8>> {
        self.record(Call::Download {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.to_string(),
        })?;
        Ok(format!("{}/{}:{}", owner, repo, path).into_bytes())
    }

    fn create_file(&self, _owner: &str, _repo: &str, file: &NewFile<'_>) -> Result<()> {
        self.record(Call::CreateFile {
            path: file.path.to_string(),
            content: String::from_utf8_lossy(file.content).into_owned(),
            message: file.message.to_string(),
            branch: file.branch.to_string(),
        })
    }

    fn add_collaborator(&self, _owner: &str, _repo: &str, username: &str) -> Result<()> {
        self.record(Call::AddCollaborator {
            username: username.to_string(),
        })
    }

    fn create_label(&self, _owner: &str, _repo: &str, label: &Label) -> Result<()> {
        self.record(Call::CreateLabel {
            name: label.name.clone(),
            color: label.color.clone(),
        })
    }

    fn create_milestone(&self, _owner: &str, _repo: &str, milestone: &Milestone) -> Result<u64> {
        self.record(Call::CreateMilestone {
            title: milestone.title.clone(),
        })?;
        Ok(self.count("create_milestone") as u64)
    }

    fn create_issue(&self, _owner: &str, _repo: &str, issue: &NewIssue<'_>) -> Result<()> {
        self.record(Call::CreateIssue {
            title: issue.title.to_string(),
            body: issue.body.to_string(),
            labels: issue.labels.to_vec(),
            milestone: issue.milestone,
        })
    }

    fn enable_vulnerability_alerts(&self, _owner: &str, _repo: &str) -> Result<()> {
        self.record(Call::EnableVulnerabilityAlerts)
    }

    fn enable_automated_security_fixes(&self, _owner: &str, _repo: &str) -> Result<()> {
        self.record(Call::EnableAutomatedSecurityFixes)
    }

    fn protect_branch(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        protection: &BranchProtection,
    ) -> Result<()> {
        self.record(Call::ProtectBranch {
            branch: branch.to_string(),
            protection: *protection,
        })
    }

    fn user_exists(&self, username: &str) -> Result<bool> {
        self.record(Call::UserExists {
            username: username.to_string(),
        })?;
        Ok(!self.missing_users.iter().any(|u| u == username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_provision::config;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(configs::MINIMAL);
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_configs_are_valid() {
        for content in [configs::MINIMAL, configs::FULL] {
            config::parse(content).expect("Config should be valid");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(configs::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }

    #[test]
    fn test_recording_remote_shares_log_between_clones() {
        let remote = RecordingRemote::new();
        let handle = remote.clone();
        remote.add_collaborator("me", "site", "bob").unwrap();
        assert_eq!(handle.count("add_collaborator"), 1);
    }
}
