//! # Remote Repository Capability
//!
//! This module defines [`RemoteRepository`], the set of remote operations the
//! provisioner relies on. Keeping the orchestration behind a trait separates
//! it from the HTTP client: the binary uses [`crate::github::GithubClient`],
//! while tests substitute a recording double to observe exactly which calls
//! are made and in what order.
//!
//! Every method is blocking. A call returns only once the remote side has
//! answered, which is what lets later steps depend on earlier results.

use crate::error::Result;
use crate::spec::{Label, Milestone};

/// A repository that exists on the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    /// Browser URL, when the remote side reported one.
    pub html_url: Option<String>,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            html_url: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Parameters for generating a repository from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRequest<'a> {
    pub template_owner: &'a str,
    pub template_repo: &'a str,
    pub owner: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub private: bool,
    pub include_all_branches: bool,
}

/// A file commit on a given branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile<'a> {
    pub path: &'a str,
    pub content: &'a [u8],
    pub message: &'a str,
    pub branch: &'a str,
}

/// An issue ready to be submitted, its milestone already resolved to the
/// remote number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub labels: &'a [String],
    pub milestone: Option<u64>,
}

/// Pull-request review rules applied to a protected branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchProtection {
    pub required_approving_review_count: u32,
    pub dismiss_stale_reviews: bool,
    pub require_code_owner_reviews: bool,
}

/// Remote operations needed to provision a repository.
pub trait RemoteRepository {
    /// Creates an empty repository owned by the authenticated account.
    fn create_repository(&self, name: &str, description: &str, public: bool) -> Result<RepoRef>;

    /// Generates a repository from a template repository.
    fn create_repository_from_template(&self, request: &TemplateRequest<'_>) -> Result<RepoRef>;

    fn delete_repository(&self, owner: &str, name: &str) -> Result<()>;

    /// Raw content of a file on the default branch of `owner/repo`.
    fn download_file_content(&self, owner: &str, repo: &str, path: &str) -> Result<Vec<u8>>;

    fn create_file(&self, owner: &str, repo: &str, file: &NewFile<'_>) -> Result<()>;

    /// Invites a collaborator, with the remote side's default permission.
    fn add_collaborator(&self, owner: &str, repo: &str, username: &str) -> Result<()>;

    fn create_label(&self, owner: &str, repo: &str, label: &Label) -> Result<()>;

    /// Creates a milestone and returns the number the remote side assigned.
    fn create_milestone(&self, owner: &str, repo: &str, milestone: &Milestone) -> Result<u64>;

    fn create_issue(&self, owner: &str, repo: &str, issue: &NewIssue<'_>) -> Result<()>;

    fn enable_vulnerability_alerts(&self, owner: &str, repo: &str) -> Result<()>;

    fn enable_automated_security_fixes(&self, owner: &str, repo: &str) -> Result<()>;

    fn protect_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        protection: &BranchProtection,
    ) -> Result<()>;

    /// Whether an account with this username exists.
    fn user_exists(&self, username: &str) -> Result<bool>;
}
