//! # Repository Spec
//!
//! [`RepositorySpec`] is the immutable description of the repository to
//! provision: identity, creation mode, seeded content, project management
//! items, collaborators and the reviewer model. It is assembled with
//! [`SpecBuilder`], whose methods consume the builder and return a new one, so
//! a partially built spec is never shared or mutated in place.
//!
//! ```
//! use repo_provision::spec::{RepositorySpec, Visibility};
//!
//! let spec = RepositorySpec::builder("Acme", "Site", "web")
//!     .with_visibility(Visibility::Private)
//!     .with_default_branch("main")
//!     .with_label("bug", "d73a4a", Some("Something isn't working"))
//!     .build();
//!
//! assert_eq!(spec.name(), "acme-site-web");
//! assert!(spec.is_private());
//! ```
//!
//! [`RepositorySpec::validate`] checks the cross-references that can only be
//! verified on the whole spec (milestone titles, remote file URLs). The
//! provisioner runs it before touching the remote side.

use crate::codeowners::OwnershipModel;
use crate::error::{Error, Result};
use crate::remote_file::RemoteFileReference;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Branch used when the builder is never given one.
pub const DEFAULT_BRANCH: &str = "main";

/// Placeholder written into otherwise empty folders.
pub const FOLDER_PLACEHOLDER: &str = ".gitkeep";

/// Repository visibility on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template repository the new repository is generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub owner: String,
    pub repo: String,
    /// Copy every branch of the template, not only its default branch.
    pub include_all_branches: bool,
}

impl TemplateRef {
    /// Parses an `owner/repo` template name.
    pub fn parse(name: &str, include_all_branches: bool) -> Result<Self> {
        match name.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    include_all_branches,
                })
            }
            _ => Err(Error::config_with_hint(
                format!("Invalid template name '{}'", name),
                "Templates are written as <owner>/<repository>",
            )),
        }
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A declared branch. Only the default branch is materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub is_default: bool,
}

/// A file to commit into the new repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEntry {
    /// Content known up front, usually read from the local templates folder.
    Local { path: String, content: Vec<u8> },
    /// Content mirrored from another repository, downloaded at creation time.
    Remote { path: String, source_url: String },
}

impl FileEntry {
    pub fn path(&self) -> &str {
        match self {
            FileEntry::Local { path, .. } | FileEntry::Remote { path, .. } => path,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, FileEntry::Remote { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO 8601 timestamp, passed through to the remote API untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
}

/// Where an issue body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueBody {
    Text(String),
    /// Blob URL of a file in another repository.
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub title: String,
    pub body: IssueBody,
    pub labels: Vec<String>,
    /// Title of a milestone declared in the same spec.
    pub milestone: Option<String>,
}

/// Client, project and type of the repository. The repository name is derived
/// from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub client_name: String,
    pub project_name: String,
    pub project_type: String,
}

impl Identity {
    /// Slugified `<client>-<project>-<type>`.
    pub fn name(&self) -> String {
        slugify(&format!(
            "{}-{}-{}",
            self.client_name, self.project_name, self.project_type
        ))
    }
}

/// Lower-cases the input and collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, trimming dashes at both ends.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for ch in input.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// The desired end state of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    identity: Identity,
    name: String,
    description: String,
    visibility: Visibility,
    template: Option<TemplateRef>,
    default_branch: String,
    branches: Vec<Branch>,
    files: Vec<FileEntry>,
    folders: Vec<String>,
    labels: Vec<Label>,
    milestones: Vec<Milestone>,
    issues: Vec<Issue>,
    contributors: Vec<String>,
    codeowners: OwnershipModel,
}

impl RepositorySpec {
    /// Starts a spec for the given identity.
    pub fn builder(
        client_name: impl Into<String>,
        project_name: impl Into<String>,
        project_type: impl Into<String>,
    ) -> SpecBuilder {
        SpecBuilder::new(Identity {
            client_name: client_name.into(),
            project_name: project_name.into(),
            project_type: project_type.into(),
        })
    }

    /// Derived repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// `None` means an empty repository is created.
    pub fn template(&self) -> Option<&TemplateRef> {
        self.template.as_ref()
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn contributors(&self) -> &[String] {
        &self.contributors
    }

    pub fn codeowners(&self) -> &OwnershipModel {
        &self.codeowners
    }

    /// Code-owner review is required on public repositories and whenever an
    /// ownership model was supplied.
    pub fn requires_code_owner_reviews(&self) -> bool {
        self.is_public() || !self.codeowners.is_empty()
    }

    /// Checks the cross-references of the spec.
    ///
    /// Fails on the first issue whose milestone is not declared, on a
    /// milestone title declared twice, and on a remote file or issue body URL
    /// that cannot be parsed.
    pub fn validate(&self) -> Result<()> {
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
            if let Some(milestone) = &issue.milestone {
                if !titles.contains(milestone.as_str()) {
                    return Err(Error::MilestoneNotFound {
                        issue: issue.title.clone(),
                        milestone: milestone.clone(),
                    });
                }
            }
            if let IssueBody::Remote(url) = &issue.body {
                RemoteFileReference::parse(url)?;
            }
        }

        for file in &self.files {
            if let FileEntry::Remote { source_url, .. } = file {
                RemoteFileReference::parse(source_url)?;
            }
        }

        Ok(())
    }
}

/// Consuming builder for [`RepositorySpec`].
#[derive(Debug, Clone)]
pub struct SpecBuilder {
    spec: RepositorySpec,
}

impl SpecBuilder {
    fn new(identity: Identity) -> Self {
        let name = identity.name();
        Self {
            spec: RepositorySpec {
                identity,
                name,
                description: String::new(),
                visibility: Visibility::default(),
                template: None,
                default_branch: DEFAULT_BRANCH.to_string(),
                branches: vec![Branch {
                    name: DEFAULT_BRANCH.to_string(),
                    is_default: true,
                }],
                files: Vec::new(),
                folders: Vec::new(),
                labels: Vec::new(),
                milestones: Vec::new(),
                issues: Vec::new(),
                contributors: Vec::new(),
                codeowners: OwnershipModel::default(),
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = description.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.spec.visibility = visibility;
        self
    }

    pub fn with_template(mut self, template: Option<TemplateRef>) -> Self {
        self.spec.template = template;
        self
    }

    /// Sets the default branch. The previous default stays declared as a
    /// regular branch.
    pub fn with_default_branch(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        for branch in &mut self.spec.branches {
            branch.is_default = branch.name == name;
        }
        if !self.spec.branches.iter().any(|b| b.name == name) {
            self.spec.branches.push(Branch {
                name: name.clone(),
                is_default: true,
            });
        }
        self.spec.default_branch = name;
        self
    }

    /// Declares an additional branch. Declaring a name twice is a no-op.
    pub fn with_branch(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() && !self.spec.branches.iter().any(|b| b.name == name) {
            self.spec.branches.push(Branch {
                name,
                is_default: false,
            });
        }
        self
    }

    /// Adds a file. A later entry for the same path replaces the earlier one
    /// in place.
    pub fn with_file(mut self, file: FileEntry) -> Self {
        match self
            .spec
            .files
            .iter_mut()
            .find(|existing| existing.path() == file.path())
        {
            Some(existing) => *existing = file,
            None => self.spec.files.push(file),
        }
        self
    }

    pub fn with_local_file(self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.with_file(FileEntry::Local {
            path: path.into(),
            content: content.into(),
        })
    }

    pub fn with_remote_file(self, path: impl Into<String>, source_url: impl Into<String>) -> Self {
        self.with_file(FileEntry::Remote {
            path: path.into(),
            source_url: source_url.into(),
        })
    }

    pub fn with_folder(mut self, path: impl Into<String>) -> Self {
        let path = path.into().trim_matches('/').to_string();
        if !path.is_empty() && !self.spec.folders.contains(&path) {
            self.spec.folders.push(path);
        }
        self
    }

    pub fn with_label(
        mut self,
        name: impl Into<String>,
        color: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        self.spec.labels.push(Label {
            name: name.into(),
            color: color.into(),
            description: description.map(str::to_string),
        });
        self
    }

    pub fn with_labels(self, labels: impl IntoIterator<Item = Label>) -> Self {
        labels.into_iter().fold(self, |builder, label| {
            builder.with_label(label.name, label.color, label.description.as_deref())
        })
    }

    pub fn with_milestone(mut self, milestone: Milestone) -> Self {
        self.spec.milestones.push(milestone);
        self
    }

    pub fn with_milestones(self, milestones: impl IntoIterator<Item = Milestone>) -> Self {
        milestones
            .into_iter()
            .fold(self, |builder, milestone| builder.with_milestone(milestone))
    }

    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.spec.issues.push(issue);
        self
    }

    /// Adds a collaborator. Names are kept in declaration order, once each.
    pub fn with_contributor(mut self, username: impl Into<String>) -> Self {
        let username = username.into().trim().to_string();
        if !username.is_empty() && !self.spec.contributors.contains(&username) {
            self.spec.contributors.push(username);
        }
        self
    }

    pub fn with_contributors<S: Into<String>>(self, usernames: impl IntoIterator<Item = S>) -> Self {
        usernames
            .into_iter()
            .fold(self, |builder, username| builder.with_contributor(username))
    }

    pub fn with_codeowners(mut self, model: OwnershipModel) -> Self {
        self.spec.codeowners = model;
        self
    }

    pub fn build(self) -> RepositorySpec {
        self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeowners::{OwnershipPattern, ReviewerGroup};

    fn base() -> SpecBuilder {
        RepositorySpec::builder("acme", "site", "web")
    }

    #[test]
    fn test_name_is_derived_from_identity() {
        assert_eq!(base().build().name(), "acme-site-web");
    }

    #[test]
    fn test_name_is_slugified() {
        let spec = RepositorySpec::builder("ACME Corp", "Site  v2!", "Web/API").build();
        assert_eq!(spec.name(), "acme-corp-site-v2-web-api");
    }

    #[test]
    fn test_slugify_trims_separators() {
        assert_eq!(slugify("--Hello, World--"), "hello-world");
        assert_eq!(slugify("a__b"), "a-b");
    }

    #[test]
    fn test_default_branch_is_member_of_branches() {
        let spec = base()
            .with_branch("develop")
            .with_default_branch("trunk")
            .build();
        assert_eq!(spec.default_branch(), "trunk");
        let defaults: Vec<&str> = spec
            .branches()
            .iter()
            .filter(|b| b.is_default)
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(defaults, vec!["trunk"]);
        assert!(spec.branches().iter().any(|b| b.name == "develop"));
    }

    #[test]
    fn test_switching_default_to_declared_branch() {
        let spec = base()
            .with_branch("develop")
            .with_default_branch("develop")
            .build();
        assert_eq!(spec.branches().len(), 2);
        assert!(spec
            .branches()
            .iter()
            .any(|b| b.name == "develop" && b.is_default));
    }

    #[test]
    fn test_builder_does_not_alias() {
        let first = base().with_label("bug", "d73a4a", None);
        let second = first.clone().with_label("docs", "0075ca", None);
        assert_eq!(first.build().labels().len(), 1);
        assert_eq!(second.build().labels().len(), 2);
    }

    #[test]
    fn test_duplicate_file_path_later_wins_in_place() {
        let spec = base()
            .with_local_file("README.md", "local")
            .with_local_file("LICENSE", "mit")
            .with_remote_file("README.md", "https://github.com/acme/files/blob/main/README.md")
            .build();
        assert_eq!(spec.files().len(), 2);
        assert_eq!(spec.files()[0].path(), "README.md");
        assert!(spec.files()[0].is_remote());
    }

    #[test]
    fn test_contributors_are_an_ordered_set() {
        let spec = base()
            .with_contributors(["bob", "alice", "bob", " "])
            .build();
        assert_eq!(spec.contributors(), &["bob".to_string(), "alice".to_string()]);
    }

    #[test]
    fn test_folders_are_normalized() {
        let spec = base().with_folder("/docs/").with_folder("docs").build();
        assert_eq!(spec.folders(), &["docs".to_string()]);
    }

    #[test]
    fn test_code_owner_reviews_forced_for_public() {
        let spec = base().with_visibility(Visibility::Public).build();
        assert!(spec.requires_code_owner_reviews());
    }

    #[test]
    fn test_code_owner_reviews_for_private_with_model() {
        let private = base().with_visibility(Visibility::Private);
        assert!(!private.clone().build().requires_code_owner_reviews());

        let mut model = OwnershipModel::default();
        model.reviewers.insert(
            "defaults".to_string(),
            ReviewerGroup::Single("alice".to_string()),
        );
        model.patterns.push(OwnershipPattern {
            pattern: "*".to_string(),
            owners: vec!["defaults".to_string()],
        });
        assert!(private.with_codeowners(model).build().requires_code_owner_reviews());
    }

    #[test]
    fn test_validate_missing_milestone() {
        let spec = base()
            .with_issue(Issue {
                title: "Kick-off".to_string(),
                body: IssueBody::Text(String::new()),
                labels: vec![],
                milestone: Some("v1".to_string()),
            })
            .build();
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, Error::MilestoneNotFound { ref milestone, .. } if milestone == "v1"));
    }

    #[test]
    fn test_validate_duplicate_milestone() {
        let milestone = Milestone {
            title: "v1".to_string(),
            description: None,
            due_on: None,
        };
        let spec = base()
            .with_milestones([milestone.clone(), milestone])
            .build();
        assert!(spec.validate().unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn test_validate_bad_remote_file_url() {
        let spec = base().with_remote_file("README.md", "not a url").build();
        assert!(matches!(
            spec.validate().unwrap_err(),
            Error::InvalidRemoteFileUrl { .. }
        ));
    }

    #[test]
    fn test_validate_ok() {
        let spec = base()
            .with_milestone(Milestone {
                title: "v1".to_string(),
                description: None,
                due_on: Some("2030-01-01T00:00:00Z".to_string()),
            })
            .with_issue(Issue {
                title: "Kick-off".to_string(),
                body: IssueBody::Remote(
                    "https://github.com/acme/issues/blob/main/kickoff.md".to_string(),
                ),
                labels: vec!["documentation".to_string()],
                milestone: Some("v1".to_string()),
            })
            .build();
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_template_parse() {
        let template = TemplateRef::parse("acme/template-web", true).unwrap();
        assert_eq!(template.owner, "acme");
        assert_eq!(template.repo, "template-web");
        assert!(template.include_all_branches);
        assert!(TemplateRef::parse("acme", false).is_err());
        assert!(TemplateRef::parse("a/b/c", false).is_err());
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!(Visibility::parse("Private"), Some(Visibility::Private));
        assert_eq!(Visibility::parse("public"), Some(Visibility::Public));
        assert_eq!(Visibility::parse("internal"), None);
    }
}
