//! The steps that follow repository creation.
//!
//! A [`Run`] lives for exactly one provisioning call and owns the milestone
//! numbers collected along the way.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info, warn};

use super::{ProvisionedRepository, Step};
use crate::codeowners::CODEOWNERS_PATH;
use crate::error::{Error, Result};
use crate::remote::{BranchProtection, NewFile, NewIssue, RemoteRepository, RepoRef};
use crate::remote_file::RemoteFileReference;
use crate::spec::{FileEntry, Issue, IssueBody, RepositorySpec, FOLDER_PLACEHOLDER};

type StepResult = std::result::Result<(), (Step, Error)>;

pub(super) struct Run<'a> {
    remote: &'a dyn RemoteRepository,
    owner: &'a str,
    spec: &'a RepositorySpec,
    milestones: HashMap<String, u64>,
    codeowners_committed: bool,
}

impl<'a> Run<'a> {
    pub(super) fn new(
        remote: &'a dyn RemoteRepository,
        owner: &'a str,
        spec: &'a RepositorySpec,
    ) -> Self {
        Self {
            remote,
            owner,
            spec,
            milestones: HashMap::new(),
            codeowners_committed: false,
        }
    }

    /// Runs every step after repository creation, stopping at the first
    /// failure.
    pub(super) fn execute(&mut self) -> StepResult {
        self.step(Step::CreateFiles, Self::create_files)?;
        self.step(Step::ProtectDefaultBranch, Self::protect_default_branch)?;
        self.step(Step::CreateLabels, Self::create_labels)?;
        self.step(Step::AddCollaborators, Self::add_collaborators)?;
        self.step(Step::CreateMilestones, Self::create_milestones)?;
        self.step(Step::EnableSecurityFeatures, Self::enable_security_features)?;
        self.step(Step::CommitCodeowners, Self::commit_codeowners)?;
        self.step(Step::CreateIssues, Self::create_issues)
    }

    pub(super) fn finish(self, repository: RepoRef) -> ProvisionedRepository {
        ProvisionedRepository {
            repository,
            milestones: self.milestones.into_iter().collect::<BTreeMap<_, _>>(),
            codeowners_committed: self.codeowners_committed,
        }
    }

    fn step(&mut self, step: Step, action: fn(&mut Self) -> Result<()>) -> StepResult {
        info!("{}/{}: {}", self.owner, self.repo(), step);
        action(self).map_err(|err| (step, err))
    }

    fn repo(&self) -> &'a str {
        self.spec.name()
    }

    fn commit(&self, path: &str, content: &[u8], message: &str) -> Result<()> {
        debug!("Committing {} ({} bytes)", path, content.len());
        self.remote.create_file(
            self.owner,
            self.repo(),
            &NewFile {
                path,
                content,
                message,
                branch: self.spec.default_branch(),
            },
        )
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let source = RemoteFileReference::parse(url)?;
        debug!("Downloading {}", source);
        self.remote
            .download_file_content(&source.owner, &source.repo, &source.path)
    }

    fn create_files(&mut self) -> Result<()> {
        let (remote, local): (Vec<&FileEntry>, Vec<&FileEntry>) =
            self.spec.files().iter().partition(|file| file.is_remote());

        for file in local.into_iter().chain(remote) {
            let path = file.path();
            let content = match file {
                FileEntry::Remote { source_url, .. } => self.download(source_url)?,
                FileEntry::Local { content, .. } => content.clone(),
            };
            self.commit(path, &content, &format!("Add {} file", path))?;
        }

        for folder in self.spec.folders() {
            let path = format!("{}/{}", folder, FOLDER_PLACEHOLDER);
            self.commit(&path, &[], &format!("Add {} file", path))?;
        }

        Ok(())
    }

    fn protect_default_branch(&mut self) -> Result<()> {
        if self.spec.is_private() {
            info!("Private repository, branch protection skipped");
            return Ok(());
        }

        let protection = BranchProtection {
            required_approving_review_count: 1,
            dismiss_stale_reviews: true,
            require_code_owner_reviews: self.spec.requires_code_owner_reviews(),
        };
        self.remote.protect_branch(
            self.owner,
            self.repo(),
            self.spec.default_branch(),
            &protection,
        )
    }

    fn create_labels(&mut self) -> Result<()> {
        for label in self.spec.labels() {
            debug!("Creating label {}", label.name);
            self.remote.create_label(self.owner, self.repo(), label)?;
        }
        Ok(())
    }

    fn add_collaborators(&mut self) -> Result<()> {
        for username in self.spec.contributors() {
            debug!("Adding collaborator {}", username);
            self.remote
                .add_collaborator(self.owner, self.repo(), username)?;
        }
        Ok(())
    }

    fn create_milestones(&mut self) -> Result<()> {
        for milestone in self.spec.milestones() {
            let number = self
                .remote
                .create_milestone(self.owner, self.repo(), milestone)?;
            debug!("Milestone {} is #{}", milestone.title, number);
            self.milestones.insert(milestone.title.clone(), number);
        }
        Ok(())
    }

    fn enable_security_features(&mut self) -> Result<()> {
        self.remote
            .enable_vulnerability_alerts(self.owner, self.repo())?;
        self.remote
            .enable_automated_security_fixes(self.owner, self.repo())
    }

    fn commit_codeowners(&mut self) -> Result<()> {
        let model = self.spec.codeowners();
        if model.is_empty() {
            debug!("No ownership model, {} not generated", CODEOWNERS_PATH);
            return Ok(());
        }

        for username in model.list_reviewers() {
            if !self.remote.user_exists(&username)? {
                return Err(Error::ReviewerNotFound { username });
            }
        }

        let compiled = model.compile();
        if !compiled.has_owners() {
            warn!("Ownership model resolves to no owners, {} not generated", CODEOWNERS_PATH);
            return Ok(());
        }

        self.commit(
            CODEOWNERS_PATH,
            compiled.render().as_bytes(),
            "Add CODEOWNERS file",
        )?;
        self.codeowners_committed = true;
        Ok(())
    }

    fn create_issues(&mut self) -> Result<()> {
        for issue in self.spec.issues() {
            let milestone = self.milestone_number(issue)?;
            let body = match &issue.body {
                IssueBody::Text(text) => text.clone(),
                IssueBody::Remote(url) => String::from_utf8_lossy(&self.download(url)?).into_owned(),
            };
            debug!("Creating issue {}", issue.title);
            self.remote.create_issue(
                self.owner,
                self.repo(),
                &NewIssue {
                    title: &issue.title,
                    body: &body,
                    labels: &issue.labels,
                    milestone,
                },
            )?;
        }
        Ok(())
    }

    fn milestone_number(&self, issue: &Issue) -> Result<Option<u64>> {
        match &issue.milestone {
            None => Ok(None),
            Some(title) => match self.milestones.get(title) {
                Some(number) => Ok(Some(*number)),
                None => Err(Error::MilestoneNotFound {
                    issue: issue.title.clone(),
                    milestone: title.clone(),
                }),
            },
        }
    }
}
