//! Provisioning orchestration.
//!
//! ## Overview
//!
//! [`Provisioner::provision`] turns a [`RepositorySpec`] into a live repository
//! by running the following steps strictly in order, each remote call
//! completing before the next one starts:
//!
//! 1. Create the repository, empty or from a template
//! 2. Commit files: local files, then remote mirrors, then folder placeholders
//! 3. Protect the default branch (public repositories only)
//! 4. Create labels
//! 5. Add collaborators
//! 6. Create milestones, remembering the number assigned to each title
//! 7. Enable vulnerability alerts and automated security fixes
//! 8. Commit the ownership file once every reviewer is known to exist
//! 9. Create issues, attaching the milestone numbers from step 6
//!
//! The spec is validated first, so an issue pointing at an undeclared
//! milestone fails before anything is created.
//!
//! ## Failure handling
//!
//! No step is retried. When a step after repository creation fails, the run
//! stops and the outcome is recorded as a [`Rollback`]:
//!
//! - a rate-limit failure keeps the repository
//! - `keep_on_failure` keeps the repository
//! - anything else deletes the repository once, best effort; a failed
//!   deletion is reported next to the original error

mod steps;

use std::collections::BTreeMap;
use std::fmt;

use log::{error, info, warn};

use crate::error::Error;
use crate::remote::{RemoteRepository, RepoRef, TemplateRequest};
use crate::spec::RepositorySpec;

use steps::Run;

/// One stage of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Preflight,
    CreateRepository,
    CreateFiles,
    ProtectDefaultBranch,
    CreateLabels,
    AddCollaborators,
    CreateMilestones,
    EnableSecurityFeatures,
    CommitCodeowners,
    CreateIssues,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Preflight => "pre-flight validation",
            Step::CreateRepository => "create repository",
            Step::CreateFiles => "create files",
            Step::ProtectDefaultBranch => "protect default branch",
            Step::CreateLabels => "create labels",
            Step::AddCollaborators => "add collaborators",
            Step::CreateMilestones => "create milestones",
            Step::EnableSecurityFeatures => "enable security features",
            Step::CommitCodeowners => "commit ownership file",
            Step::CreateIssues => "create issues",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to the remote repository after a failed run.
#[derive(Debug)]
pub enum Rollback {
    /// The run stopped before or at creation. No delete is issued, since a
    /// same-named repository that failed creation may belong to someone else.
    NotNeeded,
    /// Kept because the failure was a rate limit.
    KeptRateLimited,
    /// Kept because the caller asked for it.
    KeptOnRequest,
    /// Deleted by the compensating action.
    Deleted,
    /// The compensating deletion failed as well.
    Failed(Error),
}

impl Rollback {
    /// Whether a partially provisioned repository is still on the remote side.
    pub fn repository_left_behind(&self) -> bool {
        matches!(
            self,
            Rollback::KeptRateLimited | Rollback::KeptOnRequest | Rollback::Failed(_)
        )
    }
}

impl fmt::Display for Rollback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rollback::NotNeeded => f.write_str("nothing was created"),
            Rollback::KeptRateLimited => {
                f.write_str("repository kept because the API rate limit was exceeded")
            }
            Rollback::KeptOnRequest => f.write_str("repository kept on request"),
            Rollback::Deleted => f.write_str("repository deleted"),
            Rollback::Failed(err) => write!(f, "{}", err),
        }
    }
}

/// A failed provisioning run.
#[derive(Debug, thiserror::Error)]
#[error("Provisioning {repository} failed during {step}: {source} ({rollback})")]
pub struct ProvisionError {
    pub step: Step,
    pub repository: String,
    #[source]
    pub source: Error,
    pub rollback: Rollback,
}

/// A fully provisioned repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedRepository {
    pub repository: RepoRef,
    /// Milestone numbers assigned by the remote side, keyed by title.
    pub milestones: BTreeMap<String, u64>,
    pub codeowners_committed: bool,
}

/// Drives a provisioning run against a [`RemoteRepository`].
pub struct Provisioner {
    remote: Box<dyn RemoteRepository>,
    owner: String,
    keep_on_failure: bool,
}

impl Provisioner {
    /// Creates a provisioner acting as `owner`, the authenticated account.
    pub fn new(remote: Box<dyn RemoteRepository>, owner: impl Into<String>) -> Self {
        Self {
            remote,
            owner: owner.into(),
            keep_on_failure: false,
        }
    }

    /// Keeps a partially provisioned repository instead of deleting it.
    pub fn keep_on_failure(mut self, keep: bool) -> Self {
        self.keep_on_failure = keep;
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Provisions `spec`. Either every step succeeds or an error is returned
    /// together with the rollback outcome.
    pub fn provision(
        &self,
        spec: &RepositorySpec,
    ) -> std::result::Result<ProvisionedRepository, ProvisionError> {
        let name = spec.name();

        if let Err(source) = spec.validate() {
            return Err(ProvisionError {
                step: Step::Preflight,
                repository: name.to_string(),
                source,
                rollback: Rollback::NotNeeded,
            });
        }

        info!("{}/{}: {}", self.owner, name, Step::CreateRepository);
        let repository = self
            .create_repository(spec)
            .map_err(|source| ProvisionError {
                step: Step::CreateRepository,
                repository: name.to_string(),
                source,
                rollback: Rollback::NotNeeded,
            })?;

        let mut run = Run::new(self.remote.as_ref(), &self.owner, spec);
        match run.execute() {
            Ok(()) => {
                info!("{} provisioned", repository.full_name());
                Ok(run.finish(repository))
            }
            Err((step, source)) => Err(self.abort(spec, step, source)),
        }
    }

    /// Deletes `name` from the owner's account.
    pub fn delete(&self, name: &str) -> crate::error::Result<()> {
        info!("Deleting {}/{}", self.owner, name);
        self.remote.delete_repository(&self.owner, name)
    }

    fn create_repository(&self, spec: &RepositorySpec) -> crate::error::Result<RepoRef> {
        match spec.template() {
            Some(template) => {
                info!("Generating {} from template {}", spec.name(), template);
                self.remote
                    .create_repository_from_template(&TemplateRequest {
                        template_owner: &template.owner,
                        template_repo: &template.repo,
                        owner: &self.owner,
                        name: spec.name(),
                        description: spec.description(),
                        private: spec.is_private(),
                        include_all_branches: template.include_all_branches,
                    })
            }
            None => self
                .remote
                .create_repository(spec.name(), spec.description(), spec.is_public()),
        }
    }

    fn abort(&self, spec: &RepositorySpec, step: Step, source: Error) -> ProvisionError {
        let name = spec.name();
        error!("{}/{}: {} failed: {}", self.owner, name, step, source);

        let rollback = if source.is_rate_limited() {
            warn!("Rate limit exceeded, keeping {}/{}", self.owner, name);
            Rollback::KeptRateLimited
        } else if self.keep_on_failure {
            warn!("Keeping {}/{} on request", self.owner, name);
            Rollback::KeptOnRequest
        } else {
            warn!("Deleting partially provisioned {}/{}", self.owner, name);
            match self.remote.delete_repository(&self.owner, name) {
                Ok(()) => Rollback::Deleted,
                Err(err) => {
                    error!("Could not delete {}/{}: {}", self.owner, name, err);
                    Rollback::Failed(Error::Compensation {
                        repository: format!("{}/{}", self.owner, name),
                        message: err.to_string(),
                    })
                }
            }
        };

        ProvisionError {
            step,
            repository: name.to_string(),
            source,
            rollback,
        }
    }
}
