//! # Repository Provisioning Library
//!
//! This library provisions a fully configured GitHub repository from a
//! declarative YAML file: it creates the repository (optionally from a
//! template), seeds files, folders, labels, milestones and issues, invites
//! collaborators, enables security features, protects the default branch and
//! generates a `CODEOWNERS` file from a group-based reviewer model. It backs
//! the `repo-provision` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use repo_provision::codeowners::OwnershipModel;
//! use repo_provision::spec::{RepositorySpec, Visibility};
//!
//! let model: OwnershipModel = serde_yaml::from_str(r#"
//! reviewers:
//!   defaults: [alice]
//!   web: [bob, alice]
//! patterns:
//!   - { pattern: "*", owners: [defaults] }
//!   - { pattern: "*.css", owners: [web] }
//! "#).unwrap();
//!
//! let spec = RepositorySpec::builder("Acme", "Site", "web")
//!     .with_visibility(Visibility::Public)
//!     .with_codeowners(model)
//!     .build();
//!
//! assert_eq!(spec.name(), "acme-site-web");
//! assert_eq!(
//!     spec.codeowners().compile().render(),
//!     "* @alice\n*.css @bob @alice\n"
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`, `loader`)**: the `repo-provision.yaml` file
//!   and the answers of the operator are turned into a [`spec::RepositorySpec`].
//! - **Spec (`spec`)**: the immutable description of the repository to create.
//! - **Ownership (`codeowners`)**: resolves reviewer groups into per-pattern
//!   owner lists and renders the `CODEOWNERS` text.
//! - **Remote files (`remote_file`)**: parses blob URLs of files mirrored from
//!   other repositories.
//! - **Remote side (`remote`, `github`)**: the [`remote::RemoteRepository`]
//!   trait and its GitHub REST implementation.
//! - **Provisioning (`provision`)**: runs the ordered steps and deletes the
//!   partially created repository when a run fails.

pub mod codeowners;
pub mod config;
pub mod defaults;
pub mod error;
pub mod github;
pub mod loader;
pub mod output;
pub mod provision;
pub mod remote;
pub mod remote_file;
pub mod spec;
pub mod suggestions;
