//! # Error Handling
//!
//! This module defines the centralized error type for `repo-provision`. It
//! uses the `thiserror` library to build a single `Error` enum covering every
//! anticipated failure mode, with messages that carry enough context to act
//! on.
//!
//! ## Taxonomy
//!
//! - **Configuration errors** (`ConfigParse`, `MilestoneNotFound`,
//!   `InvalidRemoteFileUrl`): the configuration or the repository spec is
//!   inconsistent. Detected before any remote mutation where possible.
//! - **Rate limiting** (`RateLimited`): the remote API rejected a call because
//!   the quota is exhausted. Kept apart from other remote failures because it
//!   suppresses the compensating deletion.
//! - **Missing reviewers** (`ReviewerNotFound`): a username referenced by the
//!   ownership model does not exist on the remote side.
//! - **Remote failures** (`RemoteApi`, `Http`): any other failure reported by
//!   the remote service or the transport.
//! - **Compensation failures** (`Compensation`): the best-effort deletion that
//!   follows an aborted run failed as well.
//!
//! The `Result` type alias is used throughout the library.

use thiserror::Error;

/// Main error type for repo-provision operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file (or the data derived from it) is invalid.
    ///
    /// Carries an optional hint explaining how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An issue references a milestone title that is not declared.
    #[error("Milestone not found: issue '{issue}' references undeclared milestone '{milestone}'")]
    MilestoneNotFound { issue: String, milestone: String },

    /// A remote file URL could not be split into owner, repository and path.
    #[error("Invalid remote file URL {url}: {message}")]
    InvalidRemoteFileUrl { url: String, message: String },

    /// The remote API refused a call because the rate limit is exhausted.
    #[error("API rate limit exceeded during {operation}{}", reset_at.map(|r| format!(" (resets at unix time {})", r)).unwrap_or_default())]
    RateLimited {
        operation: String,
        /// Epoch seconds at which the quota resets, when the server said so.
        reset_at: Option<u64>,
    },

    /// A reviewer referenced by the ownership model does not exist remotely.
    #[error("Ownership file not created: user {username} does not exist")]
    ReviewerNotFound { username: String },

    /// The remote API answered with a non-success status.
    #[error("Remote API error during {operation} (HTTP {status}): {message}")]
    RemoteApi {
        operation: String,
        status: u16,
        message: String,
    },

    /// The compensating deletion of a partially provisioned repository failed.
    #[error("Compensating deletion of {repository} failed: {message}")]
    Compensation { repository: String, message: String },

    /// A transport-level HTTP error, wrapped from `reqwest::Error`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a configuration error without a hint.
    pub fn config(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a configuration error with a hint.
    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Whether the failure was caused by an exhausted API quota.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
