//! # Remote File References
//!
//! Files in a repository spec can be declared as "mirror this file from another
//! repository". They are written as the browser URL of the file on the hosting
//! service, for example:
//!
//! ```text
//! https://github.com/acme/templates/blob/main/docs/readme.md
//! ```
//!
//! [`RemoteFileReference::parse`] turns such a URL into the `(owner, repo, path)`
//! triple needed to download the content through the API. Parsing is purely
//! structural: the host is not checked and no network access happens.

use crate::error::{Error, Result};
use std::fmt;
use url::Url;

/// Path segment that separates the repository from the file location in a
/// blob URL. The segment that follows it names the branch and is dropped.
const BLOB_MARKER: &str = "blob";

/// A file inside another repository, identified by owner, name and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileReference {
    pub owner: String,
    pub repo: String,
    /// Path of the file inside `owner/repo`, without a leading slash.
    pub path: String,
}

impl RemoteFileReference {
    /// Parses a blob URL into its owner, repository and file path.
    ///
    /// The `blob/<branch>` marker is stripped when present, so both
    /// `https://host/o/r/blob/main/a/b.md` and `https://host/o/r/a/b.md`
    /// yield `o`, `r` and `a/b.md`. The download always targets the source
    /// repository's default branch.
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidRemoteFileUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let mut segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() >= 4 && segments[2] == BLOB_MARKER {
            segments.drain(2..4);
        }

        if segments.len() < 3 {
            return Err(Error::InvalidRemoteFileUrl {
                url: url.to_string(),
                message: "expected <owner>/<repository>/<path to file>".to_string(),
            });
        }

        Ok(Self {
            owner: segments[0].to_string(),
            repo: segments[1].to_string(),
            path: segments[2..].join("/"),
        })
    }
}

impl fmt::Display for RemoteFileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.path)
    }
}
