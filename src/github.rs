//! # GitHub REST Client
//!
//! [`GithubClient`] implements [`RemoteRepository`] on top of the GitHub REST
//! API using a blocking `reqwest` client. It is a thin pass-through: each trait
//! method maps to exactly one HTTP call.
//!
//! ## Error mapping
//!
//! - HTTP 429, or HTTP 403 with `x-ratelimit-remaining: 0` or a "rate limit"
//!   message, becomes [`Error::RateLimited`].
//! - Any other non-success status becomes [`Error::RemoteApi`] carrying the
//!   `message` field of the JSON error body when there is one.
//! - Transport failures surface as [`Error::Http`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::{Error, Result};
use crate::remote::{BranchProtection, NewFile, NewIssue, RemoteRepository, RepoRef, TemplateRequest};
use crate::spec::{Label, Milestone};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    name: String,
    owner: Account,
    #[serde(default)]
    html_url: Option<String>,
}

impl From<RepositoryResponse> for RepoRef {
    fn from(response: RepositoryResponse) -> Self {
        RepoRef {
            owner: response.owner.login,
            name: response.name,
            html_url: response.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MilestoneResponse {
    number: u64,
}

/// Blocking GitHub API client authenticated with a personal access token.
pub struct GithubClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl GithubClient {
    /// Client for the public GitHub API.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_API_URL, token)
    }

    /// Client for another API root, such as a GitHub Enterprise server.
    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(concat!("repo-provision/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn send(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
        accept: &str,
    ) -> Result<Response> {
        let url = self.endpoint(path)?;
        debug!("{} {} ({})", method, url, operation);

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send()?)
    }

    /// API URL for a `/`-separated path. Each segment is percent-encoded, so
    /// a `#` or `?` in a file path or branch name stays part of the path.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    /// Sends a JSON request and fails on any non-success status.
    fn call(&self, operation: &str, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let response = self.send(operation, method, path, body, JSON_MEDIA_TYPE)?;
        ensure_success(operation, response)
    }
}

fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ApiMessage>(&text)
        .map(|m| m.message)
        .unwrap_or(text);

    if is_rate_limited(status, &headers, &message) {
        return Err(Error::RateLimited {
            operation: operation.to_string(),
            reset_at: header_u64(&headers, "x-ratelimit-reset"),
        });
    }

    Err(Error::RemoteApi {
        operation: operation.to_string(),
        status: status.as_u16(),
        message,
    })
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap, message: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && (header_u64(headers, "x-ratelimit-remaining") == Some(0)
            || message.to_lowercase().contains("rate limit"))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

impl RemoteRepository for GithubClient {
    fn create_repository(&self, name: &str, description: &str, public: bool) -> Result<RepoRef> {
        let body = json!({
            "name": name,
            "description": description,
            "private": !public,
            "has_issues": true,
            "auto_init": true,
        });
        let response = self.call("create repository", Method::POST, "user/repos", Some(&body))?;
        Ok(response.json::<RepositoryResponse>()?.into())
    }

    fn create_repository_from_template(&self, request: &TemplateRequest<'_>) -> Result<RepoRef> {
        let body = json!({
            "owner": request.owner,
            "name": request.name,
            "description": request.description,
            "private": request.private,
            "include_all_branches": request.include_all_branches,
        });
        let path = format!(
            "repos/{}/{}/generate",
            request.template_owner, request.template_repo
        );
        let response = self.call("create repository from template", Method::POST, &path, Some(&body))?;
        Ok(response.json::<RepositoryResponse>()?.into())
    }

    fn delete_repository(&self, owner: &str, name: &str) -> Result<()> {
        let path = format!("repos/{}/{}", owner, name);
        self.call("delete repository", Method::DELETE, &path, None)?;
        Ok(())
    }

    fn download_file_content(&self, owner: &str, repo: &str, path: &str) -> Result<Vec<u8>> {
        let operation = format!("download {}/{}:{}", owner, repo, path);
        let api_path = format!("repos/{}/{}/contents/{}", owner, repo, path);
        let response = self.send(&operation, Method::GET, &api_path, None, RAW_MEDIA_TYPE)?;
        let response = ensure_success(&operation, response)?;
        Ok(response.bytes()?.to_vec())
    }

    fn create_file(&self, owner: &str, repo: &str, file: &NewFile<'_>) -> Result<()> {
        let body = json!({
            "message": file.message,
            "content": STANDARD.encode(file.content),
            "branch": file.branch,
        });
        let path = format!("repos/{}/{}/contents/{}", owner, repo, file.path);
        self.call(&format!("create file {}", file.path), Method::PUT, &path, Some(&body))?;
        Ok(())
    }

    fn add_collaborator(&self, owner: &str, repo: &str, username: &str) -> Result<()> {
        let path = format!("repos/{}/{}/collaborators/{}", owner, repo, username);
        self.call(&format!("add collaborator {}", username), Method::PUT, &path, Some(&json!({})))?;
        Ok(())
    }

    fn create_label(&self, owner: &str, repo: &str, label: &Label) -> Result<()> {
        let mut body = json!({ "name": label.name, "color": label.color });
        if let Some(description) = &label.description {
            body["description"] = json!(description);
        }
        let path = format!("repos/{}/{}/labels", owner, repo);
        self.call(&format!("create label {}", label.name), Method::POST, &path, Some(&body))?;
        Ok(())
    }

    fn create_milestone(&self, owner: &str, repo: &str, milestone: &Milestone) -> Result<u64> {
        let mut body = json!({ "title": milestone.title });
        if let Some(description) = &milestone.description {
            body["description"] = json!(description);
        }
        if let Some(due_on) = &milestone.due_on {
            body["due_on"] = json!(due_on);
        }
        let path = format!("repos/{}/{}/milestones", owner, repo);
        let response = self.call(
            &format!("create milestone {}", milestone.title),
            Method::POST,
            &path,
            Some(&body),
        )?;
        Ok(response.json::<MilestoneResponse>()?.number)
    }

    fn create_issue(&self, owner: &str, repo: &str, issue: &NewIssue<'_>) -> Result<()> {
        let mut body = json!({
            "title": issue.title,
            "body": issue.body,
            "labels": issue.labels,
        });
        if let Some(milestone) = issue.milestone {
            body["milestone"] = json!(milestone);
        }
        let path = format!("repos/{}/{}/issues", owner, repo);
        self.call(&format!("create issue {}", issue.title), Method::POST, &path, Some(&body))?;
        Ok(())
    }

    fn enable_vulnerability_alerts(&self, owner: &str, repo: &str) -> Result<()> {
        let path = format!("repos/{}/{}/vulnerability-alerts", owner, repo);
        self.call("enable vulnerability alerts", Method::PUT, &path, Some(&json!({})))?;
        Ok(())
    }

    fn enable_automated_security_fixes(&self, owner: &str, repo: &str) -> Result<()> {
        let path = format!("repos/{}/{}/automated-security-fixes", owner, repo);
        self.call("enable automated security fixes", Method::PUT, &path, Some(&json!({})))?;
        Ok(())
    }

    fn protect_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        protection: &BranchProtection,
    ) -> Result<()> {
        let body = json!({
            "required_status_checks": null,
            "enforce_admins": null,
            "required_pull_request_reviews": {
                "dismiss_stale_reviews": protection.dismiss_stale_reviews,
                "require_code_owner_reviews": protection.require_code_owner_reviews,
                "required_approving_review_count": protection.required_approving_review_count,
            },
            "restrictions": null,
        });
        let path = format!("repos/{}/{}/branches/{}/protection", owner, repo, branch);
        self.call(&format!("protect branch {}", branch), Method::PUT, &path, Some(&body))?;
        Ok(())
    }

    fn user_exists(&self, username: &str) -> Result<bool> {
        let operation = format!("look up user {}", username);
        let path = format!("users/{}", username);
        let response = self.send(&operation, Method::GET, &path, None, JSON_MEDIA_TYPE)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(&operation, response)?;
        Ok(true)
    }
}
