//! End-to-end tests for the `create` command.
//!
//! These tests invoke the actual CLI binary. Runs that reach the API point
//! `api_url` at a local mock server, so nothing leaves the machine.

mod common;

use common::prelude::*;
use mockito::{Matcher, Server};

fn config_for(server: &Server, visibility: &str) -> String {
    format!(
        r##"
create_repository:
  user: me
  api_url: {url}
  defaults:
    client_name: acme
    project_name: site
    visibility: {visibility}
  project_types: [web]
  main_branch: main
  labels:
    - {{ name: bug, color: "#d73a4a" }}
"##,
        url = server.url(),
        visibility = visibility,
    )
}

fn repository_body() -> &'static str {
    r#"{"name":"acme-site-web","owner":{"login":"me"},"html_url":"https://github.com/me/acme-site-web"}"#
}

fn create_command(fixture: &TestFixture) -> assert_cmd::Command {
    let mut cmd = fixture.command();
    cmd.env("GITHUB_TOKEN", "t0ken")
        .env("NO_PROXY", "127.0.0.1,localhost")
        .arg("create")
        .arg("--yes");
    cmd
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_missing_config() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("create")
        .arg("--yes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("repo-provision init"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_without_token() {
    let fixture = TestFixture::new().with_full_config();

    fixture
        .command()
        .arg("create")
        .arg("--yes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No GitHub token available"))
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_unknown_project_type() {
    let fixture = TestFixture::new().with_full_config();

    fixture
        .command()
        .env("GITHUB_TOKEN", "t0ken")
        .args(["create", "--yes", "--type", "wbe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'web'?"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_private_repository() {
    let mut server = Server::new();
    let create = server
        .mock("POST", "/user/repos")
        .match_header("authorization", "Bearer t0ken")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "acme-site-web",
            "private": true,
        })))
        .with_status(201)
        .with_body(repository_body())
        .expect(1)
        .create();
    let protect = server
        .mock("PUT", "/repos/me/acme-site-web/branches/main/protection")
        .expect(0)
        .create();
    let label = server
        .mock("POST", "/repos/me/acme-site-web/labels")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "bug",
            "color": "d73a4a",
        })))
        .with_status(201)
        .with_body("{}")
        .expect(1)
        .create();
    let alerts = server
        .mock("PUT", "/repos/me/acme-site-web/vulnerability-alerts")
        .with_status(204)
        .expect(1)
        .create();
    let fixes = server
        .mock("PUT", "/repos/me/acme-site-web/automated-security-fixes")
        .with_status(204)
        .expect(1)
        .create();

    let fixture = TestFixture::new().with_config(&config_for(&server, "private"));
    create_command(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created me/acme-site-web"))
        .stdout(predicate::str::contains("https://github.com/me/acme-site-web"));

    create.assert();
    protect.assert();
    label.assert();
    alerts.assert();
    fixes.assert();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_failure_deletes_repository() {
    let mut server = Server::new();
    server
        .mock("POST", "/user/repos")
        .with_status(201)
        .with_body(repository_body())
        .create();
    server
        .mock("PUT", "/repos/me/acme-site-web/branches/main/protection")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "required_pull_request_reviews": { "require_code_owner_reviews": true },
        })))
        .with_status(200)
        .with_body("{}")
        .create();
    server
        .mock("POST", "/repos/me/acme-site-web/labels")
        .with_status(422)
        .with_body(r#"{"message":"Validation Failed"}"#)
        .create();
    let delete = server
        .mock("DELETE", "/repos/me/acme-site-web")
        .with_status(204)
        .expect(1)
        .create();

    let fixture = TestFixture::new().with_config(&config_for(&server, "public"));
    create_command(&fixture)
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed during create labels"))
        .stdout(predicate::str::contains("repository deleted"))
        .stderr(predicate::str::contains("Validation Failed"));

    delete.assert();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_keep_on_failure() {
    let mut server = Server::new();
    server
        .mock("POST", "/user/repos")
        .with_status(201)
        .with_body(repository_body())
        .create();
    server
        .mock("PUT", "/repos/me/acme-site-web/branches/main/protection")
        .with_status(200)
        .with_body("{}")
        .create();
    server
        .mock("POST", "/repos/me/acme-site-web/labels")
        .with_status(422)
        .with_body(r#"{"message":"Validation Failed"}"#)
        .create();
    let delete = server
        .mock("DELETE", "/repos/me/acme-site-web")
        .expect(0)
        .create();

    let fixture = TestFixture::new().with_config(&config_for(&server, "public"));
    create_command(&fixture)
        .arg("--keep-on-failure")
        .assert()
        .failure()
        .stderr(predicate::str::contains("repo-provision delete acme-site-web"));

    delete.assert();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_rate_limited_keeps_repository() {
    let mut server = Server::new();
    server
        .mock("POST", "/user/repos")
        .with_status(201)
        .with_body(repository_body())
        .create();
    server
        .mock("POST", "/repos/me/acme-site-web/labels")
        .with_status(403)
        .with_header("x-ratelimit-remaining", "0")
        .with_header("x-ratelimit-reset", "1700000000")
        .with_body(r#"{"message":"API rate limit exceeded"}"#)
        .create();
    let delete = server
        .mock("DELETE", "/repos/me/acme-site-web")
        .expect(0)
        .create();

    let fixture = TestFixture::new().with_config(&config_for(&server, "private"));
    create_command(&fixture)
        .assert()
        .failure()
        .stdout(predicate::str::contains("rate limit"))
        .stderr(predicate::str::contains("was kept"))
        .stderr(predicate::str::contains("1700000000"));

    delete.assert();
}
