//! CI trigger for remote builds.
//!
//! The build itself runs on a CI workflow that listens for a
//! `repository_dispatch` event. [`GithubDispatcher`] sends that event with a
//! [`DispatchPayload`] describing what to build and where to fetch the sources.

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::is_repo_identifier;
use crate::consts::{DISPATCH_EVENT_TYPE, USER_AGENT};
use crate::profile::{OutputKind, Variant};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Overrides [`DEFAULT_API_BASE`], e.g. for GitHub Enterprise.
pub const API_BASE_ENV: &str = "GITHUB_API_URL";

#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("invalid repository '{repo}': expected 'owner/name'")]
  InvalidRepo { repo: String },

  #[error("failed to create HTTP client: {message}")]
  Client { message: String },

  #[error("dispatch request to {url} failed: {message}")]
  Request { url: String, message: String },

  #[error("CI returned HTTP {status}: {body}")]
  Status { status: u16, body: String },
}

/// Everything the CI workflow needs to run one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchPayload {
  pub archive_url: String,
  pub build_id: String,
  pub platform: String,
  pub variant: Variant,
  pub output_kind: OutputKind,
  pub command: String,
  pub auto_increment_version: bool,
  pub distribution_channel: String,
  pub environment: BTreeMap<String, String>,
}

/// Fires a build event at a CI repository.
pub trait CiDispatcher {
  fn trigger(&self, repo: &str, payload: &DispatchPayload) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

#[derive(Serialize)]
struct DispatchEvent<'a> {
  event_type: &'a str,
  client_payload: &'a DispatchPayload,
}

/// `repository_dispatch` client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubDispatcher {
  api_base: String,
  token: String,
  http: reqwest::Client,
}

impl GithubDispatcher {
  /// Client against the API base from `GITHUB_API_URL`, or the public API.
  pub fn new(token: &str) -> Result<Self, DispatchError> {
    let api_base = std::env::var(API_BASE_ENV)
      .ok()
      .filter(|v| !v.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    Self::with_api_base(token, &api_base)
  }

  pub fn with_api_base(token: &str, api_base: &str) -> Result<Self, DispatchError> {
    let http = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| DispatchError::Client { message: e.to_string() })?;

    Ok(Self {
      api_base: api_base.trim_end_matches('/').to_string(),
      token: token.to_string(),
      http,
    })
  }

  pub fn api_base(&self) -> &str {
    &self.api_base
  }
}

/// Checks for the `owner/name` form.
pub fn validate_repo(repo: &str) -> Result<(), DispatchError> {
  if is_repo_identifier(repo) {
    Ok(())
  } else {
    Err(DispatchError::InvalidRepo { repo: repo.to_string() })
  }
}

impl CiDispatcher for GithubDispatcher {
  async fn trigger(&self, repo: &str, payload: &DispatchPayload) -> Result<(), DispatchError> {
    validate_repo(repo)?;

    let url = format!("{}/repos/{}/dispatches", self.api_base, repo);
    let event = DispatchEvent {
      event_type: DISPATCH_EVENT_TYPE,
      client_payload: payload,
    };

    info!(repo = %repo, build_id = %payload.build_id, "dispatching build event");

    let response = self
      .http
      .post(&url)
      .bearer_auth(&self.token)
      .header("Accept", "application/vnd.github+json")
      .header("X-GitHub-Api-Version", "2022-11-28")
      .json(&event)
      .send()
      .await
      .map_err(|e| DispatchError::Request {
        url: url.clone(),
        message: e.to_string(),
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(DispatchError::Status {
        status: status.as_u16(),
        body,
      });
    }

    Ok(())
  }
}
