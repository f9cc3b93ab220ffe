//! Credential and endpoint configuration.
//!
//! The configuration is a single JSON document of six flat string fields:
//!
//! ```json
//! {
//!   "endpoint": "https://cloud.appwrite.io/v1",
//!   "projectId": "…",
//!   "apiKey": "…",
//!   "bucketId": "…",
//!   "ciToken": "…",
//!   "repo": "owner/name"
//! }
//! ```
//!
//! It is loaded once per invocation and handed to the pipeline by reference.
//! Nothing on the build path writes it; only `rbuild init` does.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::platform::paths::config_path;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("no configuration found at {}; run `rbuild init` first", path.display())]
  NotFound { path: PathBuf },

  #[error("configuration at {} is missing required field(s): {}", path.display(), fields.join(", "))]
  Missing { path: PathBuf, fields: Vec<&'static str> },

  #[error("failed to read configuration {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse configuration {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("failed to write configuration {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("configuration already exists at {}", path.display())]
  Exists { path: PathBuf },

  #[error("invalid repository '{repo}' in configuration: expected 'owner/name'")]
  InvalidRepo { repo: String },
}

/// The on-disk document, every field optional so missing ones can be reported together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigDocument {
  endpoint: Option<String>,
  project_id: Option<String>,
  api_key: Option<String>,
  bucket_id: Option<String>,
  ci_token: Option<String>,
  #[serde(alias = "repoIdentifier")]
  repo: Option<String>,
}

/// Fully populated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
  /// Storage API endpoint, e.g. `https://cloud.appwrite.io/v1`.
  pub endpoint: String,
  pub project_id: String,
  pub api_key: String,
  pub bucket_id: String,
  /// Token used to authorize repository dispatches.
  pub ci_token: String,
  /// `owner/name` of the repository whose workflow runs the build.
  pub repo: String,
}

impl Config {
  /// Load from the default location (see [`config_path`]).
  pub fn load() -> Result<Self, ConfigError> {
    Self::load_from(&config_path())
  }

  /// Load and validate the document at `path`.
  pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(ConfigError::NotFound { path: path.to_path_buf() });
      }
      Err(e) => {
        return Err(ConfigError::Read {
          path: path.to_path_buf(),
          source: e,
        });
      }
    };

    let doc: ConfigDocument = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;

    debug!(path = %path.display(), "loaded configuration");
    Self::from_document(doc, path)
  }

  fn from_document(doc: ConfigDocument, path: &Path) -> Result<Self, ConfigError> {
    let mut missing = Vec::new();
    let mut take = |value: Option<String>, name: &'static str| match value.map(|v| v.trim().to_string()) {
      Some(v) if !v.is_empty() => v,
      _ => {
        missing.push(name);
        String::new()
      }
    };

    let config = Config {
      endpoint: take(doc.endpoint, "endpoint"),
      project_id: take(doc.project_id, "projectId"),
      api_key: take(doc.api_key, "apiKey"),
      bucket_id: take(doc.bucket_id, "bucketId"),
      ci_token: take(doc.ci_token, "ciToken"),
      repo: take(doc.repo, "repo"),
    };

    if !missing.is_empty() {
      return Err(ConfigError::Missing {
        path: path.to_path_buf(),
        fields: missing,
      });
    }

    config.check()?;
    Ok(config)
  }

  /// Reject values no remote call could succeed with.
  pub fn check(&self) -> Result<(), ConfigError> {
    if !is_repo_identifier(&self.repo) {
      return Err(ConfigError::InvalidRepo { repo: self.repo.clone() });
    }
    Ok(())
  }

  /// Trim every field and reject blank ones, as loading does.
  pub fn validated(self, path: &Path) -> Result<Self, ConfigError> {
    let doc = ConfigDocument {
      endpoint: Some(self.endpoint),
      project_id: Some(self.project_id),
      api_key: Some(self.api_key),
      bucket_id: Some(self.bucket_id),
      ci_token: Some(self.ci_token),
      repo: Some(self.repo),
    };
    Self::from_document(doc, path)
  }

  /// Write the document to `path`, creating parent directories.
  ///
  /// Refuses to replace an existing file unless `overwrite` is set.
  pub fn save_to(&self, path: &Path, overwrite: bool) -> Result<(), ConfigError> {
    if path.exists() && !overwrite {
      return Err(ConfigError::Exists { path: path.to_path_buf() });
    }

    let write_err = |source| ConfigError::Write {
      path: path.to_path_buf(),
      source,
    };

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(write_err)?;
    }

    let content = serde_json::to_string_pretty(self).map_err(|e| write_err(io::Error::other(e)))?;

    // Write to a sibling then rename so a crash never leaves a half-written file.
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).map_err(write_err)?;
    fs::rename(&temp_path, path).map_err(write_err)?;

    Ok(())
  }

  /// Where a dispatched build can be followed.
  pub fn monitoring_url(&self) -> String {
    format!("https://github.com/{}/actions", self.repo)
  }

  /// A copy safe to print, with both secrets masked.
  pub fn redacted(&self) -> Config {
    Config {
      api_key: mask_secret(&self.api_key),
      ci_token: mask_secret(&self.ci_token),
      ..self.clone()
    }
  }
}

/// True for the `owner/name` form.
pub fn is_repo_identifier(repo: &str) -> bool {
  let mut parts = repo.split('/');
  matches!(
    (parts.next(), parts.next(), parts.next()),
    (Some(owner), Some(name), None) if !owner.trim().is_empty() && !name.trim().is_empty()
  )
}

/// Keep the last four characters of a secret, mask the rest.
pub fn mask_secret(secret: &str) -> String {
  let chars: Vec<char> = secret.chars().collect();
  if chars.len() <= 4 {
    return "*".repeat(chars.len());
  }
  let visible: String = chars[chars.len() - 4..].iter().collect();
  format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
