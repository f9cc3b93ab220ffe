//! The remote build pipeline.
//!
//! One run moves strictly forward through
//! `Idle -> Resolving -> Packaging -> Uploading -> Dispatching -> Done`, or stops in
//! `Failed`. Resolving never fails. Packaging failures abort before any network
//! traffic. The local archive is removed on every exit path; an uploaded artifact
//! is left in place when the dispatch itself fails.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::ci::{CiDispatcher, DispatchError, DispatchPayload, GithubDispatcher};
use crate::command::derive_command;
use crate::config::{Config, ConfigError};
use crate::consts::TARGET_PLATFORM;
use crate::ignore;
use crate::package::{self, PackageError};
use crate::profile::{self, BuildSpec};
use crate::storage::{AppwriteStorage, BlobStorage, StorageError};
use crate::util::id::timestamp_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
  Idle,
  Resolving,
  Packaging,
  Uploading,
  Dispatching,
  Done,
  Failed,
}

impl Phase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Idle => "idle",
      Phase::Resolving => "resolving",
      Phase::Packaging => "packaging",
      Phase::Uploading => "uploading",
      Phase::Dispatching => "dispatching",
      Phase::Done => "done",
      Phase::Failed => "failed",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Package(#[from] PackageError),

  #[error(transparent)]
  Storage(#[from] StorageError),

  #[error(transparent)]
  Dispatch(#[from] DispatchError),
}

impl PipelineError {
  /// The phase the pipeline was in when it failed.
  pub fn phase(&self) -> Phase {
    match self {
      PipelineError::Config(_) => Phase::Idle,
      PipelineError::Storage(StorageError::Client { .. }) => Phase::Idle,
      PipelineError::Dispatch(DispatchError::Client { .. }) => Phase::Idle,
      PipelineError::Package(_) => Phase::Packaging,
      PipelineError::Storage(_) => Phase::Uploading,
      PipelineError::Dispatch(_) => Phase::Dispatching,
    }
  }
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
  pub build_id: String,
  pub artifact_id: String,
  pub archive_url: String,
  pub command: String,
  pub spec: BuildSpec,
  pub archive_size: u64,
  pub archive_entries: usize,
  pub monitoring_url: String,
  /// Degraded profile fields, rendered for display.
  pub warnings: Vec<String>,
}

/// Answer to a status query. Only points at the CI run list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
  pub build_id: String,
  pub monitoring_url: String,
}

pub fn status(config: &Config, build_id: &str) -> StatusReport {
  StatusReport {
    build_id: build_id.to_string(),
    monitoring_url: config.monitoring_url(),
  }
}

/// Flatten a spec into the event the CI workflow receives.
pub fn build_payload(spec: &BuildSpec, command: String, archive_url: String, build_id: String) -> DispatchPayload {
  DispatchPayload {
    archive_url,
    build_id,
    platform: TARGET_PLATFORM.to_string(),
    variant: spec.variant,
    output_kind: spec.output_kind,
    command,
    auto_increment_version: spec.auto_increment_version,
    distribution_channel: spec.distribution_channel.clone(),
    environment: spec.environment.clone(),
  }
}

struct Progress {
  phase: Phase,
}

impl Progress {
  fn new() -> Self {
    Self { phase: Phase::Idle }
  }

  fn enter(&mut self, phase: Phase) {
    info!(from = %self.phase, to = %phase, "pipeline phase");
    self.phase = phase;
  }

  fn fail(&mut self, err: PipelineError) -> PipelineError {
    error!(phase = %self.phase, error = %err, "pipeline failed");
    self.phase = Phase::Failed;
    err
  }
}

/// Resolve, package, upload, and dispatch one build.
pub struct DispatchPipeline<'a, S, C> {
  config: &'a Config,
  storage: S,
  ci: C,
}

impl<'a> DispatchPipeline<'a, AppwriteStorage, GithubDispatcher> {
  /// Pipeline backed by the configured storage and CI endpoints.
  pub fn from_config(config: &'a Config) -> Result<Self, PipelineError> {
    let storage = AppwriteStorage::new(config)?;
    let ci = GithubDispatcher::new(&config.ci_token)?;
    Ok(Self::new(config, storage, ci))
  }
}

impl<'a, S, C> DispatchPipeline<'a, S, C>
where
  S: BlobStorage,
  C: CiDispatcher,
{
  pub fn new(config: &'a Config, storage: S, ci: C) -> Self {
    Self { config, storage, ci }
  }

  pub async fn run(
    &self,
    project_root: &Path,
    profile_name: &str,
    caller_patterns: &[String],
  ) -> Result<DispatchOutcome, PipelineError> {
    let mut progress = Progress::new();
    // Reject a bad repository before anything is uploaded.
    self.config.check().map_err(|e| progress.fail(e.into()))?;

    progress.enter(Phase::Resolving);
    let resolution = profile::resolve_detailed(project_root, profile_name);
    let spec = resolution.spec;
    let command = derive_command(&spec);
    let warnings: Vec<String> = resolution.warnings.iter().map(|w| w.to_string()).collect();
    info!(
      profile = %profile_name,
      variant = %spec.variant,
      output = %spec.output_kind,
      command = %command,
      "resolved build spec"
    );

    progress.enter(Phase::Packaging);
    let ignore_set = ignore::resolve(project_root, caller_patterns);
    let archive = package::package(project_root, &ignore_set).map_err(|e| progress.fail(e.into()))?;
    let archive_size = archive.size();
    let archive_entries = archive.entries().len();

    progress.enter(Phase::Uploading);
    let bytes = match archive.read_bytes() {
      Ok(bytes) => bytes,
      Err(source) => {
        let err = StorageError::ReadArchive {
          path: archive.path().to_path_buf(),
          source,
        };
        archive.discard();
        return Err(progress.fail(err.into()));
      }
    };
    let artifact_id = match self.storage.upload(bytes, &archive.file_name()).await {
      Ok(id) => id,
      Err(e) => {
        archive.discard();
        return Err(progress.fail(e.into()));
      }
    };
    archive.discard();

    progress.enter(Phase::Dispatching);
    let archive_url = self.storage.download_reference(&artifact_id);
    let build_id = timestamp_id();
    let payload = build_payload(&spec, command.clone(), archive_url.clone(), build_id.clone());
    if let Err(e) = self.ci.trigger(&self.config.repo, &payload).await {
      warn!(artifact_id = %artifact_id, "uploaded artifact left in storage");
      return Err(progress.fail(e.into()));
    }

    progress.enter(Phase::Done);
    info!(build_id = %build_id, artifact_id = %artifact_id, "build dispatched");

    Ok(DispatchOutcome {
      build_id,
      artifact_id,
      archive_url,
      command,
      spec,
      archive_size,
      archive_entries,
      monitoring_url: self.config.monitoring_url(),
      warnings,
    })
  }
}
