//! Test utilities for rbuild-lib.
//!
//! Project tree builders, archive readers, and in-memory collaborators for
//! exercising the pipeline without a network.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};

use flate2::read::GzDecoder;

use crate::ci::{CiDispatcher, DispatchError, DispatchPayload};
use crate::config::Config;
use crate::profile::{OutputKind, Variant};
use crate::storage::{BlobStorage, StorageError};

/// Write `(relative path, contents)` pairs under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
  for (rel, contents) in files {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
  }
}

fn open_archive(path: &Path) -> tar::Archive<GzDecoder<fs::File>> {
  tar::Archive::new(GzDecoder::new(fs::File::open(path).unwrap()))
}

/// Entry names of a `.tar.gz`, in archive order.
pub fn archive_entries(path: &Path) -> Vec<String> {
  let mut archive = open_archive(path);
  archive
    .entries()
    .unwrap()
    .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
    .collect()
}

/// Contents of one regular file inside a `.tar.gz`.
pub fn archive_file_content(path: &Path, name: &str) -> Option<String> {
  let mut archive = open_archive(path);
  for entry in archive.entries().unwrap() {
    let mut entry = entry.unwrap();
    if entry.path().unwrap().to_string_lossy() == name {
      let mut contents = String::new();
      entry.read_to_string(&mut contents).unwrap();
      return Some(contents);
    }
  }
  None
}

/// True while an `rbuild-*` temporary directory still holds `file_name`.
pub fn archive_left_behind(file_name: &str) -> bool {
  fs::read_dir(std::env::temp_dir())
    .unwrap()
    .filter_map(Result::ok)
    .filter(|e| e.file_name().to_string_lossy().starts_with("rbuild-"))
    .any(|e| e.path().join(file_name).exists())
}

/// Fully populated config pointing storage at `endpoint`.
pub fn test_config(endpoint: &str) -> Config {
  Config {
    endpoint: endpoint.to_string(),
    project_id: "proj".to_string(),
    api_key: "secret-api-key".to_string(),
    bucket_id: "builds".to_string(),
    ci_token: "ghp_token".to_string(),
    repo: "acme/builds".to_string(),
  }
}

pub fn sample_payload() -> DispatchPayload {
  DispatchPayload {
    archive_url: "https://storage.example.com/files/f1/download".to_string(),
    build_id: "1700000000000".to_string(),
    platform: "android".to_string(),
    variant: Variant::Release,
    output_kind: OutputKind::Package,
    command: "assembleRelease".to_string(),
    auto_increment_version: false,
    distribution_channel: "internal".to_string(),
    environment: BTreeMap::from([("API_URL".to_string(), "https://api.example.com".to_string())]),
  }
}

#[derive(Debug, Default)]
struct StorageState {
  uploads: Vec<(String, Vec<u8>)>,
  attempted: Vec<String>,
}

/// Records uploads in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeStorage {
  state: Arc<Mutex<StorageState>>,
  fail_status: Option<u16>,
}

impl FakeStorage {
  pub fn failing(status: u16) -> Self {
    Self {
      fail_status: Some(status),
      ..Self::default()
    }
  }

  /// `(filename, bytes)` per upload attempt that succeeded.
  pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
    self.state.lock().unwrap().uploads.clone()
  }

  pub fn upload_count(&self) -> usize {
    self.state.lock().unwrap().uploads.len()
  }

  /// File names of every upload call, including rejected ones.
  pub fn attempted(&self) -> Vec<String> {
    self.state.lock().unwrap().attempted.clone()
  }
}

impl BlobStorage for FakeStorage {
  async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, StorageError> {
    self.state.lock().unwrap().attempted.push(filename.to_string());
    if let Some(status) = self.fail_status {
      return Err(StorageError::Status {
        status,
        body: "upload rejected".to_string(),
      });
    }
    let mut state = self.state.lock().unwrap();
    state.uploads.push((filename.to_string(), bytes));
    Ok(format!("artifact-{}", state.uploads.len()))
  }

  fn download_reference(&self, artifact_id: &str) -> String {
    format!("https://storage.test/files/{}/download", artifact_id)
  }
}

/// Records dispatched payloads in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeCi {
  triggers: Arc<Mutex<Vec<(String, DispatchPayload)>>>,
  fail_status: Option<u16>,
}

impl FakeCi {
  pub fn failing(status: u16) -> Self {
    Self {
      fail_status: Some(status),
      ..Self::default()
    }
  }

  pub fn triggers(&self) -> Vec<(String, DispatchPayload)> {
    self.triggers.lock().unwrap().clone()
  }
}

impl CiDispatcher for FakeCi {
  async fn trigger(&self, repo: &str, payload: &DispatchPayload) -> Result<(), DispatchError> {
    if let Some(status) = self.fail_status {
      return Err(DispatchError::Status {
        status,
        body: "dispatch rejected".to_string(),
      });
    }
    self.triggers.lock().unwrap().push((repo.to_string(), payload.clone()));
    Ok(())
  }
}
