//! Blob storage for packaged archives.
//!
//! [`BlobStorage`] is the seam the pipeline uploads through. [`AppwriteStorage`]
//! talks to an Appwrite-compatible storage API: files go to
//! `POST {endpoint}/storage/buckets/{bucket}/files` as multipart uploads, split
//! into `Content-Range` chunks when larger than [`CHUNK_SIZE`].

use std::future::Future;
use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::consts::USER_AGENT;

/// Largest single request body the storage API accepts.
pub const CHUNK_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("failed to read archive {}: {source}", path.display())]
  ReadArchive { path: PathBuf, source: std::io::Error },

  #[error("failed to create HTTP client: {message}")]
  Client { message: String },

  #[error("upload request to {url} failed: {message}")]
  Request { url: String, message: String },

  #[error("storage returned HTTP {status}: {body}")]
  Status { status: u16, body: String },

  #[error("unexpected storage response: {message}")]
  InvalidResponse { message: String },
}

/// Uploads archives and names where the remote side can fetch them.
pub trait BlobStorage {
  /// Store `bytes` under `filename`, returning the artifact id.
  fn upload(&self, bytes: Vec<u8>, filename: &str) -> impl Future<Output = Result<String, StorageError>> + Send;

  /// URL the remote build downloads the artifact from.
  fn download_reference(&self, artifact_id: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
  #[serde(rename = "$id")]
  id: String,
}

/// Appwrite storage client.
#[derive(Debug, Clone)]
pub struct AppwriteStorage {
  endpoint: String,
  project_id: String,
  api_key: String,
  bucket_id: String,
  chunk_size: usize,
  http: reqwest::Client,
}

impl AppwriteStorage {
  pub fn new(config: &Config) -> Result<Self, StorageError> {
    let http = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| StorageError::Client { message: e.to_string() })?;

    Ok(Self {
      endpoint: config.endpoint.trim_end_matches('/').to_string(),
      project_id: config.project_id.clone(),
      api_key: config.api_key.clone(),
      bucket_id: config.bucket_id.clone(),
      chunk_size: CHUNK_SIZE,
      http,
    })
  }

  /// Override the chunk size. Values of zero are ignored.
  pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
    if chunk_size > 0 {
      self.chunk_size = chunk_size;
    }
    self
  }

  fn files_url(&self) -> String {
    format!("{}/storage/buckets/{}/files", self.endpoint, self.bucket_id)
  }

  async fn send_chunk(
    &self,
    chunk: Vec<u8>,
    filename: &str,
    range: Option<(usize, usize, usize)>,
    upload_id: Option<&str>,
  ) -> Result<String, StorageError> {
    let url = self.files_url();

    let part = Part::bytes(chunk)
      .file_name(filename.to_string())
      .mime_str("application/gzip")
      .map_err(|e| StorageError::Request {
        url: url.clone(),
        message: e.to_string(),
      })?;
    let form = Form::new().text("fileId", "unique()").part("file", part);

    let mut request = self
      .http
      .post(&url)
      .header("X-Appwrite-Project", &self.project_id)
      .header("X-Appwrite-Key", &self.api_key)
      .multipart(form);

    if let Some((start, end, total)) = range {
      request = request.header("Content-Range", format!("bytes {}-{}/{}", start, end, total));
    }
    if let Some(id) = upload_id {
      request = request.header("X-Appwrite-ID", id);
    }

    let response = request.send().await.map_err(|e| StorageError::Request {
      url: url.clone(),
      message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(StorageError::Status {
        status: status.as_u16(),
        body,
      });
    }

    let uploaded: UploadedFile = response
      .json()
      .await
      .map_err(|e| StorageError::InvalidResponse { message: e.to_string() })?;

    Ok(uploaded.id)
  }
}

impl BlobStorage for AppwriteStorage {
  async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, StorageError> {
    let total = bytes.len();
    info!(filename = %filename, size = total, "uploading archive");

    if total <= self.chunk_size {
      let id = self.send_chunk(bytes, filename, None, None).await?;
      info!(artifact_id = %id, "upload complete");
      return Ok(id);
    }

    let mut upload_id: Option<String> = None;
    for (index, chunk) in bytes.chunks(self.chunk_size).enumerate() {
      let start = index * self.chunk_size;
      let end = start + chunk.len() - 1;
      debug!(start, end, total, "uploading chunk");
      let id = self
        .send_chunk(chunk.to_vec(), filename, Some((start, end, total)), upload_id.as_deref())
        .await?;
      upload_id.get_or_insert(id);
    }

    let id = upload_id.ok_or_else(|| StorageError::InvalidResponse {
      message: "no chunks were uploaded".to_string(),
    })?;
    info!(artifact_id = %id, "upload complete");
    Ok(id)
  }

  fn download_reference(&self, artifact_id: &str) -> String {
    format!(
      "{}/storage/buckets/{}/files/{}/download?project={}",
      self.endpoint, self.bucket_id, artifact_id, self.project_id
    )
  }
}
