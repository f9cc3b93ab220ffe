//! Project packaging.
//!
//! Walks a project tree in lexicographic order, prunes every entry matched by the
//! [`IgnoreSet`], and streams the rest into a gzip-compressed tar inside a private
//! temporary directory. Headers are written in deterministic mode (fixed mtime,
//! zeroed ownership, normalized permissions) so identical trees give identical
//! archives.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, HeaderMode};
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::ignore::IgnoreSet;
use crate::util::hash::{ContentHash, hash_file};
use crate::util::id::timestamp_id;

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("project root {} does not exist", path.display())]
  RootNotFound { path: PathBuf },

  #[error("project root {} is not a directory", path.display())]
  NotADirectory { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to write archive {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

impl PackageError {
  /// True for problems with the project root itself rather than I/O during packaging.
  pub fn is_path_error(&self) -> bool {
    matches!(self, Self::RootNotFound { .. } | Self::NotADirectory { .. })
  }
}

/// A finished archive living in its own temporary directory.
///
/// Dropping the archive removes the directory; [`Archive::cleanup`] does the same
/// and reports failures.
#[derive(Debug)]
pub struct Archive {
  dir: TempDir,
  path: PathBuf,
  id: String,
  size: u64,
  entries: Vec<String>,
  sha256: ContentHash,
}

impl Archive {
  /// Timestamp-based id, also embedded in the file name.
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// File name used when uploading.
  pub fn file_name(&self) -> String {
    self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| format!("project-{}.tar.gz", self.id))
  }

  /// Compressed size in bytes.
  pub fn size(&self) -> u64 {
    self.size
  }

  /// Archived paths in archive order.
  pub fn entries(&self) -> &[String] {
    &self.entries
  }

  pub fn sha256(&self) -> &ContentHash {
    &self.sha256
  }

  pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
    fs::read(&self.path)
  }

  /// Copy the archive out of its temporary directory.
  pub fn copy_to(&self, dest: &Path) -> io::Result<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }
    fs::copy(&self.path, dest)
  }

  /// Remove the archive and its temporary directory.
  pub fn cleanup(self) -> io::Result<()> {
    let dir = self.dir.path().to_path_buf();
    self.dir.close()?;
    debug!(dir = %dir.display(), "removed temporary archive");
    Ok(())
  }

  /// Like [`Archive::cleanup`] but only logs failures.
  pub fn discard(self) {
    let path = self.path.clone();
    if let Err(e) = self.cleanup() {
      warn!(path = %path.display(), error = %e, "failed to remove temporary archive");
    }
  }
}

/// Package `project_root` into a fresh compressed archive.
///
/// # Errors
///
/// - [`PackageError::RootNotFound`] / [`PackageError::NotADirectory`] when the root is unusable
/// - [`PackageError::Read`] when walking or reading project files fails
/// - [`PackageError::Write`] when the archive cannot be written; nothing is left behind
pub fn package(project_root: &Path, ignore: &IgnoreSet) -> Result<Archive, PackageError> {
  let root = validate_root(project_root)?;

  let dir = tempfile::Builder::new()
    .prefix("rbuild-")
    .tempdir()
    .map_err(|e| PackageError::Write {
      path: std::env::temp_dir(),
      source: e,
    })?;

  let id = timestamp_id();
  let path = dir.path().join(format!("project-{}.tar.gz", id));

  let entries = write_archive_or_remove(&root, ignore, &path)?;

  let write_err = |source| PackageError::Write {
    path: path.clone(),
    source,
  };
  let size = fs::metadata(&path).map_err(write_err)?.len();
  let sha256 = hash_file(&path).map_err(write_err)?;

  info!(
    root = %root.display(),
    archive = %path.display(),
    entries = entries.len(),
    size,
    "packaged project"
  );

  Ok(Archive {
    dir,
    path,
    id,
    size,
    entries,
    sha256,
  })
}

fn validate_root(project_root: &Path) -> Result<PathBuf, PackageError> {
  let metadata = match fs::metadata(project_root) {
    Ok(m) => m,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(PackageError::RootNotFound {
        path: project_root.to_path_buf(),
      });
    }
    Err(e) => {
      return Err(PackageError::Read {
        path: project_root.to_path_buf(),
        source: e,
      });
    }
  };

  if !metadata.is_dir() {
    return Err(PackageError::NotADirectory {
      path: project_root.to_path_buf(),
    });
  }

  dunce::canonicalize(project_root).map_err(|e| PackageError::Read {
    path: project_root.to_path_buf(),
    source: e,
  })
}

/// Collect the relative paths that would be archived, in archive order.
pub fn collect_entries(root: &Path, ignore: &IgnoreSet) -> Result<Vec<(PathBuf, String)>, PackageError> {
  let walker = WalkDir::new(root)
    .follow_links(false)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| {
      let Ok(rel) = e.path().strip_prefix(root) else {
        return true;
      };
      if rel.as_os_str().is_empty() {
        return true;
      }
      let is_dir = e.file_type().is_dir();
      let keep = !ignore.is_ignored(rel, is_dir);
      if !keep && is_dir {
        debug!(path = %rel.display(), "pruned directory");
      }
      keep
    });

  let mut entries = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|e| PackageError::Read {
      path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
      source: e.into(),
    })?;

    let file_type = entry.file_type();
    if file_type.is_dir() {
      continue;
    }
    if !file_type.is_file() && !file_type.is_symlink() {
      debug!(path = %entry.path().display(), "skipping special file");
      continue;
    }

    let Ok(rel) = entry.path().strip_prefix(root) else {
      continue;
    };
    let name = rel
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");
    entries.push((entry.path().to_path_buf(), name));
  }

  Ok(entries)
}

/// Write the archive, deleting a partially written `dest` on failure.
fn write_archive_or_remove(root: &Path, ignore: &IgnoreSet, dest: &Path) -> Result<Vec<String>, PackageError> {
  write_archive(root, ignore, dest).inspect_err(|_| match fs::remove_file(dest) {
    Ok(()) => debug!(path = %dest.display(), "removed partial archive"),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => warn!(path = %dest.display(), error = %e, "failed to remove partial archive"),
  })
}

fn write_archive(root: &Path, ignore: &IgnoreSet, dest: &Path) -> Result<Vec<String>, PackageError> {
  let files = collect_entries(root, ignore)?;

  let write_err = |source| PackageError::Write {
    path: dest.to_path_buf(),
    source,
  };

  let file = File::create(dest).map_err(write_err)?;
  let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
  let mut builder = Builder::new(encoder);
  builder.mode(HeaderMode::Deterministic);
  builder.follow_symlinks(false);

  let mut names = Vec::with_capacity(files.len());
  for (abs, name) in files {
    builder.append_path_with_name(&abs, &name).map_err(|e| {
      // Distinguish a vanished/unreadable source file from a failing destination.
      if fs::symlink_metadata(&abs).is_err() || File::open(&abs).is_err() {
        PackageError::Read { path: abs.clone(), source: e }
      } else {
        write_err(e)
      }
    })?;
    debug!(entry = %name, "archived");
    names.push(name);
  }

  let encoder = builder.into_inner().map_err(write_err)?;
  let mut writer = encoder.finish().map_err(write_err)?;
  writer.flush().map_err(write_err)?;

  Ok(names)
}
