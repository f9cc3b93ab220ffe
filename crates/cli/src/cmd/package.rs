//! Implementation of the `rbuild package` command.
//!
//! Packages the project exactly as `build` would, without touching the network.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use rbuild_lib::ignore::{self, IgnoreSource};
use rbuild_lib::package::package;

use crate::output::{format_size, print_entries, print_field, print_info, print_success, print_warning, short_digest};

pub fn cmd_package(path: &Path, extra: &[String], out: Option<&Path>, list: bool) -> Result<()> {
  let ignore_set = ignore::resolve(path, extra);
  debug!(patterns = ?ignore_set.patterns(), "effective ignore patterns");
  match ignore_set.source() {
    IgnoreSource::ProjectFile(file) => print_info(&format!("Using ignore patterns from {}", file.display())),
    IgnoreSource::Defaults => print_info("Using default ignore patterns"),
  }

  let archive = package(path, &ignore_set).context("Packaging failed")?;

  print_success(&format!("Packaged {}", archive.file_name()));
  print_field("Files", &archive.entries().len().to_string());
  print_field("Size", &format_size(archive.size()));
  print_field("SHA-256", short_digest(&archive.sha256().0));
  if archive.entries().is_empty() {
    print_warning("Every file was excluded; check the ignore patterns");
  }

  if list {
    println!();
    print_entries(archive.entries());
  }

  if let Some(dest) = out {
    archive
      .copy_to(dest)
      .with_context(|| format!("Failed to copy archive to {}", dest.display()))?;
    print_field("Written to", &dest.display().to_string());
  }

  archive.cleanup().context("Failed to remove temporary archive")?;
  Ok(())
}
