//! Implementation of the `rbuild init` command.

use anyhow::{Context, Result};

use rbuild_lib::config::Config;
use rbuild_lib::platform::paths::config_path;

use crate::output::{print_info, print_success};

/// Validate and write the configuration document.
///
/// # Errors
///
/// Fails on blank fields, a malformed repository, or an existing document
/// without `force`.
pub fn cmd_init(config: Config, force: bool) -> Result<()> {
  let path = config_path();
  let config = config.validated(&path).context("Invalid configuration")?;

  config
    .save_to(&path, force)
    .context("Failed to write configuration (use --force to replace it)")?;

  print_success(&format!("Wrote configuration to {}", path.display()));
  print_info(&format!("Builds will be dispatched to {}", config.repo));
  Ok(())
}
