//! Implementation of the `rbuild status` command.
//!
//! Build progress lives in the CI system; this only points there.

use anyhow::{Context, Result};

use rbuild_lib::config::Config;
use rbuild_lib::dispatch::status;

use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_status(build_id: &str, output: OutputFormat) -> Result<()> {
  let config = Config::load().context("Failed to load configuration")?;
  let report = status(&config, build_id);

  if output.is_json() {
    return print_json(&report);
  }

  print_info(&format!("Build {}: follow progress at {}", report.build_id, report.monitoring_url));
  Ok(())
}
