//! Implementation of the `rbuild build` command.
//!
//! Runs the full pipeline: resolve the profile, package the project, upload the
//! archive, and dispatch the CI event.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use rbuild_lib::config::Config;
use rbuild_lib::dispatch::DispatchPipeline;

use crate::output::{
  OutputFormat, describe_archive, format_elapsed, print_field, print_info, print_json, print_step, print_success,
};

pub fn cmd_build(path: &Path, profile: &str, ignore: &[String], output: OutputFormat) -> Result<()> {
  let config = Config::load().context("Build failed before starting")?;
  let pipeline = DispatchPipeline::from_config(&config).context("Build failed before starting")?;

  if !output.is_json() {
    let shown = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    print_step(&format!("Building '{}' from {}", profile, shown.display()));
  }

  let start = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt.block_on(pipeline.run(path, profile, ignore)).map_err(|e| {
    let phase = e.phase();
    anyhow::Error::new(e).context(format!("Build failed during {}", phase))
  })?;

  if output.is_json() {
    return print_json(&outcome);
  }

  print_success("Build dispatched");
  print_field("Build ID", &outcome.build_id);
  print_field("Artifact", &outcome.artifact_id);
  print_field("Variant", outcome.spec.variant.as_str());
  print_field("Output", outcome.spec.output_kind.as_str());
  print_field("Command", &outcome.command);
  print_field("Archive", &describe_archive(outcome.archive_size, outcome.archive_entries));
  print_field("Elapsed", &format_elapsed(start.elapsed()));
  println!();
  print_info(&format!("Follow progress at {}", outcome.monitoring_url));

  Ok(())
}
