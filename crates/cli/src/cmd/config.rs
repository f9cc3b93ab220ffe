//! Implementation of the `rbuild config` command.
//!
//! Read-only: prints the configuration the pipeline would use, secrets masked.

use anyhow::{Context, Result};

use rbuild_lib::config::Config;
use rbuild_lib::platform::paths::config_path;

use crate::output::{OutputFormat, print_json, print_field, print_success};

pub fn cmd_config(output: OutputFormat) -> Result<()> {
  let path = config_path();
  let config = Config::load_from(&path).context("Failed to load configuration")?.redacted();

  if output.is_json() {
    return print_json(&serde_json::json!({ "path": path, "config": config }));
  }

  print_success(&format!("Configuration at {}", path.display()));
  print_field("Endpoint", &config.endpoint);
  print_field("Project", &config.project_id);
  print_field("API key", &config.api_key);
  print_field("Bucket", &config.bucket_id);
  print_field("CI token", &config.ci_token);
  print_field("Repository", &config.repo);

  Ok(())
}
