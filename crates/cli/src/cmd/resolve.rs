//! Implementation of the `rbuild resolve` command.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use rbuild_lib::command::derive_command;
use rbuild_lib::profile::{BuildSpec, ProfileSource, resolve_detailed};

use crate::output::{OutputFormat, print_field, print_info, print_json, print_success};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveOutput<'a> {
  profile: &'a str,
  from_defaults: bool,
  spec: &'a BuildSpec,
  command: &'a str,
  warnings: Vec<String>,
}

/// Print the spec a profile resolves to. Never fails on profile problems.
pub fn cmd_resolve(path: &Path, profile: &str, output: OutputFormat) -> Result<()> {
  let resolution = resolve_detailed(path, profile);
  let command = derive_command(&resolution.spec);
  let warnings: Vec<String> = resolution.warnings.iter().map(|w| w.to_string()).collect();

  if output.is_json() {
    return print_json(&ResolveOutput {
      profile,
      from_defaults: resolution.source == ProfileSource::Defaults,
      spec: &resolution.spec,
      command: &command,
      warnings,
    });
  }

  match &resolution.source {
    ProfileSource::Profile { path, name } => print_success(&format!("Profile '{}' from {}", name, path.display())),
    ProfileSource::Defaults => print_info(&format!("Profile '{}' not available, using defaults", profile)),
  }

  let spec = &resolution.spec;
  print_field("Variant", spec.variant.as_str());
  print_field("Output", spec.output_kind.as_str());
  print_field("Command", &command);
  print_field("Distribution", &spec.distribution_channel);
  print_field("Auto-increment", &spec.auto_increment_version.to_string());
  if !spec.environment.is_empty() {
    println!();
    println!("Environment:");
    for (key, value) in &spec.environment {
      println!("  {}={}", key, value);
    }
  }

  Ok(())
}
