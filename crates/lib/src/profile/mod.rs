//! Build profile resolution.
//!
//! Reads the project's `eas.json`, picks the requested entry of its `build` table
//! (following `extends` chains), and maps it onto a [`BuildSpec`].
//!
//! Resolution never fails. A missing document, an unparseable document, an
//! unknown profile, or a malformed field each produce a [`ProfileError`] that is
//! logged as a warning and the affected part falls back to its default.

mod types;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::consts::PROFILE_FILENAME;

pub use types::{AndroidProfile, BuildProfile, BuildSpec, DEFAULT_DISTRIBUTION, Lenient, OutputKind, Variant, truthy};

/// Problems found while resolving a profile. None of them abort resolution.
#[derive(Debug, Error)]
pub enum ProfileError {
  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("{} has no `build` table", path.display())]
  MissingBuildTable { path: PathBuf },

  #[error("profile `{name}` not found in {}", path.display())]
  ProfileNotFound { name: String, path: PathBuf },

  #[error("profile `{name}` is not an object")]
  InvalidProfile { name: String },

  #[error("profile `{name}` extends unknown profile `{parent}`")]
  UnknownParent { name: String, parent: String },

  #[error("profile inheritance cycle: {}", chain.join(" -> "))]
  ExtendsCycle { chain: Vec<String> },

  #[error("unrecognized android.buildType `{value}` (expected `apk`, `aab` or `app-bundle`)")]
  UnknownBuildType { value: String },

  #[error("field `{field}` has an unexpected value: {value}")]
  InvalidField { field: &'static str, value: Value },
}

/// Where the resolved spec came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
  /// The named profile was found and mapped.
  Profile { path: PathBuf, name: String },
  /// Defaults were used as a whole.
  Defaults,
}

/// Outcome of [`resolve_detailed`].
#[derive(Debug)]
pub struct Resolution {
  pub spec: BuildSpec,
  pub source: ProfileSource,
  /// Every degraded condition, in the order it was met.
  pub warnings: Vec<ProfileError>,
}

/// Resolve `profile_name` for the project at `project_root`.
pub fn resolve(project_root: &Path, profile_name: &str) -> BuildSpec {
  resolve_detailed(project_root, profile_name).spec
}

/// Like [`resolve`] but also reports where the spec came from and what was degraded.
pub fn resolve_detailed(project_root: &Path, profile_name: &str) -> Resolution {
  let path = project_root.join(PROFILE_FILENAME);
  let mut warnings = Vec::new();

  let profile = load_profile(&path, profile_name, &mut warnings);
  let (spec, source) = match profile {
    Some(profile) => (
      map_profile(&profile, &mut warnings),
      ProfileSource::Profile {
        path,
        name: profile_name.to_string(),
      },
    ),
    None => (BuildSpec::default(), ProfileSource::Defaults),
  };

  for warning in &warnings {
    warn!(profile = %profile_name, "{}", warning);
  }

  Resolution { spec, source, warnings }
}

fn load_profile(path: &Path, name: &str, warnings: &mut Vec<ProfileError>) -> Option<BuildProfile> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      info!(path = %path.display(), "no build profile document, using defaults");
      return None;
    }
    Err(e) => {
      warnings.push(ProfileError::Read {
        path: path.to_path_buf(),
        source: e,
      });
      return None;
    }
  };

  let document: Value = match serde_json::from_str(&content) {
    Ok(document) => document,
    Err(e) => {
      warnings.push(ProfileError::Parse {
        path: path.to_path_buf(),
        source: e,
      });
      return None;
    }
  };

  let Some(build) = document.get("build").and_then(Value::as_object) else {
    warnings.push(ProfileError::MissingBuildTable {
      path: path.to_path_buf(),
    });
    return None;
  };

  if !build.contains_key(name) {
    warnings.push(ProfileError::ProfileNotFound {
      name: name.to_string(),
      path: path.to_path_buf(),
    });
    return None;
  }

  lookup_chain(build, name, warnings)
}

fn parse_entry(build: &Map<String, Value>, name: &str, warnings: &mut Vec<ProfileError>) -> Option<BuildProfile> {
  let value = build.get(name)?;
  match serde_json::from_value::<BuildProfile>(value.clone()) {
    Ok(profile) => Some(profile),
    Err(_) => {
      warnings.push(ProfileError::InvalidProfile { name: name.to_string() });
      None
    }
  }
}

/// Load `name` and fold in every profile it extends, nearest first.
fn lookup_chain(build: &Map<String, Value>, name: &str, warnings: &mut Vec<ProfileError>) -> Option<BuildProfile> {
  let mut profile = parse_entry(build, name, warnings)?;
  let mut chain = vec![name.to_string()];

  loop {
    match profile.extends.take() {
      None => break,
      Some(Lenient::Invalid(value)) => {
        warnings.push(ProfileError::InvalidField {
          field: "extends",
          value,
        });
        break;
      }
      Some(Lenient::Valid(parent)) => {
        if chain.contains(&parent) {
          chain.push(parent);
          warnings.push(ProfileError::ExtendsCycle { chain });
          break;
        }
        if !build.contains_key(&parent) {
          warnings.push(ProfileError::UnknownParent {
            name: chain.last().cloned().unwrap_or_default(),
            parent,
          });
          break;
        }
        let Some(base) = parse_entry(build, &parent, warnings) else {
          break;
        };
        chain.push(parent);
        profile = profile.merged_over(base);
      }
    }
  }

  Some(profile)
}

/// Map a profile onto a [`BuildSpec`].
///
/// Steps run in a fixed order so partial profiles resolve the same way every time:
/// variant, distribution, output kind, explicit command, environment, auto-increment.
pub fn map_profile(profile: &BuildProfile, warnings: &mut Vec<ProfileError>) -> BuildSpec {
  let mut spec = BuildSpec::default();

  // 1. variant
  match &profile.development_client {
    Some(Lenient::Valid(true)) => spec.variant = Variant::Debug,
    Some(Lenient::Valid(false)) | None => {}
    Some(Lenient::Invalid(value)) => warnings.push(ProfileError::InvalidField {
      field: "developmentClient",
      value: value.clone(),
    }),
  }

  // 2. distribution
  match &profile.distribution {
    Some(Lenient::Valid(channel)) if !channel.trim().is_empty() => spec.distribution_channel = channel.clone(),
    Some(Lenient::Valid(_)) | None => {}
    Some(Lenient::Invalid(value)) => warnings.push(ProfileError::InvalidField {
      field: "distribution",
      value: value.clone(),
    }),
  }

  let android = match &profile.android {
    Some(Lenient::Valid(android)) => Some(android),
    Some(Lenient::Invalid(value)) => {
      warnings.push(ProfileError::InvalidField {
        field: "android",
        value: value.clone(),
      });
      None
    }
    None => None,
  };

  // 3. output kind
  match android.and_then(|a| a.build_type.as_ref()) {
    Some(Lenient::Valid(build_type)) => match OutputKind::from_build_type(build_type) {
      Some(kind) => spec.output_kind = kind,
      None => warnings.push(ProfileError::UnknownBuildType {
        value: build_type.clone(),
      }),
    },
    Some(Lenient::Invalid(value)) => warnings.push(ProfileError::InvalidField {
      field: "android.buildType",
      value: value.clone(),
    }),
    None => {}
  }

  // 4. explicit command; output kind keeps reflecting the declared build type
  match android.and_then(|a| a.gradle_command.as_ref()) {
    Some(Lenient::Valid(command)) if !command.trim().is_empty() => spec.explicit_command = Some(command.clone()),
    Some(Lenient::Valid(command)) => warnings.push(ProfileError::InvalidField {
      field: "android.gradleCommand",
      value: Value::String(command.clone()),
    }),
    Some(Lenient::Invalid(value)) => warnings.push(ProfileError::InvalidField {
      field: "android.gradleCommand",
      value: value.clone(),
    }),
    None => {}
  }

  // 5. environment, copied without interpretation
  match &profile.env {
    Some(Lenient::Valid(env)) => {
      spec.environment = env
        .iter()
        .map(|(key, value)| {
          let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
          };
          (key.clone(), rendered)
        })
        .collect();
    }
    Some(Lenient::Invalid(value)) => warnings.push(ProfileError::InvalidField {
      field: "env",
      value: value.clone(),
    }),
    None => {}
  }

  // 6. auto-increment
  if let Some(value) = &profile.auto_increment {
    spec.auto_increment_version = truthy(value);
  }

  spec
}
