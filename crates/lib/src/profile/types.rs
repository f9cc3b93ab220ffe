use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A field that keeps its raw JSON when it does not have the expected shape.
///
/// Profiles are hand-written; a wrong type in one field must not discard the rest
/// of the document, so each field is decoded on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Lenient<T> {
  Valid(T),
  Invalid(Value),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match T::deserialize(value.clone()) {
      Ok(v) => Lenient::Valid(v),
      Err(_) => Lenient::Invalid(value),
    })
  }
}

/// One entry of the profile document's `build` table. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProfile {
  /// Name of another profile whose fields this one inherits.
  pub extends: Option<Lenient<String>>,
  pub development_client: Option<Lenient<bool>>,
  pub distribution: Option<Lenient<String>>,
  pub android: Option<Lenient<AndroidProfile>>,
  pub env: Option<Lenient<BTreeMap<String, Value>>>,
  /// Any JSON value; interpreted by truthiness.
  pub auto_increment: Option<Value>,
}

/// The `android` block of a profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidProfile {
  pub build_type: Option<Lenient<String>>,
  pub gradle_command: Option<Lenient<String>>,
}

impl BuildProfile {
  /// Layer `self` over `base`: fields set here win, `env` and `android` merge key by key.
  pub fn merged_over(self, base: BuildProfile) -> BuildProfile {
    let android = match (self.android, base.android) {
      (Some(Lenient::Valid(child)), Some(Lenient::Valid(parent))) => Some(Lenient::Valid(AndroidProfile {
        build_type: child.build_type.or(parent.build_type),
        gradle_command: child.gradle_command.or(parent.gradle_command),
      })),
      (child, parent) => child.or(parent),
    };

    let env = match (self.env, base.env) {
      (Some(Lenient::Valid(child)), Some(Lenient::Valid(mut parent))) => {
        parent.extend(child);
        Some(Lenient::Valid(parent))
      }
      (child, parent) => child.or(parent),
    };

    BuildProfile {
      extends: base.extends,
      development_client: self.development_client.or(base.development_client),
      distribution: self.distribution.or(base.distribution),
      android,
      env,
      auto_increment: self.auto_increment.or(base.auto_increment),
    }
  }
}

/// Build variant passed to the build tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
  Debug,
  #[default]
  Release,
}

impl Variant {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "debug",
      Self::Release => "release",
    }
  }
}

impl fmt::Display for Variant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Kind of artifact the build produces.
///
/// Serialized with the profile's own vocabulary: `apk` for an installable package,
/// `aab` for a store bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
  #[default]
  #[serde(rename = "apk")]
  Package,
  #[serde(rename = "aab")]
  Bundle,
}

impl OutputKind {
  /// Recognize a profile `buildType` value.
  pub fn from_build_type(value: &str) -> Option<Self> {
    match value {
      "apk" => Some(Self::Package),
      "aab" | "app-bundle" => Some(Self::Bundle),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Package => "apk",
      Self::Bundle => "aab",
    }
  }
}

impl fmt::Display for OutputKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

pub const DEFAULT_DISTRIBUTION: &str = "internal";

/// Normalized build parameters. Every field is populated; only the explicit command is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
  pub variant: Variant,
  pub output_kind: OutputKind,
  /// Verbatim build command. When set it replaces derivation entirely.
  pub explicit_command: Option<String>,
  pub environment: BTreeMap<String, String>,
  pub auto_increment_version: bool,
  pub distribution_channel: String,
}

impl Default for BuildSpec {
  fn default() -> Self {
    Self {
      variant: Variant::Release,
      output_kind: OutputKind::Package,
      explicit_command: None,
      environment: BTreeMap::new(),
      auto_increment_version: false,
      distribution_channel: DEFAULT_DISTRIBUTION.to_string(),
    }
  }
}

/// JavaScript-style truthiness of a JSON value.
pub fn truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}
