//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets a project directory and its own configuration document path.
pub struct TestEnv {
  pub temp: TempDir,
  pub project: PathBuf,
  pub config_path: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("app");
    std::fs::create_dir_all(&project).unwrap();
    let project = dunce::canonicalize(&project).unwrap_or(project);
    let config_path = temp.path().join("config").join("config.json");
    Self {
      temp,
      project,
      config_path,
    }
  }

  /// Environment with a small Expo-style project already in place.
  pub fn with_project() -> Self {
    let env = Self::new();
    env.write_file("package.json", r#"{"name": "app"}"#);
    env.write_file("App.tsx", "export default function App() {}");
    env.write_file("src/screens/Home.tsx", "export const Home = () => null;");
    env.write_file("node_modules/react/index.js", "module.exports = {};");
    env.write_file("android/app/build/outputs/app.apk", "binary");
    env.write_file("metro.log", "log");
    env
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.project.join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Write a complete configuration document with storage at `endpoint`.
  pub fn write_config(&self, endpoint: &str) {
    std::fs::create_dir_all(self.config_path.parent().unwrap()).unwrap();
    let doc = serde_json::json!({
      "endpoint": endpoint,
      "projectId": "proj",
      "apiKey": "secret-api-key",
      "bucketId": "builds",
      "ciToken": "ghp_0123456789",
      "repo": "acme/builds"
    });
    std::fs::write(&self.config_path, doc.to_string()).unwrap();
  }

  /// Path inside the temp directory but outside the project.
  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Get a pre-configured Command for the rbuild binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `RBUILD_CONFIG`: the per-test configuration document
  /// - `RUST_LOG`: removed so `-v` decides verbosity
  pub fn rbuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("rbuild");
    cmd.env("RBUILD_CONFIG", &self.config_path);
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// Like [`TestEnv::rbuild_cmd`], with the CI API at `api_base`.
  pub fn rbuild_cmd_with_api(&self, api_base: &str) -> Command {
    let mut cmd = self.rbuild_cmd();
    cmd.env("GITHUB_API_URL", api_base);
    cmd
  }
}
