//! Resolve command integration tests.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

fn resolve_json(env: &TestEnv, profile: &str) -> Value {
  let output = env
    .rbuild_cmd()
    .arg("resolve")
    .arg(&env.project)
    .args(["--profile", profile, "--output", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());
  serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn development_client_resolves_to_debug() {
  let env = TestEnv::new();
  env.write_file("eas.json", r#"{"build": {"development": {"developmentClient": true}}}"#);

  let out = resolve_json(&env, "development");
  assert_eq!(out["spec"]["variant"], "debug");
  assert_eq!(out["command"], "assembleDebug");
  assert_eq!(out["fromDefaults"], false);
}

#[test]
fn aab_build_type_resolves_to_bundle() {
  let env = TestEnv::new();
  env.write_file("eas.json", r#"{"build": {"production": {"android": {"buildType": "aab"}}}}"#);

  let out = resolve_json(&env, "production");
  assert_eq!(out["spec"]["outputKind"], "aab");
  assert_eq!(out["command"], "bundleRelease");
}

#[test]
fn explicit_gradle_command_wins() {
  let env = TestEnv::new();
  env.write_file(
    "eas.json",
    r#"{"build": {"ci": {"android": {"gradleCommand": "customTask", "buildType": "aab"}}}}"#,
  );

  let out = resolve_json(&env, "ci");
  assert_eq!(out["command"], "customTask");
  assert_eq!(out["spec"]["outputKind"], "aab");
}

#[test]
fn missing_profile_falls_back_to_defaults() {
  let env = TestEnv::new();
  env.write_file("eas.json", r#"{"build": {"production": {}}}"#);

  let out = resolve_json(&env, "staging");
  assert_eq!(out["fromDefaults"], true);
  assert_eq!(out["command"], "assembleRelease");
  assert_eq!(out["spec"]["distributionChannel"], "internal");
  assert!(!out["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn malformed_document_warns_and_succeeds() {
  let env = TestEnv::new();
  env.write_file("eas.json", "{ not json");

  env
    .rbuild_cmd()
    .arg("resolve")
    .arg(&env.project)
    .assert()
    .success()
    .stdout(predicate::str::contains("using defaults"))
    .stderr(predicate::str::contains("eas.json"));
}

#[test]
fn profile_warning_is_reported_once() {
  let env = TestEnv::new();
  env.write_file("eas.json", "{ not json");

  let output = env.rbuild_cmd().arg("resolve").arg(&env.project).output().unwrap();
  assert!(output.status.success());

  let stderr = String::from_utf8_lossy(&output.stderr);
  let mentions = stderr.lines().filter(|line| line.contains("eas.json")).count();
  assert_eq!(mentions, 1, "stderr was:\n{}", stderr);
}

#[test]
fn text_output_lists_environment() {
  let env = TestEnv::new();
  env.write_file(
    "eas.json",
    r#"{"build": {"production": {"env": {"API_URL": "https://api.example.com"}}}}"#,
  );

  env
    .rbuild_cmd()
    .arg("resolve")
    .arg(&env.project)
    .assert()
    .success()
    .stdout(predicate::str::contains("API_URL=https://api.example.com"));
}
