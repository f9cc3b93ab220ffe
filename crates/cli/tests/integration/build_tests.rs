//! Build command integration tests against mock storage and CI servers.

use mockito::Matcher;
use predicates::prelude::*;
use serde_json::{Value, json};

use super::common::TestEnv;

#[test]
fn build_uploads_and_dispatches() {
  let mut server = mockito::Server::new();
  let env = TestEnv::with_project();
  env.write_config(&server.url());
  env.write_file("eas.json", r#"{"build": {"production": {"android": {"buildType": "aab"}}}}"#);

  let upload = server
    .mock("POST", "/storage/buckets/builds/files")
    .match_header("x-appwrite-project", "proj")
    .match_header("x-appwrite-key", "secret-api-key")
    .with_status(201)
    .with_body(r#"{"$id": "file-42"}"#)
    .create();
  let dispatch = server
    .mock("POST", "/repos/acme/builds/dispatches")
    .match_header("authorization", "Bearer ghp_0123456789")
    .match_body(Matcher::PartialJson(json!({
      "event_type": "android-build",
      "client_payload": {
        "archiveUrl": format!("{}/storage/buckets/builds/files/file-42/download?project=proj", server.url()),
        "platform": "android",
        "variant": "release",
        "outputKind": "aab",
        "command": "bundleRelease"
      }
    })))
    .with_status(204)
    .create();

  let output = env
    .rbuild_cmd_with_api(&server.url())
    .arg("build")
    .arg(&env.project)
    .args(["--output", "json"])
    .output()
    .unwrap();

  assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
  let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(outcome["artifactId"], "file-42");
  assert_eq!(outcome["command"], "bundleRelease");
  assert_eq!(outcome["monitoringUrl"], "https://github.com/acme/builds/actions");
  assert!(outcome["buildId"].as_str().unwrap().parse::<u64>().is_ok());

  upload.assert();
  dispatch.assert();
}

#[test]
fn text_output_points_at_monitoring_url() {
  let mut server = mockito::Server::new();
  let env = TestEnv::with_project();
  env.write_config(&server.url());

  server
    .mock("POST", "/storage/buckets/builds/files")
    .with_status(201)
    .with_body(r#"{"$id": "file-1"}"#)
    .create();
  server
    .mock("POST", "/repos/acme/builds/dispatches")
    .with_status(204)
    .create();

  env
    .rbuild_cmd_with_api(&server.url())
    .arg("build")
    .arg(&env.project)
    .assert()
    .success()
    .stdout(predicate::str::contains("Build dispatched"))
    .stdout(predicate::str::contains("assembleRelease"))
    .stdout(predicate::str::contains("https://github.com/acme/builds/actions"));
}

#[test]
fn upload_failure_names_the_phase() {
  let mut server = mockito::Server::new();
  let env = TestEnv::with_project();
  env.write_config(&server.url());

  server
    .mock("POST", "/storage/buckets/builds/files")
    .with_status(500)
    .with_body("storage unavailable")
    .create();
  let dispatch = server
    .mock("POST", "/repos/acme/builds/dispatches")
    .expect(0)
    .create();

  env
    .rbuild_cmd_with_api(&server.url())
    .arg("build")
    .arg(&env.project)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Build failed during uploading"))
    .stderr(predicate::str::contains("storage unavailable"));

  dispatch.assert();
}

#[test]
fn dispatch_failure_names_the_phase() {
  let mut server = mockito::Server::new();
  let env = TestEnv::with_project();
  env.write_config(&server.url());

  let upload = server
    .mock("POST", "/storage/buckets/builds/files")
    .with_status(201)
    .with_body(r#"{"$id": "file-7"}"#)
    .create();
  server
    .mock("POST", "/repos/acme/builds/dispatches")
    .with_status(403)
    .with_body(r#"{"message": "Resource not accessible by integration"}"#)
    .create();

  env
    .rbuild_cmd_with_api(&server.url())
    .arg("build")
    .arg(&env.project)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Build failed during dispatching"))
    .stderr(predicate::str::contains("403"));

  upload.assert();
}

#[test]
fn missing_root_fails_before_network() {
  let mut server = mockito::Server::new();
  let env = TestEnv::new();
  env.write_config(&server.url());

  let upload = server
    .mock("POST", "/storage/buckets/builds/files")
    .expect(0)
    .create();

  env
    .rbuild_cmd_with_api(&server.url())
    .arg("build")
    .arg(env.path("missing"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Build failed during packaging"));

  upload.assert();
}
