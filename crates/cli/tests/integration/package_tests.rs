//! Package command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn default_patterns_prune_build_output() {
  let env = TestEnv::with_project();

  env
    .rbuild_cmd()
    .arg("package")
    .arg(&env.project)
    .arg("--list")
    .assert()
    .success()
    .stdout(predicate::str::contains("Using default ignore patterns"))
    .stdout(predicate::str::contains("src/screens/Home.tsx"))
    .stdout(predicate::str::contains("App.tsx"))
    .stdout(predicate::str::contains("node_modules").not())
    .stdout(predicate::str::contains("app.apk").not())
    .stdout(predicate::str::contains("metro.log").not());
}

#[test]
fn project_ignore_file_replaces_defaults() {
  let env = TestEnv::with_project();
  env.write_file(".easignore", "# only skip dependencies\nnode_modules/\n");

  env
    .rbuild_cmd()
    .arg("package")
    .arg(&env.project)
    .arg("--list")
    .assert()
    .success()
    .stdout(predicate::str::contains(".easignore"))
    .stdout(predicate::str::contains("metro.log"))
    .stdout(predicate::str::contains("android/app/build/outputs/app.apk"))
    .stdout(predicate::str::contains("node_modules").not());
}

#[test]
fn caller_patterns_are_appended() {
  let env = TestEnv::with_project();

  env
    .rbuild_cmd()
    .arg("package")
    .arg(&env.project)
    .args(["--list", "-i", "src/"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Home.tsx").not())
    .stdout(predicate::str::contains("App.tsx"));
}

#[test]
fn writes_archive_copy() {
  let env = TestEnv::with_project();
  let dest = env.path("out/app.tar.gz");

  env
    .rbuild_cmd()
    .arg("package")
    .arg(&env.project)
    .arg("-o")
    .arg(&dest)
    .assert()
    .success()
    .stdout(predicate::str::contains("Written to"));

  let bytes = std::fs::read(&dest).unwrap();
  assert_eq!(&bytes[..2], &[0x1f, 0x8b], "expected gzip magic");
}

#[test]
fn packaging_leaves_project_untouched() {
  let env = TestEnv::with_project();
  let before: Vec<_> = std::fs::read_dir(&env.project).unwrap().map(|e| e.unwrap().file_name()).collect();

  env.rbuild_cmd().arg("package").arg(&env.project).assert().success();

  let after: Vec<_> = std::fs::read_dir(&env.project).unwrap().map(|e| e.unwrap().file_name()).collect();
  assert_eq!(before.len(), after.len());
}

#[test]
fn missing_root_fails() {
  let env = TestEnv::new();

  env
    .rbuild_cmd()
    .arg("package")
    .arg(env.path("does-not-exist"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn fully_excluded_project_warns() {
  let env = TestEnv::new();
  env.write_file("App.tsx", "export default App");
  env.write_file(".easignore", "*\n");

  env
    .rbuild_cmd()
    .arg("package")
    .arg(&env.project)
    .assert()
    .success()
    .stdout(predicate::str::contains("Files: 0"))
    .stderr(predicate::str::contains("Every file was excluded"));
}
