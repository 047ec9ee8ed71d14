//! Run task integration tests.

use predicates::prelude::*;

use super::common::{NATIVE, TestEnv, WEB};

#[test]
fn run_native_forwards_artifact_exit_status() {
  let env = TestEnv::new(NATIVE);

  env
    .cmk_cmd()
    .arg("run")
    .assert()
    .code(7)
    .stdout(predicate::str::contains("hello from app"));

  assert_eq!(env.steps(), vec!["configure", "build", "install"]);
  assert!(env.build_dir("install").join("bin/app").is_file());
}

#[test]
fn run_native_without_artifact_fails() {
  let env = TestEnv::new(
    r#"
project = "demo"

[profiles.default]
configure = ["/bin/sh", "-c", "true"]
build = ["/bin/sh", "-c", "true"]
install = ["/bin/sh", "-c", "true"]
target = { kind = "execute", binary = "bin/app" }
"#,
  );

  env
    .cmk_cmd()
    .arg("run")
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("expected artifact not found"));
}

#[test]
fn run_web_retries_once_then_fails_without_serving() {
  let env = TestEnv::new(WEB);

  env
    .cmk_cmd()
    .arg("run-web")
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("expected artifact not found"));

  assert_eq!(env.steps(), vec!["configure", "build", "configure", "build"]);
  assert!(!env.path("served").exists());
}

#[test]
fn run_web_serves_build_dir() {
  let env = TestEnv::new(WEB);
  env.write_file("emit-entry", "");

  env
    .cmk_cmd()
    .arg("run-web")
    .assert()
    .success()
    .stdout(predicate::str::contains("http://localhost:8123/"));

  assert_eq!(env.steps(), vec!["configure", "build"]);
  let served = std::fs::read_to_string(env.path("served")).unwrap();
  let build_dir = dunce::canonicalize(env.build_dir("build-site")).unwrap();
  assert_eq!(served.trim(), format!("8123 {}", build_dir.display()));
}

#[test]
fn config_web_uses_configured_web_profile() {
  let env = TestEnv::new(WEB);

  env.cmk_cmd().arg("config-web").assert().success();

  assert!(env.build_dir("build-site").is_dir());
  assert_eq!(env.steps(), vec!["configure"]);
}
