//! Clean task integration tests.

use predicates::prelude::*;

use super::common::{NATIVE, TestEnv, WEB};

#[test]
fn clean_fresh_workspace_reports_absent() {
  let env = TestEnv::new(NATIVE);

  env
    .cmk_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("absent. Nothing to do."));
}

#[test]
fn clean_removes_build_dir_and_alias_but_keeps_install() {
  let env = TestEnv::new(NATIVE);
  env.cmk_cmd().arg("run").assert().code(7);

  env
    .cmk_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed"));

  assert!(!env.build_dir("build").exists());
  assert!(env.alias().symlink_metadata().is_err());
  assert!(env.build_dir("install").is_dir());
}

#[test]
fn clean_all_removes_workspace() {
  let env = TestEnv::new(NATIVE);
  env.cmk_cmd().arg("run").assert().code(7);

  env.cmk_cmd().arg("clean-all").assert().success();

  assert!(!env.workspace().exists());
  assert!(env.alias().symlink_metadata().is_err());
}

#[test]
fn clean_keeps_user_owned_database() {
  let env = TestEnv::new(NATIVE);
  env.write_file("compile_commands.json", "[]");

  env
    .cmk_cmd()
    .arg("clean")
    .assert()
    .success()
    .stderr(predicate::str::contains("Kept"));

  assert_eq!(std::fs::read_to_string(env.alias()).unwrap(), "[]");
}

#[test]
fn clean_web_leaves_native_build_alone() {
  let config = format!("{}\n{}", WEB, NATIVE.replace("project = \"demo\"\n", ""));
  let env = TestEnv::new(&config);
  env.cmk_cmd().arg("config").assert().success();
  env.cmk_cmd().arg("config-web").assert().success();

  env.cmk_cmd().arg("clean-web").assert().success();

  assert!(!env.build_dir("build-site").exists());
  assert!(env.build_dir("build").is_dir());
  assert!(env.alias().symlink_metadata().unwrap().file_type().is_symlink());
}

#[test]
fn clean_json_output_lists_entries() {
  let env = TestEnv::new(NATIVE);

  let output = env.cmk_cmd().args(["-o", "json", "clean"]).output().unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let entries = json["entries"].as_array().unwrap();
  assert!(entries.iter().all(|e| e["outcome"] == "absent"));
}
