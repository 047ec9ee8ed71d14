//! Configure and build task integration tests.

use predicates::prelude::*;

use super::common::{NATIVE, TestEnv};

#[test]
fn config_creates_build_dir_and_links_database() {
  let env = TestEnv::new(NATIVE);

  env
    .cmk_cmd()
    .arg("config")
    .assert()
    .success()
    .stdout(predicate::str::contains("Running:"));

  let build_dir = env.build_dir("build");
  assert!(build_dir.is_dir());
  assert_eq!(
    std::fs::read_link(env.alias()).unwrap(),
    build_dir.join("compile_commands.json")
  );
  assert_eq!(env.steps(), vec!["configure"]);
}

#[test]
fn config_twice_leaves_existing_database_untouched() {
  let env = TestEnv::new(NATIVE);
  env.write_file("compile_commands.json", "{\"dummy\": true}\n");

  env.cmk_cmd().arg("config").assert().success();
  env.cmk_cmd().arg("config").assert().success();

  let alias = env.alias();
  assert!(!alias.symlink_metadata().unwrap().file_type().is_symlink());
  assert_eq!(std::fs::read_to_string(alias).unwrap(), "{\"dummy\": true}\n");
  assert_eq!(env.steps(), vec!["configure", "configure"]);
}

#[test]
fn build_without_config_fails_and_mutates_nothing() {
  let env = TestEnv::new(NATIVE);

  env
    .cmk_cmd()
    .arg("build")
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("build path doesn't exist"));

  assert!(!env.path(".cache").exists());
  assert!(env.alias().symlink_metadata().is_err());
  assert!(env.steps().is_empty());
}

#[test]
fn build_with_auto_config_configures_first() {
  let env = TestEnv::new(NATIVE);

  env.cmk_cmd().args(["build", "--auto-config"]).assert().success();

  assert_eq!(env.steps(), vec!["configure", "build"]);
  assert!(env.build_dir("build").is_dir());
}

#[test]
fn install_without_config_fails() {
  let env = TestEnv::new(NATIVE);

  env
    .cmk_cmd()
    .arg("install")
    .assert()
    .failure()
    .stderr(predicate::str::contains("build path doesn't exist"));
  assert!(env.steps().is_empty());
}

#[test]
fn failing_tool_aborts_with_its_exit_code() {
  let env = TestEnv::new(
    r#"
project = "demo"

[profiles.default]
configure = ["/bin/sh", "-c", "exit 3"]
target = { kind = "execute", binary = "bin/app" }
"#,
  );

  env
    .cmk_cmd()
    .arg("config")
    .assert()
    .failure()
    .code(3)
    .stderr(predicate::str::contains("configure step failed"));
  assert!(env.alias().symlink_metadata().is_err());
}

#[test]
fn explicit_config_flag_overrides_project_file() {
  let env = TestEnv::new("this is = = not toml");
  let alt = env.path("alt.toml");
  std::fs::write(&alt, NATIVE).unwrap();

  env.cmk_cmd().arg("--config").arg(&alt).arg("config").assert().success();
  assert_eq!(env.steps(), vec!["configure"]);
}

#[test]
fn invalid_config_is_reported() {
  let env = TestEnv::new("this is = = not toml");

  env
    .cmk_cmd()
    .arg("config")
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to parse config file"));
}
