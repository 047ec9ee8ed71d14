//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Native profile: configure emits a compile database, install produces a
/// `bin/app` that exits with 7. Every step appends its name to `steps.log`.
pub const NATIVE: &str = r##"
project = "demo"

[profiles.default]
configure = ["/bin/sh", "-c", 'echo configure >> "{source_dir}/steps.log" && echo "[]" > "{build_dir}/compile_commands.json"']
build = ["/bin/sh", "-c", 'echo build >> "{source_dir}/steps.log"']
install = ["/bin/sh", "-c", 'echo install >> "{source_dir}/steps.log" && mkdir -p "{install_dir}/bin" && printf "#!/bin/sh\necho hello from app\nexit 7\n" > "{install_dir}/bin/app" && chmod +x "{install_dir}/bin/app"']
target = { kind = "execute", binary = "bin/app" }
"##;

/// Web profile whose build only produces `index.html` when `emit-entry`
/// exists in the source tree. Serving records itself in `served`.
pub const WEB: &str = r##"
project = "demo"
web_profile = "site"

[profiles.site]
configure = ["/bin/sh", "-c", 'echo configure >> "{source_dir}/steps.log"']
build = ["/bin/sh", "-c", 'echo build >> "{source_dir}/steps.log" && if [ -f "{source_dir}/emit-entry" ]; then echo "<html>" > "{build_dir}/index.html"; fi']
target = { kind = "serve", entry = "index.html", port = 8123, command = ["/bin/sh", "-c", 'echo "{port} $(pwd -P)" > "{source_dir}/served"'] }
"##;

/// Isolated project directory with its own `cmk.toml`.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new(config: &str) -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("cmk.toml"), config).unwrap();
    Self { temp }
  }

  /// Canonical project root, as the binary sees it.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root().join(relative)
  }

  pub fn workspace(&self) -> PathBuf {
    self.path(".cache/demo")
  }

  pub fn build_dir(&self, name: &str) -> PathBuf {
    self.workspace().join(name)
  }

  pub fn alias(&self) -> PathBuf {
    self.path("compile_commands.json")
  }

  /// Lines appended by the stand-in tools, in order.
  pub fn steps(&self) -> Vec<String> {
    read_lines(&self.path("steps.log"))
  }

  pub fn write_file(&self, relative: &str, content: &str) {
    std::fs::write(self.path(relative), content).unwrap();
  }

  /// Get a Command for the cmk binary pointed at this project.
  pub fn cmk_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("cmk");
    cmd.env_remove("CMK_CONFIG");
    cmd.env_remove("CMK_CACHE_DIR");
    cmd.env_remove("RUST_LOG");
    cmd.arg("-C").arg(self.temp.path());
    cmd
  }
}

fn read_lines(path: &Path) -> Vec<String> {
  match std::fs::read_to_string(path) {
    Ok(content) => content.lines().map(str::to_string).collect(),
    Err(_) => Vec::new(),
  }
}
