//! Build profiles.
//!
//! A profile is a named build variant: its own build and install directories,
//! the argv templates for each step, how installed files are laid out, and
//! what the `run` task does with the result (execute a binary or serve a web
//! entry point).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_PROFILE, DEFAULT_SERVE_PORT, WEB_PROFILE};

/// Where the install step puts its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallLayout {
  /// The install prefix is baked into the configure command; install writes there directly.
  #[default]
  Prefix,
  /// The install step runs with `DESTDIR` pointing at the install directory.
  Staged,
}

/// The terminal action of the `run` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
  /// Execute a binary located relative to the install directory.
  Execute { binary: PathBuf },
  /// Serve the directory holding `entry` (relative to the build directory).
  Serve {
    entry: PathBuf,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_serve_command")]
    command: Vec<String>,
  },
}

impl Target {
  pub fn kind(&self) -> &'static str {
    match self {
      Target::Execute { .. } => "execute",
      Target::Serve { .. } => "serve",
    }
  }
}

/// A profile as written in `cmk.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileDef {
  #[serde(default)]
  pub preset: Option<String>,
  #[serde(default)]
  pub suffix: Option<String>,
  pub configure: Vec<String>,
  #[serde(default = "default_build_command")]
  pub build: Vec<String>,
  #[serde(default = "default_install_command")]
  pub install: Vec<String>,
  #[serde(default)]
  pub layout: InstallLayout,
  pub target: Target,
  #[serde(default)]
  pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
  pub name: String,
  pub preset: String,
  /// Directory suffix; `None` maps to plain `build`/`install`.
  pub suffix: Option<String>,
  pub configure: Vec<String>,
  pub build: Vec<String>,
  pub install: Vec<String>,
  pub layout: InstallLayout,
  pub target: Target,
  pub env: BTreeMap<String, String>,
}

impl Profile {
  pub fn from_def(name: &str, def: ProfileDef) -> Self {
    let suffix = match def.suffix {
      Some(suffix) => Some(suffix),
      None if name == DEFAULT_PROFILE => None,
      None => Some(name.to_string()),
    };

    Self {
      name: name.to_string(),
      preset: def.preset.unwrap_or_else(|| name.to_string()),
      suffix,
      configure: def.configure,
      build: def.build,
      install: def.install,
      layout: def.layout,
      target: def.target,
      env: def.env,
    }
  }

  /// Native build installed under `install/`, running `bin/app`.
  pub fn native() -> Self {
    Self {
      name: DEFAULT_PROFILE.to_string(),
      preset: DEFAULT_PROFILE.to_string(),
      suffix: None,
      configure: argv(&[
        "cmake",
        "--preset",
        "{preset}",
        "-S",
        "{source_dir}",
        "-B",
        "{build_dir}",
        "-DCMAKE_INSTALL_PREFIX={install_dir}",
        "-DCMAKE_EXPORT_COMPILE_COMMANDS=ON",
      ]),
      build: default_build_command(),
      install: default_install_command(),
      layout: InstallLayout::Prefix,
      target: Target::Execute {
        binary: PathBuf::from("bin").join("app"),
      },
      env: BTreeMap::new(),
    }
  }

  /// WebAssembly build configured through `emcmake`, served from `build-web/`.
  pub fn emscripten() -> Self {
    Self {
      name: WEB_PROFILE.to_string(),
      preset: WEB_PROFILE.to_string(),
      suffix: Some("web".to_string()),
      configure: argv(&[
        "emcmake",
        "cmake",
        "--preset",
        "{preset}",
        "-S",
        "{source_dir}",
        "-B",
        "{build_dir}",
        "-DCMAKE_EXPORT_COMPILE_COMMANDS=ON",
      ]),
      build: default_build_command(),
      install: default_install_command(),
      layout: InstallLayout::Prefix,
      target: Target::Serve {
        entry: PathBuf::from("index.html"),
        port: DEFAULT_SERVE_PORT,
        command: default_serve_command(),
      },
      env: BTreeMap::new(),
    }
  }

  pub fn builtins() -> Vec<Profile> {
    vec![Self::native(), Self::emscripten()]
  }

  pub fn build_dir_name(&self) -> String {
    match &self.suffix {
      Some(suffix) => format!("build-{}", suffix),
      None => "build".to_string(),
    }
  }

  pub fn install_dir_name(&self) -> String {
    match &self.suffix {
      Some(suffix) => format!("install-{}", suffix),
      None => "install".to_string(),
    }
  }

  pub fn is_web(&self) -> bool {
    matches!(self.target, Target::Serve { .. })
  }
}

fn argv(parts: &[&str]) -> Vec<String> {
  parts.iter().map(|s| s.to_string()).collect()
}

fn default_port() -> u16 {
  DEFAULT_SERVE_PORT
}

fn default_build_command() -> Vec<String> {
  argv(&["cmake", "--build", "{build_dir}"])
}

fn default_install_command() -> Vec<String> {
  argv(&["cmake", "--install", "{build_dir}"])
}

fn default_serve_command() -> Vec<String> {
  argv(&[
    "python3",
    "-m",
    "http.server",
    "{port}",
    "--bind",
    "127.0.0.1",
    "--directory",
    "{serve_dir}",
  ])
}
