//! Project configuration.
//!
//! Settings come from, in order of precedence: explicit [`LoadOptions`],
//! environment variables (`CMK_CONFIG`, `CMK_CACHE_DIR`), the project's
//! `cmk.toml`, and built-in defaults. Without a config file the built-in
//! `default` and `emscripten` profiles are used.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{CACHE_DIR_ENV, CONFIG_ENV, CONFIG_FILENAME, DEFAULT_CACHE_DIR, WEB_PROFILE};
use crate::profile::{Profile, ProfileDef, Target};
use crate::template::TemplateError;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read config file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config file {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("failed to resolve source directory {}: {source}", path.display())]
  SourceDir { path: PathBuf, source: io::Error },

  #[error("invalid project name `{0}`")]
  InvalidProjectName(String),

  #[error("profile `{profile}` has an invalid directory suffix `{suffix}`")]
  InvalidSuffix { profile: String, suffix: String },

  #[error("profile `{profile}` target path `{}` must be relative and stay inside its directory", path.display())]
  InvalidTargetPath { profile: String, path: PathBuf },

  #[error("profiles `{first}` and `{second}` would share the directory `{dir}`")]
  DirectoryCollision { first: String, second: String, dir: String },

  #[error("profile `{profile}`, {step} command: {source}")]
  Template {
    profile: String,
    step: &'static str,
    source: TemplateError,
  },

  #[error("unknown profile `{name}` (available: {available})")]
  UnknownProfile { name: String, available: String },

  #[error("profile `{0}` does not have a serve target")]
  NotWebProfile(String),
}

/// Raw contents of `cmk.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
  pub project: Option<String>,
  pub cache_dir: Option<PathBuf>,
  pub web_profile: Option<String>,
  #[serde(default)]
  pub profiles: BTreeMap<String, ProfileDef>,
}

impl ConfigFile {
  pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn read(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&contents, path)
  }
}

/// Inputs for [`Config::load`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
  pub source_dir: PathBuf,
  pub config_path: Option<PathBuf>,
  pub cache_dir: Option<PathBuf>,
}

/// Validated project configuration.
#[derive(Debug, Clone)]
pub struct Config {
  pub project: String,
  pub source_dir: PathBuf,
  pub cache_dir: PathBuf,
  pub web_profile: String,
  pub config_file: Option<PathBuf>,
  pub profiles: BTreeMap<String, Profile>,
}

impl Config {
  pub fn load(options: &LoadOptions) -> Result<Self, ConfigError> {
    let source_dir = dunce::canonicalize(&options.source_dir).map_err(|source| ConfigError::SourceDir {
      path: options.source_dir.clone(),
      source,
    })?;

    let config_file = locate_config_file(options.config_path.clone(), &source_dir)?;
    let file = match &config_file {
      Some(path) => {
        debug!(path = %path.display(), "loading config file");
        ConfigFile::read(path)?
      }
      None => ConfigFile::default(),
    };

    let cache_override = options
      .cache_dir
      .clone()
      .or_else(|| std::env::var_os(CACHE_DIR_ENV).map(PathBuf::from));

    Self::from_file(source_dir, file, config_file, cache_override)
  }

  /// Build a configuration from parsed file contents.
  ///
  /// `source_dir` is expected to be absolute; relative cache directories are
  /// resolved against it.
  pub fn from_file(
    source_dir: PathBuf,
    file: ConfigFile,
    config_file: Option<PathBuf>,
    cache_override: Option<PathBuf>,
  ) -> Result<Self, ConfigError> {
    let project = match file.project {
      Some(name) => name,
      None => source_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ConfigError::InvalidProjectName(source_dir.display().to_string()))?,
    };
    if !is_single_component(&project) {
      return Err(ConfigError::InvalidProjectName(project));
    }

    let cache_dir = cache_override
      .or(file.cache_dir)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));
    let cache_dir = if cache_dir.is_absolute() {
      cache_dir
    } else {
      source_dir.join(cache_dir)
    };

    let mut profiles: BTreeMap<String, Profile> = Profile::builtins()
      .into_iter()
      .map(|profile| (profile.name.clone(), profile))
      .collect();
    for (name, def) in file.profiles {
      profiles.insert(name.clone(), Profile::from_def(&name, def));
    }
    validate_directories(&profiles)?;
    validate_targets(&profiles)?;

    Ok(Self {
      project,
      source_dir,
      cache_dir,
      web_profile: file.web_profile.unwrap_or_else(|| WEB_PROFILE.to_string()),
      config_file,
      profiles,
    })
  }

  pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
    self.profiles.get(name).ok_or_else(|| ConfigError::UnknownProfile {
      name: name.to_string(),
      available: self.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
    })
  }
}

fn locate_config_file(explicit: Option<PathBuf>, source_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
  let explicit = explicit.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

  if let Some(path) = explicit {
    if !path.is_file() {
      return Err(ConfigError::NotFound { path });
    }
    return Ok(Some(path));
  }

  let default = source_dir.join(CONFIG_FILENAME);
  Ok(default.is_file().then_some(default))
}

fn is_single_component(name: &str) -> bool {
  let mut components = Path::new(name).components();
  matches!(
    (components.next(), components.next()),
    (Some(Component::Normal(_)), None)
  )
}

fn is_contained(path: &Path) -> bool {
  path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    && path.components().any(|c| matches!(c, Component::Normal(_)))
}

/// Binaries and entry points resolve under the profile's own directories.
fn validate_targets(profiles: &BTreeMap<String, Profile>) -> Result<(), ConfigError> {
  for profile in profiles.values() {
    let path = match &profile.target {
      Target::Execute { binary } => binary,
      Target::Serve { entry, .. } => entry,
    };
    if !is_contained(path) {
      return Err(ConfigError::InvalidTargetPath {
        profile: profile.name.clone(),
        path: path.clone(),
      });
    }
  }
  Ok(())
}

/// Every profile must own its build and install directories.
fn validate_directories(profiles: &BTreeMap<String, Profile>) -> Result<(), ConfigError> {
  let mut owners: BTreeMap<Option<&str>, &str> = BTreeMap::new();

  for profile in profiles.values() {
    if let Some(suffix) = &profile.suffix
      && !is_single_component(suffix)
    {
      return Err(ConfigError::InvalidSuffix {
        profile: profile.name.clone(),
        suffix: suffix.clone(),
      });
    }

    if let Some(first) = owners.insert(profile.suffix.as_deref(), &profile.name) {
      return Err(ConfigError::DirectoryCollision {
        first: first.to_string(),
        second: profile.name.clone(),
        dir: profile.build_dir_name(),
      });
    }
  }

  Ok(())
}
