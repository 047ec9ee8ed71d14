//! Per-invocation context.
//!
//! Everything derived from the configuration (workspace paths, expanded
//! command lines) is computed once when the context is built and read from
//! here by every operation. Nothing is cached beyond the lifetime of the
//! process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigError, LoadOptions};
use crate::exec::Invocation;
use crate::profile::{InstallLayout, Profile, Target};
use crate::template::{self, TemplateVars};
use crate::workflow::{Workflow, WorkflowObserver};
use crate::workspace::{ProfilePaths, Workspace};

/// Expanded command lines for each step of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommands {
  pub configure: Invocation,
  pub build: Invocation,
  pub install: Invocation,
  pub serve: Option<Invocation>,
}

#[derive(Debug, Clone)]
pub struct ResolvedProfile {
  pub profile: Profile,
  pub paths: ProfilePaths,
  pub commands: StepCommands,
}

impl ResolvedProfile {
  fn new(workspace: &Workspace, profile: Profile) -> Result<Self, ConfigError> {
    let paths = workspace.resolve(&profile);
    let vars = template_vars(workspace, &profile, &paths);

    let command = |step: &'static str, argv: &[String]| -> Result<Invocation, ConfigError> {
      let expanded = template::expand(argv, &vars).map_err(|source| ConfigError::Template {
        profile: profile.name.clone(),
        step,
        source,
      })?;
      let invocation = Invocation::from_argv(expanded).ok_or_else(|| ConfigError::Template {
        profile: profile.name.clone(),
        step,
        source: template::TemplateError::Empty,
      })?;
      Ok(invocation.envs(&profile.env))
    };

    let configure = command("configure", &profile.configure)?;
    let build = command("build", &profile.build)?;
    let mut install = command("install", &profile.install)?;
    if profile.layout == InstallLayout::Staged {
      install = install.env("DESTDIR", paths.install_dir.to_string_lossy());
    }
    let serve = match (&profile.target, &paths.serve_dir) {
      (Target::Serve { command: argv, .. }, Some(dir)) => Some(command("serve", argv)?.current_dir(dir)),
      _ => None,
    };

    Ok(Self {
      commands: StepCommands {
        configure,
        build,
        install,
        serve,
      },
      paths,
      profile,
    })
  }

  pub fn name(&self) -> &str {
    &self.profile.name
  }
}

fn template_vars(workspace: &Workspace, profile: &Profile, paths: &ProfilePaths) -> TemplateVars {
  let path = |p: &Path| p.to_string_lossy().into_owned();

  let vars = TemplateVars::new()
    .with(template::PROJECT, workspace.project())
    .with(template::PRESET, profile.preset.as_str())
    .with(template::SOURCE_DIR, path(workspace.source_dir()))
    .with(template::BUILD_DIR, path(&paths.build_dir))
    .with(template::INSTALL_DIR, path(&paths.install_dir));

  match (&profile.target, &paths.serve_dir) {
    (Target::Serve { port, .. }, Some(dir)) => vars.with(template::SERVE_DIR, path(dir)).with(template::PORT, port.to_string()),
    _ => vars,
  }
}

#[derive(Debug, Clone)]
pub struct Context {
  workspace: Workspace,
  web_profile: String,
  config_file: Option<PathBuf>,
  profiles: BTreeMap<String, ResolvedProfile>,
}

impl Context {
  pub fn load(options: &LoadOptions) -> Result<Self, ConfigError> {
    Self::new(Config::load(options)?)
  }

  pub fn new(config: Config) -> Result<Self, ConfigError> {
    let workspace = Workspace::new(&config.project, &config.source_dir, &config.cache_dir);

    let profiles = config
      .profiles
      .into_iter()
      .map(|(name, profile)| Ok((name, ResolvedProfile::new(&workspace, profile)?)))
      .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

    Ok(Self {
      workspace,
      web_profile: config.web_profile,
      config_file: config.config_file,
      profiles,
    })
  }

  pub fn workspace(&self) -> &Workspace {
    &self.workspace
  }

  pub fn config_file(&self) -> Option<&Path> {
    self.config_file.as_deref()
  }

  pub fn profiles(&self) -> impl Iterator<Item = &ResolvedProfile> {
    self.profiles.values()
  }

  pub fn profile(&self, name: &str) -> Result<&ResolvedProfile, ConfigError> {
    self.profiles.get(name).ok_or_else(|| ConfigError::UnknownProfile {
      name: name.to_string(),
      available: self.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
    })
  }

  /// The profile targeted by the `*-web` tasks.
  pub fn web_profile(&self) -> Result<&ResolvedProfile, ConfigError> {
    let resolved = self.profile(&self.web_profile)?;
    if !resolved.profile.is_web() {
      return Err(ConfigError::NotWebProfile(self.web_profile.clone()));
    }
    Ok(resolved)
  }

  pub fn workflow<'a>(&'a self, name: &str, observer: &'a dyn WorkflowObserver) -> Result<Workflow<'a>, ConfigError> {
    Ok(Workflow::new(&self.workspace, self.profile(name)?, observer))
  }
}
