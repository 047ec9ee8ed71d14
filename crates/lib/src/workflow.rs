//! The configure → build → install → run state machine.
//!
//! A [`Workflow`] drives one profile. Each step checks its filesystem
//! precondition, runs the profile's expanded command through
//! [`exec::invoke`](crate::exec::invoke), and aborts on the first failure.
//! Steps run strictly one after another; the external tool owns the
//! terminal while it runs.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::ResolvedProfile;
use crate::exec::{self, ExecError, Invocation, StepResult};
use crate::link::{LinkOutcome, link_compile_db};
use crate::profile::Target;
use crate::workspace::{BuildState, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
  Configure,
  Build,
  Install,
  Execute,
  Serve,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Step::Configure => "configure",
      Step::Build => "build",
      Step::Install => "install",
      Step::Execute => "execute",
      Step::Serve => "serve",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
  Unconfigured,
  Configured,
  Built,
  Installed,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("build path doesn't exist: {} (run `config` first)", path.display())]
  BuildDirMissing { path: std::path::PathBuf },

  #[error("expected artifact not found: {}", path.display())]
  ArtifactNotFound { path: std::path::PathBuf },

  #[error("{step} step failed: `{program}` exited with {}", describe_code(*code))]
  ToolFailed {
    step: Step,
    program: String,
    code: Option<i32>,
  },

  #[error("{step} step interrupted")]
  Interrupted { step: Step },

  #[error(transparent)]
  Exec(#[from] ExecError),

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir {
    path: std::path::PathBuf,
    source: std::io::Error,
  },

  #[error("failed to link compile database {}: {source}", path.display())]
  Link {
    path: std::path::PathBuf,
    source: std::io::Error,
  },
}

impl WorkflowError {
  /// Exit code for the orchestrating process.
  pub fn exit_code(&self) -> i32 {
    match self {
      WorkflowError::ToolFailed { code, .. } => code.unwrap_or(1),
      WorkflowError::Interrupted { .. } => 130,
      _ => 1,
    }
  }
}

fn describe_code(code: Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "a signal".to_string(),
  }
}

/// Progress notifications emitted while a workflow runs.
#[derive(Debug)]
pub enum WorkflowEvent<'a> {
  StepStarted { step: Step, invocation: &'a Invocation },
  StepFinished { step: Step, result: StepResult, elapsed: Duration },
  /// `build` found no build directory and is configuring first.
  AutoConfigure { build_dir: &'a Path },
  Linked(&'a LinkOutcome),
  /// The web entry point was missing; one reconfigure and rebuild follows.
  Retrying { missing: &'a Path },
  Serving { url: &'a str, dir: &'a Path },
}

pub trait WorkflowObserver {
  fn on_event(&self, event: &WorkflowEvent<'_>);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl WorkflowObserver for NoOpObserver {
  fn on_event(&self, _event: &WorkflowEvent<'_>) {}
}

pub struct Workflow<'a> {
  workspace: &'a Workspace,
  resolved: &'a ResolvedProfile,
  observer: &'a dyn WorkflowObserver,
  state: WorkflowState,
}

impl<'a> Workflow<'a> {
  pub fn new(workspace: &'a Workspace, resolved: &'a ResolvedProfile, observer: &'a dyn WorkflowObserver) -> Self {
    let state = BuildState::inspect(workspace, &resolved.paths).state();
    debug!(profile = %resolved.name(), ?state, "workflow created");
    Self {
      workspace,
      resolved,
      observer,
      state,
    }
  }

  pub fn state(&self) -> WorkflowState {
    self.state
  }

  pub fn profile(&self) -> &ResolvedProfile {
    self.resolved
  }

  /// `Unconfigured → Configured`: create the build directory, run the
  /// configure command, then expose the compile database at the source root.
  pub async fn configure(&mut self) -> Result<LinkOutcome, WorkflowError> {
    let resolved = self.resolved;
    let build_dir = &resolved.paths.build_dir;
    std::fs::create_dir_all(build_dir).map_err(|source| WorkflowError::CreateDir {
      path: build_dir.clone(),
      source,
    })?;

    self.step(Step::Configure, &resolved.commands.configure).await?;
    self.transition(WorkflowState::Configured);

    let alias = self.workspace.compile_db_alias();
    let outcome =
      link_compile_db(&alias, &resolved.paths.compile_db).map_err(|source| WorkflowError::Link {
        path: alias.clone(),
        source,
      })?;
    self.observer.on_event(&WorkflowEvent::Linked(&outcome));

    Ok(outcome)
  }

  /// `Configured → Built`. With `auto_config`, a missing build directory is
  /// configured first instead of being reported.
  pub async fn build(&mut self, auto_config: bool) -> Result<(), WorkflowError> {
    let resolved = self.resolved;
    if !resolved.paths.build_dir.is_dir() {
      if !auto_config {
        return Err(self.build_dir_missing());
      }
      self.observer.on_event(&WorkflowEvent::AutoConfigure {
        build_dir: &resolved.paths.build_dir,
      });
      self.configure().await?;
    }

    self.step(Step::Build, &resolved.commands.build).await?;
    self.transition(WorkflowState::Built);
    Ok(())
  }

  /// `Built → Installed`.
  pub async fn install(&mut self) -> Result<(), WorkflowError> {
    if !self.resolved.paths.build_dir.is_dir() {
      return Err(self.build_dir_missing());
    }

    self.step(Step::Install, &self.resolved.commands.install).await?;
    self.transition(WorkflowState::Installed);
    Ok(())
  }

  /// Full sequence ending in the profile's target.
  ///
  /// The returned result is the artifact's (or server's) own outcome, to be
  /// forwarded as the process exit status.
  pub async fn run(&mut self) -> Result<StepResult, WorkflowError> {
    let resolved = self.resolved;
    match &resolved.profile.target {
      Target::Execute { .. } => self.run_native().await,
      Target::Serve { port, .. } => self.run_web(*port).await,
    }
  }

  async fn run_native(&mut self) -> Result<StepResult, WorkflowError> {
    self.configure().await?;
    self.build(false).await?;
    self.install().await?;

    let artifact = &self.resolved.paths.artifact;
    if !artifact.is_file() {
      return Err(WorkflowError::ArtifactNotFound { path: artifact.clone() });
    }

    info!(project = %self.workspace.project(), binary = %artifact.display(), "running binary");
    let invocation = Invocation::new(artifact.to_string_lossy());
    self.launch(Step::Execute, &invocation).await
  }

  async fn run_web(&mut self, port: u16) -> Result<StepResult, WorkflowError> {
    self.configure().await?;
    self.build(false).await?;

    let resolved = self.resolved;
    let artifact = &resolved.paths.artifact;
    if !artifact.is_file() {
      warn!(entry = %artifact.display(), "entry point missing, reconfiguring and rebuilding once");
      self.observer.on_event(&WorkflowEvent::Retrying { missing: artifact });
      self.configure().await?;
      self.build(false).await?;

      if !artifact.is_file() {
        return Err(WorkflowError::ArtifactNotFound { path: artifact.clone() });
      }
    }

    let (Some(serve), Some(dir)) = (&resolved.commands.serve, &resolved.paths.serve_dir) else {
      return Err(WorkflowError::ArtifactNotFound { path: artifact.clone() });
    };

    let url = format!("http://localhost:{}/", port);
    info!(url = %url, dir = %dir.display(), "serving web build");
    self.observer.on_event(&WorkflowEvent::Serving { url: &url, dir });
    self.launch(Step::Serve, serve).await
  }

  /// Run a step that must succeed for the sequence to continue.
  async fn step(&self, step: Step, invocation: &Invocation) -> Result<(), WorkflowError> {
    match self.launch(step, invocation).await? {
      StepResult::Success => Ok(()),
      StepResult::Failed { code } => Err(WorkflowError::ToolFailed {
        step,
        program: invocation.program.clone(),
        code,
      }),
      StepResult::Interrupted => Err(WorkflowError::Interrupted { step }),
    }
  }

  async fn launch(&self, step: Step, invocation: &Invocation) -> Result<StepResult, WorkflowError> {
    self.observer.on_event(&WorkflowEvent::StepStarted { step, invocation });
    let started = Instant::now();

    let result = exec::invoke(invocation).await?;

    let elapsed = started.elapsed();
    info!(%step, profile = %self.resolved.name(), ?result, ?elapsed, "step finished");
    self.observer.on_event(&WorkflowEvent::StepFinished { step, result, elapsed });
    Ok(result)
  }

  fn transition(&mut self, next: WorkflowState) {
    debug!(profile = %self.resolved.name(), from = ?self.state, to = ?next, "state transition");
    self.state = next;
  }

  fn build_dir_missing(&self) -> WorkflowError {
    WorkflowError::BuildDirMissing {
      path: self.resolved.paths.build_dir.clone(),
    }
  }
}
