//! External tool invocation.
//!
//! Tools run attached to the caller's terminal: stdin, stdout and stderr are
//! inherited so progress output and prompts behave as if the command had been
//! typed by hand. The orchestrator always waits for the child to exit before
//! returning. On Ctrl-C the interrupt is forwarded to the child, which gets
//! [`INTERRUPT_GRACE`] to exit before it is killed; the outcome is reported as
//! [`StepResult::Interrupted`].

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// How long an interrupted child may take to exit before it is killed.
pub const INTERRUPT_GRACE: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ExecError {
  #[error("failed to start `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to wait for `{program}`: {source}")]
  Wait {
    program: String,
    #[source]
    source: std::io::Error,
  },
}

/// A fully expanded external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  /// Added on top of the inherited environment.
  pub env: BTreeMap<String, String>,
  pub cwd: Option<PathBuf>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      env: BTreeMap::new(),
      cwd: None,
    }
  }

  /// Split an argv list into program and arguments. Returns `None` for an empty list.
  pub fn from_argv(argv: Vec<String>) -> Option<Self> {
    let mut parts = argv.into_iter();
    let program = parts.next()?;
    Some(Self::new(program).args(parts))
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn envs(mut self, vars: &BTreeMap<String, String>) -> Self {
    self.env.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (key, value) in &self.env {
      write!(f, "{}={} ", key, quote(value))?;
    }
    write!(f, "{}", quote(&self.program))?;
    for arg in &self.args {
      write!(f, " {}", quote(arg))?;
    }
    Ok(())
  }
}

fn quote(s: &str) -> String {
  if !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
    return s.to_string();
  }
  format!("'{}'", s.replace('\'', r"'\''"))
}

/// Outcome of one external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
  Success,
  /// Non-zero exit; `code` is `None` when the process was killed by a signal.
  Failed { code: Option<i32> },
  /// The user interrupted the command.
  Interrupted,
}

impl StepResult {
  pub fn is_success(&self) -> bool {
    matches!(self, StepResult::Success)
  }

  /// Exit code to forward from the orchestrating process.
  pub fn exit_code(&self) -> i32 {
    match self {
      StepResult::Success => 0,
      StepResult::Failed { code } => code.unwrap_or(1),
      StepResult::Interrupted => 130,
    }
  }
}

impl From<ExitStatus> for StepResult {
  fn from(status: ExitStatus) -> Self {
    if status.success() {
      StepResult::Success
    } else {
      StepResult::Failed { code: status.code() }
    }
  }
}

/// Run an invocation attached to the current terminal and wait for it.
pub async fn invoke(invocation: &Invocation) -> Result<StepResult, ExecError> {
  invoke_until(invocation, tokio::signal::ctrl_c()).await
}

/// [`invoke`], with `interrupt` resolving when the user asks to stop.
pub(crate) async fn invoke_until<F>(invocation: &Invocation, interrupt: F) -> Result<StepResult, ExecError>
where
  F: Future<Output = io::Result<()>>,
{
  info!(cmd = %invocation, "invoking external tool");

  let mut command = Command::new(&invocation.program);
  command
    .args(&invocation.args)
    .envs(&invocation.env)
    .stdin(Stdio::inherit())
    .stdout(Stdio::inherit())
    .stderr(Stdio::inherit());
  if let Some(cwd) = &invocation.cwd {
    command.current_dir(cwd);
  }

  let mut child = command.spawn().map_err(|source| ExecError::Spawn {
    program: invocation.program.clone(),
    source,
  })?;
  debug!(pid = ?child.id(), program = %invocation.program, "spawned process");

  let wait_error = |source: io::Error| ExecError::Wait {
    program: invocation.program.clone(),
    source,
  };

  let finished = tokio::select! {
    status = child.wait() => Some(status),
    Ok(()) = interrupt => None,
  };

  let result = match finished {
    Some(status) => StepResult::from(status.map_err(wait_error)?),
    None => {
      warn!(program = %invocation.program, "interrupted, stopping process");
      let status = stop(&mut child).await.map_err(wait_error)?;
      debug!(?status, "process exited after interrupt");
      StepResult::Interrupted
    }
  };

  debug!(program = %invocation.program, ?result, "process finished");
  Ok(result)
}

/// Forward the interrupt, then kill the child if it outlives the grace period.
async fn stop(child: &mut Child) -> io::Result<ExitStatus> {
  if let Some(status) = child.try_wait()? {
    return Ok(status);
  }

  if let Err(e) = forward_interrupt(child) {
    debug!(error = %e, "could not forward interrupt");
  }

  match tokio::time::timeout(INTERRUPT_GRACE, child.wait()).await {
    Ok(status) => status,
    Err(_) => {
      warn!(pid = ?child.id(), "process ignored interrupt, killing it");
      child.start_kill()?;
      child.wait().await
    }
  }
}

#[cfg(unix)]
fn forward_interrupt(child: &Child) -> io::Result<()> {
  use rustix::process::{Pid, Signal, kill_process};

  let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()).and_then(Pid::from_raw) else {
    return Ok(());
  };
  kill_process(pid, Signal::INT)?;
  Ok(())
}

#[cfg(not(unix))]
fn forward_interrupt(child: &mut Child) -> io::Result<()> {
  child.start_kill()
}
