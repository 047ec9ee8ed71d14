mod build;
mod clean;
mod config;
mod info;
mod install;
mod progress;
mod run;

pub use build::cmd_build;
pub use clean::{CleanRequest, cmd_clean};
pub use config::cmd_config;
pub use info::cmd_info;
pub use install::cmd_install;
pub use run::cmd_run;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use tokio::runtime::Runtime;
use tracing::debug;

use cmkit_lib::config::LoadOptions;
use cmkit_lib::context::Context;
use cmkit_lib::workflow::WorkflowError;

use crate::output::{ReportFormat, Status, exit_code, status};

/// Options shared by every subcommand.
pub struct GlobalArgs {
  pub project_dir: Option<PathBuf>,
  pub config: Option<PathBuf>,
  pub format: ReportFormat,
}

impl GlobalArgs {
  pub fn load_context(&self) -> Result<Context> {
    let source_dir = match &self.project_dir {
      Some(dir) => dir.clone(),
      None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    debug!(source_dir = %source_dir.display(), config = ?self.config, "loading project");
    let options = LoadOptions {
      source_dir,
      config_path: self.config.clone(),
      cache_dir: None,
    };
    Context::load(&options).context("Failed to load project configuration")
  }
}

/// Steps run one at a time, so a single-threaded runtime is enough.
fn runtime() -> Result<Runtime> {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")
}

fn report_failure(err: &WorkflowError) -> ExitCode {
  status(Status::Failed, err);
  exit_code(err.exit_code())
}
