use std::process::ExitCode;

use anyhow::Result;

use cmkit_lib::context::Context;

use super::progress::ConsoleObserver;
use super::{report_failure, runtime};
use crate::output::{Status, field, status};

pub fn cmd_install(ctx: &Context, profile: &str) -> Result<ExitCode> {
  let observer = ConsoleObserver;
  let mut workflow = ctx.workflow(profile, &observer)?;

  match runtime()?.block_on(workflow.install()) {
    Ok(()) => {
      status(Status::Done, format!("Installed `{}`", profile));
      field("Install dir", workflow.profile().paths.install_dir.display());
      Ok(ExitCode::SUCCESS)
    }
    Err(err) => Ok(report_failure(&err)),
  }
}
