use std::process::ExitCode;

use anyhow::Result;

use cmkit_lib::context::Context;

use super::progress::ConsoleObserver;
use super::{report_failure, runtime};
use crate::output::{Status, status};

/// Configure `profile` and link its compile database into the source tree.
pub fn cmd_config(ctx: &Context, profile: &str) -> Result<ExitCode> {
  let observer = ConsoleObserver;
  let mut workflow = ctx.workflow(profile, &observer)?;

  match runtime()?.block_on(workflow.configure()) {
    Ok(_) => {
      status(Status::Done, format!("Configured `{}`", profile));
      Ok(ExitCode::SUCCESS)
    }
    Err(err) => Ok(report_failure(&err)),
  }
}
