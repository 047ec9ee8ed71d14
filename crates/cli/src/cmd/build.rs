use std::process::ExitCode;

use anyhow::Result;

use cmkit_lib::context::Context;

use super::progress::ConsoleObserver;
use super::{report_failure, runtime};
use crate::output::{Status, status};

pub fn cmd_build(ctx: &Context, profile: &str, auto_config: bool) -> Result<ExitCode> {
  let observer = ConsoleObserver;
  let mut workflow = ctx.workflow(profile, &observer)?;

  match runtime()?.block_on(workflow.build(auto_config)) {
    Ok(()) => {
      status(Status::Done, format!("Built `{}`", profile));
      Ok(ExitCode::SUCCESS)
    }
    Err(err) => Ok(report_failure(&err)),
  }
}
