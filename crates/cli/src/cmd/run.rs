use std::process::ExitCode;

use anyhow::Result;

use cmkit_lib::context::Context;

use super::progress::ConsoleObserver;
use super::{report_failure, runtime};
use crate::output::exit_code;

/// Bring `profile` up to date and launch its target.
///
/// The exit status of the launched program becomes ours.
pub fn cmd_run(ctx: &Context, profile: &str) -> Result<ExitCode> {
  let observer = ConsoleObserver;
  let mut workflow = ctx.workflow(profile, &observer)?;

  match runtime()?.block_on(workflow.run()) {
    Ok(result) => Ok(exit_code(result.exit_code())),
    Err(err) => Ok(report_failure(&err)),
  }
}
