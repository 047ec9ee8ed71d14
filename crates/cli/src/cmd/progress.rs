//! Console rendering of workflow progress.

use std::time::Duration;

use cmkit_lib::exec::StepResult;
use cmkit_lib::link::LinkOutcome;
use cmkit_lib::workflow::{WorkflowEvent, WorkflowObserver};

use crate::output::{Status, status};

/// Prints each step as it starts and finishes.
pub struct ConsoleObserver;

impl WorkflowObserver for ConsoleObserver {
  fn on_event(&self, event: &WorkflowEvent<'_>) {
    match event {
      WorkflowEvent::StepStarted { invocation, .. } => status(Status::Running, format!("Running: {}", invocation)),
      WorkflowEvent::StepFinished { step, result, elapsed } => match result {
        StepResult::Success => status(Status::Done, format!("{} finished in {}", step, took(*elapsed))),
        StepResult::Failed { code: Some(code) } => {
          status(Status::Caution, format!("{} exited with code {} after {}", step, code, took(*elapsed)))
        }
        StepResult::Failed { code: None } => status(Status::Caution, format!("{} was killed by a signal", step)),
        StepResult::Interrupted => status(Status::Caution, format!("{} interrupted", step)),
      },
      WorkflowEvent::AutoConfigure { build_dir } => {
        status(Status::Note, format!("{} does not exist, configuring first", build_dir.display()))
      }
      WorkflowEvent::Linked(LinkOutcome::Linked { alias, target }) => {
        status(Status::Note, format!("Linked {} -> {}", alias.display(), target.display()))
      }
      WorkflowEvent::Linked(_) => {}
      WorkflowEvent::Retrying { missing } => status(
        Status::Caution,
        format!("{} not found, reconfiguring and rebuilding once", missing.display()),
      ),
      WorkflowEvent::Serving { url, dir } => {
        status(Status::Note, format!("Starting local server in: {}", dir.display()));
        status(Status::Note, format!("Open your browser at {}", url));
      }
    }
  }
}

/// Step durations: milliseconds under a second, then tenths, then minutes.
fn took(elapsed: Duration) -> String {
  let millis = elapsed.as_millis();
  if millis < 1_000 {
    format!("{}ms", millis)
  } else if millis < 60_000 {
    format!("{:.1}s", elapsed.as_secs_f64())
  } else {
    let secs = elapsed.as_secs();
    format!("{}m{:02}s", secs / 60, secs % 60)
  }
}
