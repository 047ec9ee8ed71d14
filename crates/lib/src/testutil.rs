//! Test utilities for cmkit-lib.
//!
//! Stand-in tools are `/bin/sh` scripts so workflow tests run without CMake.

use std::path::Path;
use std::sync::Mutex;

use crate::config::{Config, ConfigFile};
use crate::context::Context;
use crate::exec::Invocation;
use crate::workflow::{Step, WorkflowEvent, WorkflowObserver};

/// An invocation running `script` through `/bin/sh -c`.
pub fn sh(script: &str) -> Invocation {
  Invocation::new("/bin/sh").args(["-c", script])
}

/// Build a context for a project rooted at `source_dir` from TOML contents.
pub fn context_from_toml(source_dir: &Path, contents: &str) -> Context {
  let file = ConfigFile::parse(contents, &source_dir.join("cmk.toml")).unwrap();
  let config = Config::from_file(source_dir.to_path_buf(), file, None, None).unwrap();
  Context::new(config).unwrap()
}

/// Observer that records the order in which steps start.
#[derive(Default)]
pub struct RecordingObserver {
  steps: Mutex<Vec<Step>>,
  retries: Mutex<usize>,
}

impl RecordingObserver {
  pub fn steps(&self) -> Vec<Step> {
    self.steps.lock().unwrap().clone()
  }

  pub fn retries(&self) -> usize {
    *self.retries.lock().unwrap()
  }
}

impl WorkflowObserver for RecordingObserver {
  fn on_event(&self, event: &WorkflowEvent<'_>) {
    match event {
      WorkflowEvent::StepStarted { step, .. } => self.steps.lock().unwrap().push(*step),
      WorkflowEvent::Retrying { .. } => *self.retries.lock().unwrap() += 1,
      _ => {}
    }
  }
}
