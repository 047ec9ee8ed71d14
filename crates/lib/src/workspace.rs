//! Workspace layout.
//!
//! All generated artifacts for a project live under
//! `<cache_dir>/<project>/`, one build and one install directory per
//! profile. The compile-database alias is the only file written outside the
//! workspace, at the root of the source tree.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::consts::COMPILE_DB_FILENAME;
use crate::profile::{Profile, Target};
use crate::workflow::WorkflowState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
  project: String,
  source_dir: PathBuf,
  root: PathBuf,
}

impl Workspace {
  pub fn new(project: &str, source_dir: &Path, cache_dir: &Path) -> Self {
    Self {
      project: project.to_string(),
      source_dir: source_dir.to_path_buf(),
      root: cache_dir.join(project),
    }
  }

  pub fn project(&self) -> &str {
    &self.project
  }

  pub fn source_dir(&self) -> &Path {
    &self.source_dir
  }

  /// The workspace root; every profile directory is a child of it.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Where the compile-database alias is expected, at the source root.
  pub fn compile_db_alias(&self) -> PathBuf {
    self.source_dir.join(COMPILE_DB_FILENAME)
  }

  /// Resolve every path a profile's steps read or write.
  pub fn resolve(&self, profile: &Profile) -> ProfilePaths {
    let build_dir = self.root.join(profile.build_dir_name());
    let install_dir = self.root.join(profile.install_dir_name());
    let compile_db = build_dir.join(COMPILE_DB_FILENAME);

    let (artifact, serve_dir) = match &profile.target {
      Target::Execute { binary } => (install_dir.join(binary), None),
      Target::Serve { entry, .. } => {
        let artifact = build_dir.join(entry);
        let serve_dir = artifact.parent().map(Path::to_path_buf).unwrap_or_else(|| build_dir.clone());
        (artifact, Some(serve_dir))
      }
    };

    ProfilePaths {
      build_dir,
      install_dir,
      compile_db,
      serve_dir,
      artifact,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePaths {
  pub build_dir: PathBuf,
  pub install_dir: PathBuf,
  /// The compile database generated inside the build directory.
  pub compile_db: PathBuf,
  /// Directory handed to the static file server, for serve targets.
  pub serve_dir: Option<PathBuf>,
  /// Binary to execute or entry point to serve.
  pub artifact: PathBuf,
}

/// Filesystem view of a profile, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildState {
  pub build_dir_exists: bool,
  pub install_dir_exists: bool,
  pub alias_exists: bool,
  pub artifact_exists: bool,
}

impl BuildState {
  pub fn inspect(workspace: &Workspace, paths: &ProfilePaths) -> Self {
    Self {
      build_dir_exists: paths.build_dir.is_dir(),
      install_dir_exists: paths.install_dir.is_dir(),
      alias_exists: workspace.compile_db_alias().symlink_metadata().is_ok(),
      artifact_exists: paths.artifact.is_file(),
    }
  }

  /// The furthest workflow state the filesystem can vouch for.
  ///
  /// `Built` leaves no marker of its own, so it is never reported here.
  pub fn state(&self) -> WorkflowState {
    match (self.build_dir_exists, self.install_dir_exists) {
      (false, _) => WorkflowState::Unconfigured,
      (true, true) => WorkflowState::Installed,
      (true, false) => WorkflowState::Configured,
    }
  }
}
