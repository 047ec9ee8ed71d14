//! Removal of generated directories and the compile-database alias.
//!
//! Cleaning never fails because something is already gone: absent paths are
//! reported as such. The alias at the source root is only removed when it is
//! a symlink; a regular file in its place belongs to the user and is kept.

use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::context::{Context, ResolvedProfile};
use crate::link::is_symlink;

#[derive(Debug, Error)]
pub enum CleanError {
  #[error("failed to remove {}: {source}", path.display())]
  Remove { path: PathBuf, source: io::Error },
}

/// What to clean.
#[derive(Debug, Clone, Copy)]
pub enum CleanScope<'a> {
  /// The alias and every profile's build directory.
  Builds,
  /// One profile's build directory, and the alias if it points into it.
  Profile(&'a ResolvedProfile),
  /// The alias and the whole workspace, install directories included.
  All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanTarget {
  Alias,
  BuildDir,
  InstallDir,
  Workspace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CleanOutcome {
  Removed { bytes: u64 },
  Absent,
  Kept { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanEntry {
  pub target: CleanTarget,
  pub profile: Option<String>,
  pub path: PathBuf,
  #[serde(flatten)]
  pub outcome: CleanOutcome,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct CleanReport {
  pub entries: Vec<CleanEntry>,
}

impl CleanReport {
  pub fn removed(&self) -> usize {
    self
      .entries
      .iter()
      .filter(|e| matches!(e.outcome, CleanOutcome::Removed { .. }))
      .count()
  }

  pub fn bytes_freed(&self) -> u64 {
    self
      .entries
      .iter()
      .map(|e| match e.outcome {
        CleanOutcome::Removed { bytes } => bytes,
        _ => 0,
      })
      .sum()
  }

  fn push(&mut self, target: CleanTarget, profile: Option<&str>, path: &Path, outcome: CleanOutcome) {
    self.entries.push(CleanEntry {
      target,
      profile: profile.map(str::to_string),
      path: path.to_path_buf(),
      outcome,
    });
  }
}

pub fn clean(ctx: &Context, scope: CleanScope<'_>) -> Result<CleanReport, CleanError> {
  let mut report = CleanReport::default();
  let alias = ctx.workspace().compile_db_alias();

  match scope {
    CleanScope::Builds => {
      let outcome = remove_alias(&alias, None)?;
      report.push(CleanTarget::Alias, None, &alias, outcome);
      for resolved in ctx.profiles() {
        let dir = &resolved.paths.build_dir;
        report.push(CleanTarget::BuildDir, Some(resolved.name()), dir, remove_dir(dir)?);
      }
    }
    CleanScope::Profile(resolved) => {
      let dir = &resolved.paths.build_dir;
      let outcome = remove_alias(&alias, Some(dir))?;
      report.push(CleanTarget::Alias, None, &alias, outcome);
      report.push(CleanTarget::BuildDir, Some(resolved.name()), dir, remove_dir(dir)?);
    }
    CleanScope::All => {
      let outcome = remove_alias(&alias, None)?;
      report.push(CleanTarget::Alias, None, &alias, outcome);
      for resolved in ctx.profiles() {
        let build = &resolved.paths.build_dir;
        report.push(CleanTarget::BuildDir, Some(resolved.name()), build, remove_dir(build)?);
        let install = &resolved.paths.install_dir;
        report.push(CleanTarget::InstallDir, Some(resolved.name()), install, remove_dir(install)?);
      }
      let root = ctx.workspace().root();
      report.push(CleanTarget::Workspace, None, root, remove_dir(root)?);
    }
  }

  info!(
    removed = report.removed(),
    bytes_freed = report.bytes_freed(),
    "clean complete"
  );
  Ok(report)
}

/// Remove the alias if it is a symlink, optionally only when it points inside `within`.
fn remove_alias(alias: &Path, within: Option<&Path>) -> Result<CleanOutcome, CleanError> {
  if alias.symlink_metadata().is_err() {
    debug!(path = %alias.display(), "alias absent");
    return Ok(CleanOutcome::Absent);
  }

  if !is_symlink(alias) {
    warn!(path = %alias.display(), "compile database is a regular file, keeping it");
    return Ok(CleanOutcome::Kept {
      reason: "not a symlink".to_string(),
    });
  }

  if let Some(dir) = within {
    let points_inside = fs::read_link(alias).map(|target| target.starts_with(dir)).unwrap_or(false);
    if !points_inside {
      return Ok(CleanOutcome::Kept {
        reason: "points into another profile".to_string(),
      });
    }
  }

  match fs::remove_file(alias) {
    Ok(()) => {
      info!(path = %alias.display(), "removed alias");
      Ok(CleanOutcome::Removed { bytes: 0 })
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CleanOutcome::Absent),
    Err(source) => Err(CleanError::Remove {
      path: alias.to_path_buf(),
      source,
    }),
  }
}

fn remove_dir(path: &Path) -> Result<CleanOutcome, CleanError> {
  if !path.exists() {
    debug!(path = %path.display(), "absent, nothing to do");
    return Ok(CleanOutcome::Absent);
  }

  let bytes = dir_size(path);
  match fs::remove_dir_all(path) {
    Ok(()) => {
      info!(path = %path.display(), bytes, "removed");
      Ok(CleanOutcome::Removed { bytes })
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CleanOutcome::Absent),
    Err(source) => Err(CleanError::Remove {
      path: path.to_path_buf(),
      source,
    }),
  }
}

fn dir_size(path: &Path) -> u64 {
  WalkDir::new(path)
    .into_iter()
    .filter_map(|e| e.ok())
    .filter(|e| e.file_type().is_file())
    .filter_map(|e| e.metadata().ok())
    .map(|m| m.len())
    .sum()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::context_from_toml;
  use tempfile::TempDir;

  #[test]
  fn clean_on_fresh_workspace_reports_everything_absent() {
    let temp = TempDir::new().unwrap();
    let ctx = context_from_toml(temp.path(), "");

    for scope in [CleanScope::Builds, CleanScope::All] {
      let report = clean(&ctx, scope).unwrap();
      assert!(!report.entries.is_empty());
      assert!(report.entries.iter().all(|e| e.outcome == CleanOutcome::Absent));
      assert_eq!(report.removed(), 0);
    }
  }

  #[test]
  fn clean_builds_keeps_install_dirs() {
    let temp = TempDir::new().unwrap();
    let ctx = context_from_toml(temp.path(), "");
    let native = ctx.profile("default").unwrap();
    fs::create_dir_all(&native.paths.build_dir).unwrap();
    fs::write(native.paths.build_dir.join("CMakeCache.txt"), "0123456789").unwrap();
    fs::create_dir_all(&native.paths.install_dir).unwrap();

    let report = clean(&ctx, CleanScope::Builds).unwrap();

    assert!(!native.paths.build_dir.exists());
    assert!(native.paths.install_dir.exists());
    assert_eq!(report.removed(), 1);
    assert_eq!(report.bytes_freed(), 10);
  }

  #[test]
  fn clean_all_removes_workspace() {
    let temp = TempDir::new().unwrap();
    let ctx = context_from_toml(temp.path(), "");
    let web = ctx.profile("emscripten").unwrap();
    fs::create_dir_all(&web.paths.build_dir).unwrap();
    fs::create_dir_all(ctx.workspace().root().join("stale")).unwrap();

    let report = clean(&ctx, CleanScope::All).unwrap();

    assert!(!ctx.workspace().root().exists());
    let workspace_entry = report.entries.last().unwrap();
    assert_eq!(workspace_entry.target, CleanTarget::Workspace);
    assert!(matches!(workspace_entry.outcome, CleanOutcome::Removed { .. }));
  }

  #[test]
  fn regular_file_alias_is_kept() {
    let temp = TempDir::new().unwrap();
    let ctx = context_from_toml(temp.path(), "");
    let alias = ctx.workspace().compile_db_alias();
    fs::write(&alias, "[]").unwrap();

    let report = clean(&ctx, CleanScope::Builds).unwrap();

    assert!(alias.exists());
    assert!(matches!(report.entries[0].outcome, CleanOutcome::Kept { .. }));
  }

  #[test]
  fn report_serializes_flat_entries() {
    let temp = TempDir::new().unwrap();
    let ctx = context_from_toml(temp.path(), "");

    let report = clean(&ctx, CleanScope::Profile(ctx.profile("default").unwrap())).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["entries"][0]["target"], "alias");
    assert_eq!(json["entries"][0]["outcome"], "absent");
    assert_eq!(json["entries"][1]["target"], "build_dir");
    assert_eq!(json["entries"][1]["profile"], "default");
  }

  #[test]
  #[cfg(unix)]
  fn profile_clean_only_removes_alias_pointing_into_it() {
    let temp = TempDir::new().unwrap();
    let ctx = context_from_toml(temp.path(), "");
    let native = ctx.profile("default").unwrap();
    let web = ctx.profile("emscripten").unwrap();
    fs::create_dir_all(&native.paths.build_dir).unwrap();
    fs::create_dir_all(&web.paths.build_dir).unwrap();
    let alias = ctx.workspace().compile_db_alias();
    std::os::unix::fs::symlink(&native.paths.compile_db, &alias).unwrap();

    let report = clean(&ctx, CleanScope::Profile(web)).unwrap();
    assert!(is_symlink(&alias));
    assert!(matches!(report.entries[0].outcome, CleanOutcome::Kept { .. }));
    assert!(!web.paths.build_dir.exists());
    assert!(native.paths.build_dir.exists());

    let report = clean(&ctx, CleanScope::Profile(native)).unwrap();
    assert!(!is_symlink(&alias));
    assert_eq!(report.entries[0].outcome, CleanOutcome::Removed { bytes: 0 });
  }
}
