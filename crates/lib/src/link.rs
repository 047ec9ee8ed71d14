//! Compile-database alias at the source root.
//!
//! Editors and language servers look for `compile_commands.json` next to the
//! sources. After a successful configure the build directory's copy is
//! exposed there through a symlink, unless something already occupies that
//! path. An existing file, symlink or dangling symlink is never replaced.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkOutcome {
  Linked { alias: PathBuf, target: PathBuf },
  AliasExists { alias: PathBuf },
  TargetMissing { target: PathBuf },
}

/// Point `alias` at `target` if `target` exists and `alias` does not.
pub fn link_compile_db(alias: &Path, target: &Path) -> io::Result<LinkOutcome> {
  if alias.symlink_metadata().is_ok() {
    info!(alias = %alias.display(), "compile database already present, leaving it alone");
    return Ok(LinkOutcome::AliasExists {
      alias: alias.to_path_buf(),
    });
  }

  if !target.is_file() {
    debug!(target = %target.display(), "no compile database generated, skipping link");
    return Ok(LinkOutcome::TargetMissing {
      target: target.to_path_buf(),
    });
  }

  match create_symlink(target, alias) {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
      return Ok(LinkOutcome::AliasExists {
        alias: alias.to_path_buf(),
      });
    }
    Err(e) => return Err(e),
  }

  info!(alias = %alias.display(), target = %target.display(), "linked compile database");
  Ok(LinkOutcome::Linked {
    alias: alias.to_path_buf(),
    target: target.to_path_buf(),
  })
}

/// Whether `path` is a symlink (dangling or not).
pub fn is_symlink(path: &Path) -> bool {
  path
    .symlink_metadata()
    .map(|meta| meta.file_type().is_symlink())
    .unwrap_or(false)
}

fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(target, link)
  }
  #[cfg(windows)]
  {
    std::os::windows::fs::symlink_file(target, link)
  }
}
