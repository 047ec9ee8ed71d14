//! cmkit-lib: build orchestration for CMake-style projects
//!
//! This crate provides the pieces behind the `cmk` command:
//! - `Profile`: a named build variant with its own directories and command templates
//! - `Workspace`: the per-project cache directory and the paths derived from it
//! - `Workflow`: the configure → build → install → run state machine
//! - `clean`: removal of generated directories and the compile-database alias

pub mod clean;
pub mod config;
pub mod consts;
pub mod context;
pub mod exec;
pub mod link;
pub mod profile;
pub mod template;
pub mod workflow;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testutil;
