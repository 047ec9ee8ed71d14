//! The `info` command: a read-only report that always exits successfully.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use cmkit_lib::context::{Context, ResolvedProfile};
use cmkit_lib::profile::InstallLayout;
use cmkit_lib::workflow::WorkflowState;
use cmkit_lib::workspace::{BuildState, ProfilePaths};

use super::GlobalArgs;
use crate::output::{Status, emit_json, field, heading, status};

#[derive(Serialize)]
struct InfoReport<'a> {
  project: &'a str,
  source_dir: &'a Path,
  workspace: &'a Path,
  config_file: Option<&'a Path>,
  web_profile: Option<&'a str>,
  profiles: Vec<ProfileInfo<'a>>,
}

#[derive(Serialize)]
struct ProfileInfo<'a> {
  name: &'a str,
  preset: &'a str,
  target: &'static str,
  layout: InstallLayout,
  paths: &'a ProfilePaths,
  build_state: BuildState,
  state: WorkflowState,
}

impl<'a> ProfileInfo<'a> {
  fn new(ctx: &Context, resolved: &'a ResolvedProfile) -> Self {
    let build_state = BuildState::inspect(ctx.workspace(), &resolved.paths);
    Self {
      name: resolved.name(),
      preset: &resolved.profile.preset,
      target: resolved.profile.target.kind(),
      layout: resolved.profile.layout,
      paths: &resolved.paths,
      build_state,
      state: build_state.state(),
    }
  }
}

pub fn cmd_info(global: &GlobalArgs, profile: Option<&str>) -> Result<ExitCode> {
  let ctx = match global.load_context() {
    Ok(ctx) => ctx,
    Err(err) => {
      status(Status::Caution, format!("{:#}", err));
      return Ok(ExitCode::SUCCESS);
    }
  };

  let selected: Vec<&ResolvedProfile> = match profile.map(|name| ctx.profile(name)) {
    Some(Ok(resolved)) => vec![resolved],
    Some(Err(err)) => {
      status(Status::Caution, err);
      ctx.profiles().collect()
    }
    None => ctx.profiles().collect(),
  };

  let report = InfoReport {
    project: ctx.workspace().project(),
    source_dir: ctx.workspace().source_dir(),
    workspace: ctx.workspace().root(),
    config_file: ctx.config_file(),
    web_profile: ctx.web_profile().ok().map(ResolvedProfile::name),
    profiles: selected.into_iter().map(|r| ProfileInfo::new(&ctx, r)).collect(),
  };

  if global.format.is_json() {
    emit_json(&report)?;
  } else {
    print_text(&ctx, &report);
  }

  Ok(ExitCode::SUCCESS)
}

fn print_text(ctx: &Context, report: &InfoReport<'_>) {
  let alias = ctx.workspace().compile_db_alias();
  let alias_state = if alias.symlink_metadata().is_ok() { "present" } else { "absent" };

  heading("Project", report.project);
  field("Source dir", report.source_dir.display());
  field("Workspace", report.workspace.display());
  match report.config_file {
    Some(path) => field("Config file", path.display()),
    None => field("Config file", "(built-in defaults)"),
  }
  field("Compile db", format!("{} ({})", alias.display(), alias_state));
  if let Some(web) = report.web_profile {
    field("Web profile", web);
  }

  for info in &report.profiles {
    println!();
    heading("Profile", info.name);
    field("Preset", info.preset);
    field("Target", info.target);
    field("Build dir", info.paths.build_dir.display());
    field("Install dir", info.paths.install_dir.display());
    if let Some(serve_dir) = &info.paths.serve_dir {
      field("Serve dir", serve_dir.display());
    }
    field("Artifact", info.paths.artifact.display());
    field("State", state_label(info.state));
  }
}

fn state_label(state: WorkflowState) -> &'static str {
  match state {
    WorkflowState::Unconfigured => "unconfigured",
    WorkflowState::Configured => "configured",
    WorkflowState::Built => "built",
    WorkflowState::Installed => "installed",
  }
}
