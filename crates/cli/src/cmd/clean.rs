use std::process::ExitCode;

use anyhow::{Context as _, Result};

use cmkit_lib::clean::{CleanOutcome, CleanReport, CleanScope, clean};
use cmkit_lib::context::Context;

use crate::output::{ReportFormat, Status, emit_json, field, status};

pub enum CleanRequest {
  Builds,
  Profile(String),
  All,
}

pub fn cmd_clean(ctx: &Context, request: CleanRequest, format: ReportFormat) -> Result<ExitCode> {
  let scope = match &request {
    CleanRequest::Builds => CleanScope::Builds,
    CleanRequest::Profile(name) => CleanScope::Profile(ctx.profile(name)?),
    CleanRequest::All => CleanScope::All,
  };

  let report = clean(ctx, scope).context("Clean failed")?;

  if format.is_json() {
    emit_json(&report)?;
  } else {
    print_report(&report);
  }
  Ok(ExitCode::SUCCESS)
}

fn print_report(report: &CleanReport) {
  for entry in &report.entries {
    let path = entry.path.display();
    match &entry.outcome {
      CleanOutcome::Removed { .. } => status(Status::Done, format!("Removed {}", path)),
      CleanOutcome::Absent => status(Status::Note, format!("{} absent. Nothing to do.", path)),
      CleanOutcome::Kept { reason } => status(Status::Caution, format!("Kept {} ({})", path, reason)),
    }
  }

  if report.removed() > 0 {
    field("Freed", human_size(report.bytes_freed()));
  }
}

fn human_size(bytes: u64) -> String {
  const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

  if bytes < 1024 {
    return format!("{} B", bytes);
  }
  let mut size = bytes as f64 / 1024.0;
  let mut unit = 0;
  while size >= 1024.0 && unit + 1 < UNITS.len() {
    size /= 1024.0;
    unit += 1;
  }
  format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn human_size_picks_largest_unit() {
    assert_eq!(human_size(0), "0 B");
    assert_eq!(human_size(1023), "1023 B");
    assert_eq!(human_size(1536), "1.5 KiB");
    assert_eq!(human_size(5 * 1024 * 1024), "5.0 MiB");
    assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.0 GiB");
  }
}
