//! Terminal rendering shared by the tasks.
//!
//! Progress and results go to stdout. Anything the user has to act on goes to
//! stderr so it survives `cmk run > log`.

use std::fmt::Display;
use std::process::ExitCode;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream, Style};

/// How `info` and `clean` print their reports.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ReportFormat {
  #[default]
  Text,
  Json,
}

impl ReportFormat {
  pub fn is_json(self) -> bool {
    matches!(self, ReportFormat::Json)
  }
}

/// The kind of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  /// An external command is about to start.
  Running,
  /// A step or task completed.
  Done,
  /// Nothing changed; purely informational.
  Note,
  /// Something was left in place, or a step ended badly without failing the task.
  Caution,
  /// The task failed.
  Failed,
}

impl Status {
  fn glyph(self) -> &'static str {
    match self {
      Status::Running => "▸",
      Status::Done => "✓",
      Status::Note => "·",
      Status::Caution => "!",
      Status::Failed => "✗",
    }
  }

  fn style(self) -> Style {
    match self {
      Status::Running => Style::new().cyan().bold(),
      Status::Done => Style::new().green(),
      Status::Note => Style::new().blue(),
      Status::Caution => Style::new().yellow(),
      Status::Failed => Style::new().red().bold(),
    }
  }

  fn on_stderr(self) -> bool {
    matches!(self, Status::Caution | Status::Failed)
  }
}

/// Print one status line: a colored glyph followed by `message`.
pub fn status(kind: Status, message: impl Display) {
  let style = kind.style();
  if kind.on_stderr() {
    let glyph = kind.glyph();
    let glyph = glyph.if_supports_color(Stream::Stderr, |g| g.style(style));
    eprintln!("{} {}", glyph, message);
  } else {
    let glyph = kind.glyph();
    let glyph = glyph.if_supports_color(Stream::Stdout, |g| g.style(style));
    println!("{} {}", glyph, message);
  }
}

/// Section title followed by a highlighted name.
pub fn heading(title: &str, name: &str) {
  println!(
    "{} {}",
    title.if_supports_color(Stream::Stdout, |t| t.bold()),
    name.if_supports_color(Stream::Stdout, |n| n.cyan())
  );
}

/// An aligned `label value` line under a heading.
pub fn field(label: &str, value: impl Display) {
  let label = format!("{:<12}", label);
  println!("  {} {}", label.if_supports_color(Stream::Stdout, |l| l.dimmed()), value);
}

pub fn emit_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
  println!("{}", json);
  Ok(())
}

/// Map a child or workflow exit code onto a process exit code.
pub fn exit_code(code: i32) -> ExitCode {
  ExitCode::from(exit_status(code))
}

fn exit_status(code: i32) -> u8 {
  u8::try_from(code).unwrap_or(1)
}
