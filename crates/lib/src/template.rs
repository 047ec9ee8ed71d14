//! Argument templates for external commands.
//!
//! Profile commands are stored as argv lists whose elements may contain
//! `{name}` placeholders (`{build_dir}`, `{preset}`, ...). Expansion happens
//! once per process when the context is built; an unknown placeholder is a
//! configuration error rather than something passed through to the tool.
//! `{{` and `}}` produce literal braces; a lone `}` is kept as is.

use std::collections::BTreeMap;

use thiserror::Error;

pub const PROJECT: &str = "project";
pub const PRESET: &str = "preset";
pub const SOURCE_DIR: &str = "source_dir";
pub const BUILD_DIR: &str = "build_dir";
pub const INSTALL_DIR: &str = "install_dir";
pub const SERVE_DIR: &str = "serve_dir";
pub const PORT: &str = "port";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
  #[error("unknown placeholder {{{name}}} in `{arg}`")]
  UnknownPlaceholder { name: String, arg: String },

  #[error("unterminated placeholder in `{0}`")]
  Unterminated(String),

  #[error("command is empty")]
  Empty,
}

/// Values available to a template, keyed by placeholder name.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
  values: BTreeMap<&'static str, String>,
}

impl TemplateVars {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
    self.values.insert(key, value.into());
    self
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.values.get(key).map(String::as_str)
  }
}

/// Expand every placeholder in a single argument.
pub fn expand_arg(arg: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
  let mut out = String::with_capacity(arg.len());
  let mut rest = arg;

  while let Some(start) = rest.find(['{', '}']) {
    out.push_str(&rest[..start]);
    let after = &rest[start + 1..];

    if rest[start..].starts_with('}') {
      out.push('}');
      rest = after.strip_prefix('}').unwrap_or(after);
      continue;
    }

    if let Some(stripped) = after.strip_prefix('{') {
      out.push('{');
      rest = stripped;
      continue;
    }

    let Some(end) = after.find('}') else {
      return Err(TemplateError::Unterminated(arg.to_string()));
    };

    let name = &after[..end];
    match vars.get(name) {
      Some(value) => out.push_str(value),
      None => {
        return Err(TemplateError::UnknownPlaceholder {
          name: name.to_string(),
          arg: arg.to_string(),
        });
      }
    }
    rest = &after[end + 1..];
  }

  out.push_str(rest);
  Ok(out)
}

/// Expand a whole argv template. The first element is the program.
pub fn expand(template: &[String], vars: &TemplateVars) -> Result<Vec<String>, TemplateError> {
  if template.is_empty() {
    return Err(TemplateError::Empty);
  }
  template.iter().map(|arg| expand_arg(arg, vars)).collect()
}
