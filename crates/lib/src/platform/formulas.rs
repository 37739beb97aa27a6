//! Per-platform formula manifest.
//!
//! Rows are `<type>,<name>,...`. Only rows whose type is in the caller's tag
//! set are kept. Order is preserved and duplicates are kept: the resolver
//! processes exactly what the manifest lists.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::util::csv::{is_skipped, split_row};

#[derive(Debug, Error)]
pub enum FormulasManifestError {
  #[error("failed to read platform formula manifest '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A classified platform manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformRow {
  Formula { kind: String, name: String },
  Ignored,
}

impl PlatformRow {
  pub fn parse(line: &str) -> Self {
    let fields = split_row(line);
    if is_skipped(&fields) {
      return PlatformRow::Ignored;
    }
    let mut fields = fields.into_iter();
    match (fields.next(), fields.next()) {
      (Some(kind), Some(name)) => PlatformRow::Formula { kind, name },
      _ => PlatformRow::Ignored,
    }
  }
}

/// Formula names needed by one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeededFormulas {
  names: Vec<String>,
}

impl NeededFormulas {
  pub fn load<S: AsRef<str>>(path: &Path, types: &[S]) -> Result<Self, FormulasManifestError> {
    let content = fs::read_to_string(path).map_err(|source| FormulasManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let needed = Self::parse(&content, types);
    info!(path = %path.display(), count = needed.len(), "loaded platform formulas");
    Ok(needed)
  }

  pub fn parse<S: AsRef<str>>(content: &str, types: &[S]) -> Self {
    let names = content
      .lines()
      .filter_map(|line| match PlatformRow::parse(line) {
        PlatformRow::Formula { kind, name } if types.iter().any(|t| t.as_ref() == kind) => Some(name),
        _ => None,
      })
      .collect();
    Self { names }
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

impl<S: Into<String>> FromIterator<S> for NeededFormulas {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      names: iter.into_iter().map(Into::into).collect(),
    }
  }
}
