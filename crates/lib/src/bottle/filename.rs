//! Canonical bottle filename derivation.
//!
//! Filenames must match the hosted artifacts byte for byte; any deviation
//! shows up as a bottle that is silently "missing".

use thiserror::Error;

use crate::consts::{CURRENT_LLVM_VERSION, LLVM_VERSION_PLACEHOLDER};
use crate::formula::Formula;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
  /// Neither an explicit nor a URL-derived version is available.
  #[error("formula '{0}' has no version")]
  MissingVersion(String),
}

/// Derives `<name>-<version>[_<revision>].<distro>.bottle[.<rebuild>].tar.gz`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameDeriver {
  llvm_version: String,
}

impl Default for FilenameDeriver {
  fn default() -> Self {
    Self::new(CURRENT_LLVM_VERSION)
  }
}

impl FilenameDeriver {
  pub fn new(llvm_version: impl Into<String>) -> Self {
    Self {
      llvm_version: llvm_version.into(),
    }
  }

  /// Canonical bottle filename for `formula` on `distro`.
  pub fn derive(&self, formula: &Formula, distro: &str) -> Result<String, FilenameError> {
    let version = formula
      .version
      .as_deref()
      .ok_or_else(|| FilenameError::MissingVersion(formula.name.clone()))?;
    let version = self.substitute_llvm_version(version);

    let mut filename = format!("{}-{}", formula.name, version);
    if let Some(revision) = &formula.revision {
      filename.push('_');
      filename.push_str(revision);
    }
    filename.push('.');
    filename.push_str(distro);
    filename.push_str(".bottle");
    if let Some(rebuild) = &formula.rebuild {
      filename.push('.');
      filename.push_str(rebuild);
    }
    filename.push_str(".tar.gz");

    Ok(filename)
  }

  /// Special case for the llvm/libcpp formulas, whose version is a
  /// variable reference rather than a literal. Remove together with the
  /// placeholder once those formulas declare real versions.
  fn substitute_llvm_version<'a>(&'a self, version: &'a str) -> &'a str {
    if version.contains(LLVM_VERSION_PLACEHOLDER) {
      &self.llvm_version
    } else {
      version
    }
  }
}
