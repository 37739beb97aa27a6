//! Formula definitions and the in-memory formula index.
//!
//! A formula directory holds one `<name>.rb` file per package. Each file is
//! scanned line by line (see [`scan`]) until the first `end`, which in
//! practice closes the `bottle do` block. Fields after that point are never
//! seen, and for repeated keys the first occurrence wins.

pub mod scan;
pub mod version;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::{BUILD_DEP_TAG, FORMULA_EXT};

use scan::FormulaLine;
pub use version::extract_version_from_url;

/// Errors that can occur while loading formula definitions.
#[derive(Debug, Error)]
pub enum FormulaError {
  /// The formula directory could not be listed.
  #[error("failed to read formula directory '{path}': {source}")]
  ReadDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A formula definition file could not be read.
  #[error("failed to read formula '{path}': {source}")]
  ReadFile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A declared bottle checksum for one distro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BottleHash {
  pub distro: String,
  pub sha256: String,
}

/// Parsed formula metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Formula {
  pub name: String,
  pub description: Option<String>,
  pub url: Option<String>,
  /// Explicit version, or one inferred from `url`.
  pub version: Option<String>,
  pub revision: Option<String>,
  pub rebuild: Option<String>,
  /// Declared bottles, in definition order.
  pub bottles: Vec<BottleHash>,
  /// Runtime dependencies; build-only dependencies are never recorded.
  pub dependencies: Vec<String>,
}

impl Formula {
  /// Parse a formula definition.
  ///
  /// Never fails: unrecognised or malformed lines are skipped.
  pub fn parse(name: &str, content: &str) -> Self {
    let mut formula = Formula {
      name: name.to_string(),
      ..Default::default()
    };

    for line in content.lines() {
      match FormulaLine::parse(line) {
        FormulaLine::End => break,
        FormulaLine::Desc(v) => set_once(&mut formula.description, v),
        FormulaLine::Url(v) => set_once(&mut formula.url, v),
        FormulaLine::Version(v) => set_once(&mut formula.version, v),
        FormulaLine::Revision(v) => set_once(&mut formula.revision, v),
        FormulaLine::Rebuild(v) => set_once(&mut formula.rebuild, v),
        FormulaLine::DependsOn { name, tag } => {
          if tag.as_deref() != Some(BUILD_DEP_TAG) {
            formula.dependencies.push(name);
          }
        }
        FormulaLine::BottleHash { sha256, distro } => formula.bottles.push(BottleHash { distro, sha256 }),
        FormulaLine::Ignored => {}
      }
    }

    if formula.version.is_none()
      && let Some(url) = &formula.url
    {
      let inferred = extract_version_from_url(url);
      if inferred.is_empty() {
        warn!(formula = %formula.name, url = %url, "could not infer version from url");
      } else {
        debug!(formula = %formula.name, version = %inferred, "inferred version from url");
        formula.version = Some(inferred);
      }
    }

    formula
  }

  /// Declared checksum for `distro`, if any.
  pub fn bottle_hash(&self, distro: &str) -> Option<&str> {
    self
      .bottles
      .iter()
      .find(|b| b.distro == distro)
      .map(|b| b.sha256.as_str())
  }
}

impl std::fmt::Display for Formula {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name)?;
    match &self.version {
      Some(v) => write!(f, " {}", v)?,
      None => write!(f, " (no version)")?,
    }
    if let Some(rev) = &self.revision {
      write!(f, " rev:{}", rev)?;
    }
    if let Some(rebuild) = &self.rebuild {
      write!(f, " rebuild:{}", rebuild)?;
    }
    Ok(())
  }
}

fn set_once(slot: &mut Option<String>, value: String) {
  if slot.is_none() {
    *slot = Some(value);
  }
}

/// All formulas loaded from a definition directory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FormulaIndex {
  formulas: Vec<Formula>,
  by_name: HashMap<String, usize>,
}

impl FormulaIndex {
  /// Load every `*.rb` definition in `dir`.
  ///
  /// Files are read in name order so the index is stable across runs.
  pub fn load(dir: &Path) -> Result<Self, FormulaError> {
    let read_dir_err = |source| FormulaError::ReadDir {
      path: dir.to_path_buf(),
      source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
      let path = entry.map_err(read_dir_err)?.path();
      if path.is_file() && path.extension().is_some_and(|ext| ext == FORMULA_EXT) {
        paths.push(path);
      }
    }
    paths.sort();

    let mut index = FormulaIndex::default();
    for path in paths {
      let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
        continue;
      };
      let bytes = fs::read(&path).map_err(|source| FormulaError::ReadFile {
        path: path.clone(),
        source,
      })?;
      index.insert(Formula::parse(&name, &String::from_utf8_lossy(&bytes)));
    }

    info!(dir = %dir.display(), count = index.len(), "loaded formulas");
    Ok(index)
  }

  /// Add a formula. A later formula with the same name replaces the lookup entry.
  pub fn insert(&mut self, formula: Formula) {
    self.by_name.insert(formula.name.clone(), self.formulas.len());
    self.formulas.push(formula);
  }

  pub fn get(&self, name: &str) -> Option<&Formula> {
    self.by_name.get(name).map(|&idx| &self.formulas[idx])
  }

  pub fn iter(&self) -> impl Iterator<Item = &Formula> {
    self.formulas.iter()
  }

  pub fn len(&self) -> usize {
    self.formulas.len()
  }

  pub fn is_empty(&self) -> bool {
    self.formulas.is_empty()
  }
}

impl FromIterator<Formula> for FormulaIndex {
  fn from_iter<I: IntoIterator<Item = Formula>>(iter: I) -> Self {
    let mut index = FormulaIndex::default();
    for formula in iter {
      index.insert(formula);
    }
    index
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  const ZLIB: &str = r#"class Zlib < Formula
  desc "General-purpose lossless data-compression library"
  homepage "https://zlib.net/"
  url "https://zlib.net/zlib-1.2.11.tar.gz"
  sha256 "c3e5e9fdd5004dcb542feda5ee4f0ff0744628baf8ed2dd5d66f8ca1197cb1a1"
  revision 2

  bottle do
    root_url "https://example.com/bottles"
    cellar :any_skip_relocation
    rebuild 1
    sha256 "1111111111111111111111111111111111111111111111111111111111111111" => :sierra
    sha256 "2222222222222222222222222222222222222222222222222222222222222222" => :x86_64_linux
  end

  depends_on "never-seen"
end
"#;

  #[test]
  fn parses_recognised_fields() {
    let f = Formula::parse("zlib", ZLIB);
    assert_eq!(f.name, "zlib");
    assert_eq!(
      f.description.as_deref(),
      Some("General-purpose lossless data-compression library")
    );
    assert_eq!(f.url.as_deref(), Some("https://zlib.net/zlib-1.2.11.tar.gz"));
    assert_eq!(f.version.as_deref(), Some("1.2.11"));
    assert_eq!(f.revision.as_deref(), Some("2"));
    assert_eq!(f.rebuild.as_deref(), Some("1"));
    assert_eq!(f.bottles.len(), 2);
    assert_eq!(f.bottles[0].distro, "sierra");
    assert_eq!(
      f.bottle_hash("x86_64_linux"),
      Some("2222222222222222222222222222222222222222222222222222222222222222")
    );
  }

  #[test]
  fn scanning_stops_at_first_end() {
    let f = Formula::parse("zlib", ZLIB);
    assert!(f.dependencies.is_empty());
  }

  #[test]
  fn first_version_wins() {
    let content = r#"
  version "1.0"
  if OS.mac?
    version "2.0"
"#;
    let f = Formula::parse("pkg", content);
    assert_eq!(f.version.as_deref(), Some("1.0"));
  }

  #[test]
  fn explicit_version_beats_url() {
    let content = r#"
  url "https://example.com/pkg-9.9.tar.gz"
  version "1.0"
"#;
    let f = Formula::parse("pkg", content);
    assert_eq!(f.version.as_deref(), Some("1.0"));
  }

  #[test]
  fn build_dependencies_are_excluded() {
    let content = r#"
  depends_on "cmake" => :build
  depends_on "openssl"
  depends_on "python" => :optional
  depends_on "pkg-config" => [:build, :test]
"#;
    let f = Formula::parse("pkg", content);
    assert_eq!(f.dependencies, vec!["openssl", "python", "pkg-config"]);
  }

  #[test]
  fn malformed_hash_lines_are_skipped() {
    let content = r#"
  sha256 "abc"
  sha256 "def" => :mojave
"#;
    let f = Formula::parse("pkg", content);
    assert_eq!(
      f.bottles,
      vec![BottleHash {
        distro: "mojave".into(),
        sha256: "def".into(),
      }]
    );
  }

  #[test]
  fn no_version_and_no_url_stays_unversioned() {
    let f = Formula::parse("pkg", "desc \"nothing\"\n");
    assert_eq!(f.version, None);
  }

  #[test]
  fn underivable_url_version_stays_unversioned() {
    let f = Formula::parse("pkg", "url \"https://example.com/archive/master.tar.gz\"\n");
    assert_eq!(f.version, None);
  }

  #[test]
  fn load_reads_only_formula_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("zlib.rb"), ZLIB).unwrap();
    fs::write(
      temp.path().join("autoconf.rb"),
      "url \"https://ftp.gnu.org/gnu/autoconf/autoconf-2.69.tar.gz\"\n",
    )
    .unwrap();
    fs::write(temp.path().join("README.md"), "not a formula").unwrap();

    let index = FormulaIndex::load(temp.path()).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get("autoconf").unwrap().version.as_deref(), Some("2.69"));
    assert!(index.get("README").is_none());

    let names: Vec<_> = index.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["autoconf", "zlib"]);
  }

  #[test]
  fn missing_directory_is_fatal() {
    let temp = TempDir::new().unwrap();
    let err = FormulaIndex::load(&temp.path().join("nope")).unwrap_err();
    assert!(matches!(err, FormulaError::ReadDir { .. }));
  }
}
