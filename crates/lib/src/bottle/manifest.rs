//! Hosted bottle manifest: which bottles exist and where.
//!
//! The manifest is a comma-separated file with two row kinds:
//!
//! ```text
//! # comment
//! HOST,<key>,<base url>
//! <host key>,<filename>,<sha256>
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::util::csv::{is_skipped, split_row};

const HOST_TAG: &str = "HOST";

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read bottle manifest '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A hosted bottle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BottleRecord {
  /// Symbolic host key, resolved through [`HostRegistry`].
  pub host: String,
  pub filename: String,
  /// Declared content digest.
  pub hash: String,
}

/// Host key to base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRegistry {
  hosts: HashMap<String, String>,
}

impl HostRegistry {
  pub fn insert(&mut self, key: impl Into<String>, url: impl Into<String>) {
    self.hosts.insert(key.into(), url.into());
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.hosts.get(key).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.hosts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.hosts.is_empty()
  }
}

/// A classified manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestRow {
  Host { key: String, url: String },
  Record(BottleRecord),
  Ignored,
}

impl ManifestRow {
  pub fn parse(line: &str) -> Self {
    let fields = split_row(line);
    if is_skipped(&fields) || fields.len() < 3 {
      return ManifestRow::Ignored;
    }

    let mut fields = fields.into_iter();
    let (Some(first), Some(second), Some(third)) = (fields.next(), fields.next(), fields.next()) else {
      return ManifestRow::Ignored;
    };

    if first == HOST_TAG {
      ManifestRow::Host { key: second, url: third }
    } else {
      ManifestRow::Record(BottleRecord {
        host: first,
        filename: second,
        hash: third,
      })
    }
  }
}

/// Available bottles, looked up by exact filename.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
  hosts: HostRegistry,
  records: Vec<BottleRecord>,
  by_filename: HashMap<String, usize>,
}

impl AvailabilityIndex {
  /// Load a manifest file. An unreadable file is fatal; bad rows are skipped.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let index = Self::parse(&content);
    info!(
      path = %path.display(),
      hosts = index.hosts.len(),
      bottles = index.records.len(),
      "loaded bottle manifest"
    );
    Ok(index)
  }

  pub fn parse(content: &str) -> Self {
    let mut index = AvailabilityIndex::default();
    for (line_no, line) in content.lines().enumerate() {
      match ManifestRow::parse(line) {
        ManifestRow::Host { key, url } => index.hosts.insert(key, url),
        ManifestRow::Record(record) => index.insert(record),
        ManifestRow::Ignored => debug!(line = line_no + 1, "skipping manifest row"),
      }
    }
    index
  }

  /// Add a record. The first record for a filename keeps the lookup slot.
  pub fn insert(&mut self, record: BottleRecord) {
    self
      .by_filename
      .entry(record.filename.clone())
      .or_insert(self.records.len());
    self.records.push(record);
  }

  pub fn lookup(&self, filename: &str) -> Option<&BottleRecord> {
    self.by_filename.get(filename).map(|&idx| &self.records[idx])
  }

  pub fn hosts(&self) -> &HostRegistry {
    &self.hosts
  }

  pub fn host_url(&self, key: &str) -> Option<&str> {
    self.hosts.get(key)
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}
