//! Types for bottle resolution.
//!
//! This module defines the resolution options, the immutable catalog the
//! resolver reads from, and the per-formula terminal states it produces.

use std::path::PathBuf;

use serde::Serialize;

use crate::bottle::{AvailabilityIndex, FilenameDeriver};
use crate::consts::DEFAULT_PARALLELISM;
use crate::fetch::FetchOptions;
use crate::formula::{Formula, FormulaIndex};

/// Everything loaded from static inputs at startup. Read-only for the run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
  pub formulas: FormulaIndex,
  pub availability: AvailabilityIndex,
}

impl Catalog {
  pub fn new(formulas: FormulaIndex, availability: AvailabilityIndex) -> Self {
    Self { formulas, availability }
  }
}

/// Configuration for a resolution run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
  /// Acceptable distros, in preference order.
  pub distros: Vec<String>,
  /// Download destination, also used as the cache.
  pub dest_dir: PathBuf,
  /// Maximum formulas resolved concurrently.
  pub parallelism: usize,
  pub deriver: FilenameDeriver,
  pub fetch: FetchOptions,
}

impl ResolveOptions {
  pub fn new(distros: Vec<String>, dest_dir: impl Into<PathBuf>) -> Self {
    Self {
      distros,
      dest_dir: dest_dir.into(),
      parallelism: DEFAULT_PARALLELISM,
      deriver: FilenameDeriver::default(),
      fetch: FetchOptions::default(),
    }
  }
}

/// A download attempt that did not produce a bottle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAttempt {
  pub filename: String,
  pub error: String,
}

/// Why a formula ended up without a bottle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingReason {
  /// No explicit or inferable version, so no filename can be derived.
  NoVersion,
  /// No acceptable distro's filename is listed in the manifest.
  NotAvailable,
  /// Listed bottles exist but every download failed.
  DownloadFailed { attempts: Vec<FailedAttempt> },
  /// Anything else, e.g. the cache directory could not be inspected.
  Error { message: String },
}

impl std::fmt::Display for MissingReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      MissingReason::NoVersion => write!(f, "no version"),
      MissingReason::NotAvailable => write!(f, "no hosted bottle"),
      MissingReason::DownloadFailed { attempts } => write!(f, "{} download(s) failed", attempts.len()),
      MissingReason::Error { message } => write!(f, "{}", message),
    }
  }
}

/// Terminal state of one formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Resolution {
  Cached { filename: String },
  Downloaded { filename: String, url: String, size: u64 },
  Missing { reason: MissingReason },
}

/// Terminal state without its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
  Cached,
  Downloaded,
  Missing,
}

impl Resolution {
  pub fn state(&self) -> State {
    match self {
      Resolution::Cached { .. } => State::Cached,
      Resolution::Downloaded { .. } => State::Downloaded,
      Resolution::Missing { .. } => State::Missing,
    }
  }

  pub fn is_missing(&self) -> bool {
    self.state() == State::Missing
  }
}

/// One needed formula and how it was resolved.
#[derive(Debug, Clone, Serialize)]
pub struct FormulaOutcome {
  pub formula: Formula,
  pub resolution: Resolution,
}

/// Result of a resolution run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveReport {
  /// Outcomes in the order the formulas were requested.
  pub outcomes: Vec<FormulaOutcome>,
  /// Requested names with no formula definition.
  pub unresolved: Vec<String>,
}

impl ResolveReport {
  /// Formulas that need a source build, in request order.
  pub fn missing(&self) -> Vec<&Formula> {
    self
      .outcomes
      .iter()
      .filter(|o| o.resolution.is_missing())
      .map(|o| &o.formula)
      .collect()
  }

  pub fn count(&self, state: State) -> usize {
    self.outcomes.iter().filter(|o| o.resolution.state() == state).count()
  }

  /// `(name, state)` pairs in request order.
  pub fn states(&self) -> Vec<(&str, State)> {
    self
      .outcomes
      .iter()
      .map(|o| (o.formula.name.as_str(), o.resolution.state()))
      .collect()
  }
}
