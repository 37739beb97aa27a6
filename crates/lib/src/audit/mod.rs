//! Bottle manifest audit.
//!
//! Regenerates manifest rows from the formula definitions (one row per
//! declared bottle hash) and flags filenames absent from the bucket listing.

pub mod listing;

use serde::Serialize;
use tracing::warn;

use crate::bottle::FilenameDeriver;
use crate::formula::FormulaIndex;

pub use listing::{BucketListing, ListingError, fetch_bucket_listing};

/// One declared bottle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRow {
  pub formula: String,
  pub distro: String,
  pub filename: String,
  pub sha256: String,
  /// Whether the bucket listing contains `filename`.
  pub listed: bool,
}

impl AuditRow {
  /// The row as it would appear in the bottle manifest.
  pub fn manifest_line(&self, host: &str) -> String {
    format!("{},{},{}", host, self.filename, self.sha256)
  }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
  pub rows: Vec<AuditRow>,
  /// Formulas with declared bottles but no derivable version.
  pub unversioned: Vec<String>,
}

impl AuditReport {
  pub fn missing_count(&self) -> usize {
    self.rows.iter().filter(|r| !r.listed).count()
  }
}

pub fn audit(formulas: &FormulaIndex, deriver: &FilenameDeriver, listing: &BucketListing) -> AuditReport {
  let mut report = AuditReport::default();

  for formula in formulas.iter() {
    for bottle in &formula.bottles {
      let filename = match deriver.derive(formula, &bottle.distro) {
        Ok(filename) => filename,
        Err(e) => {
          warn!(formula = %formula.name, error = %e, "skipping unversioned formula");
          report.unversioned.push(formula.name.clone());
          break;
        }
      };

      report.rows.push(AuditRow {
        formula: formula.name.clone(),
        distro: bottle.distro.clone(),
        listed: listing.contains(&filename),
        filename,
        sha256: bottle.sha256.clone(),
      });
    }
  }

  report
}
