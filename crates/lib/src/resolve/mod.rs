//! Bottle resolution.
//!
//! For every needed formula the resolver ends in one of three states:
//!
//! 1. `Cached`: a non-empty bottle for an acceptable distro is already in
//!    the destination directory
//! 2. `Downloaded`: distros are tried in order; the first bottle listed in
//!    the manifest that downloads successfully wins
//! 3. `Missing`: nothing could be found or fetched; the formula is handed to
//!    the build fallback
//!
//! Formulas are resolved concurrently, bounded by a semaphore. Downloads of
//! the same filename are serialized, and the cache is re-checked once the
//! filename lock is held, so repeated entries never download twice.

pub mod types;

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheError, CacheProbe};
use crate::fetch::{BottleFetcher, FetchError};
use crate::formula::Formula;
use crate::platform::NeededFormulas;

pub use types::{
  Catalog, FailedAttempt, FormulaOutcome, MissingReason, Resolution, ResolveOptions, ResolveReport, State,
};

/// Per-filename download locks.
#[derive(Debug, Default)]
struct InflightDownloads {
  locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InflightDownloads {
  async fn lock_for(&self, filename: &str) -> Arc<Mutex<()>> {
    let mut locks = self.locks.lock().await;
    locks.entry(filename.to_string()).or_default().clone()
  }
}

/// Resolves needed formulas to cached or downloaded bottles.
#[derive(Debug, Clone)]
pub struct Resolver {
  catalog: Arc<Catalog>,
  options: Arc<ResolveOptions>,
  fetcher: BottleFetcher,
  inflight: Arc<InflightDownloads>,
}

impl Resolver {
  pub fn new(catalog: Arc<Catalog>, options: ResolveOptions) -> Result<Self, FetchError> {
    let fetcher = BottleFetcher::new(&options.fetch)?;
    Ok(Self {
      catalog,
      options: Arc::new(options),
      fetcher,
      inflight: Arc::default(),
    })
  }

  /// Resolve every needed formula.
  ///
  /// Never fails as a whole: per-formula problems are captured in that
  /// formula's [`Resolution`], and unknown names in
  /// [`ResolveReport::unresolved`].
  pub async fn resolve(&self, needed: &NeededFormulas) -> ResolveReport {
    info!(
      formulas = needed.len(),
      distros = ?self.options.distros,
      dest = %self.options.dest_dir.display(),
      "resolving bottles"
    );

    let semaphore = Arc::new(Semaphore::new(self.options.parallelism.max(1)));
    let mut join_set = JoinSet::new();
    let mut task_slots = HashMap::new();
    let mut slots: Vec<Option<FormulaOutcome>> = vec![None; needed.len()];
    let mut unresolved = Vec::new();

    for (idx, name) in needed.names().iter().enumerate() {
      let Some(formula) = self.catalog.formulas.get(name) else {
        error!(formula = %name, "formula file not found");
        unresolved.push(name.clone());
        continue;
      };

      let resolver = self.clone();
      let formula = formula.clone();
      let semaphore = semaphore.clone();
      let handle = join_set.spawn(async move {
        let _permit = semaphore.acquire().await.ok();
        let resolution = resolver.resolve_formula(&formula).await;
        (idx, FormulaOutcome { formula, resolution })
      });
      task_slots.insert(handle.id(), (idx, name.clone()));
    }

    while let Some(joined) = join_set.join_next_with_id().await {
      match joined {
        Ok((_, (idx, outcome))) => slots[idx] = Some(outcome),
        Err(e) => {
          let Some((idx, name)) = task_slots.get(&e.id()) else {
            error!(error = %e, "resolution task failed");
            continue;
          };
          error!(formula = %name, error = %e, "resolution task panicked");
          if let Some(formula) = self.catalog.formulas.get(name) {
            slots[*idx] = Some(FormulaOutcome {
              formula: formula.clone(),
              resolution: Resolution::Missing {
                reason: MissingReason::Error { message: e.to_string() },
              },
            });
          }
        }
      }
    }

    let report = ResolveReport {
      outcomes: slots.into_iter().flatten().collect(),
      unresolved,
    };

    info!(
      cached = report.count(State::Cached),
      downloaded = report.count(State::Downloaded),
      missing = report.count(State::Missing),
      unresolved = report.unresolved.len(),
      "resolution complete"
    );

    report
  }

  /// Run the cache / download / missing state machine for one formula.
  pub async fn resolve_formula(&self, formula: &Formula) -> Resolution {
    let options = &self.options;
    let probe = CacheProbe::new(&options.deriver, &options.dest_dir);

    match probe.probe(formula, &options.distros).await {
      Ok(Some(cached)) => return Resolution::Cached { filename: cached.filename },
      Ok(None) => {}
      Err(CacheError::Filename(e)) => {
        warn!(formula = %formula.name, error = %e, "cannot derive bottle filename");
        return Resolution::Missing {
          reason: MissingReason::NoVersion,
        };
      }
      Err(e) => {
        warn!(formula = %formula.name, error = %e, "cache probe failed");
        return Resolution::Missing {
          reason: MissingReason::Error { message: e.to_string() },
        };
      }
    }

    let mut attempts = Vec::new();
    for distro in &options.distros {
      let filename = match options.deriver.derive(formula, distro) {
        Ok(filename) => filename,
        Err(e) => {
          warn!(formula = %formula.name, error = %e, "cannot derive bottle filename");
          return Resolution::Missing {
            reason: MissingReason::NoVersion,
          };
        }
      };

      let Some(record) = self.catalog.availability.lookup(&filename) else {
        debug!(filename = %filename, "bottle not listed");
        continue;
      };

      let lock = self.inflight.lock_for(&filename).await;
      let _guard = lock.lock().await;

      if let Some(size) = non_empty_size(&options.dest_dir.join(&filename)).await {
        debug!(filename = %filename, size, "bottle landed while waiting");
        return Resolution::Cached { filename };
      }

      match self
        .fetcher
        .fetch(self.catalog.availability.hosts(), record, &options.dest_dir)
        .await
      {
        Ok(fetched) => {
          return Resolution::Downloaded {
            filename,
            url: fetched.url,
            size: fetched.size,
          };
        }
        Err(e) => {
          warn!(formula = %formula.name, filename = %filename, error = %e, "bottle download failed");
          attempts.push(FailedAttempt {
            filename,
            error: e.to_string(),
          });
        }
      }
    }

    let reason = if attempts.is_empty() {
      MissingReason::NotAvailable
    } else {
      MissingReason::DownloadFailed { attempts }
    };
    info!(formula = %formula, reason = %reason, "bottle not found");
    Resolution::Missing { reason }
  }
}

async fn non_empty_size(path: &Path) -> Option<u64> {
  match tokio::fs::metadata(path).await {
    Ok(metadata) if metadata.is_file() && metadata.len() > 0 => Some(metadata.len()),
    Ok(_) => None,
    Err(e) if e.kind() == ErrorKind::NotFound => None,
    Err(e) => {
      debug!(path = %path.display(), error = %e, "could not stat bottle");
      None
    }
  }
}
