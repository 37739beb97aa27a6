//! Local bottle cache lookup.
//!
//! The destination directory doubles as the cache. A zero-length file is a
//! leftover from an interrupted download: it is removed and never counts as
//! cached.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::bottle::{FilenameDeriver, FilenameError};
use crate::formula::Formula;

#[derive(Debug, Error)]
pub enum CacheError {
  #[error(transparent)]
  Filename(#[from] FilenameError),

  #[error("failed to inspect cached bottle '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// A usable bottle already present in the destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedBottle {
  pub distro: String,
  pub filename: String,
  pub path: PathBuf,
  pub size: u64,
}

/// Checks the destination directory for bottles of a formula.
#[derive(Debug, Clone, Copy)]
pub struct CacheProbe<'a> {
  deriver: &'a FilenameDeriver,
  dest_dir: &'a Path,
}

impl<'a> CacheProbe<'a> {
  pub fn new(deriver: &'a FilenameDeriver, dest_dir: &'a Path) -> Self {
    Self { deriver, dest_dir }
  }

  /// Return the first non-empty bottle matching any of `distros`.
  ///
  /// Empty files found along the way are deleted.
  pub async fn probe(&self, formula: &Formula, distros: &[String]) -> Result<Option<CachedBottle>, CacheError> {
    for distro in distros {
      let filename = self.deriver.derive(formula, distro)?;
      let path = self.dest_dir.join(&filename);

      let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => continue,
        Err(source) => return Err(CacheError::Io { path, source }),
      };

      if !metadata.is_file() {
        warn!(path = %path.display(), "cache entry is not a regular file");
        continue;
      }

      if metadata.len() == 0 {
        debug!(path = %path.display(), "removing empty cached bottle");
        match fs::remove_file(&path).await {
          Ok(()) => {}
          Err(e) if e.kind() == ErrorKind::NotFound => {}
          Err(source) => return Err(CacheError::Io { path, source }),
        }
        continue;
      }

      info!(filename = %filename, "bottle is cached");
      return Ok(Some(CachedBottle {
        distro: distro.clone(),
        filename,
        path,
        size: metadata.len(),
      }));
    }

    Ok(None)
  }
}
