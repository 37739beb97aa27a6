//! Bottle download.
//!
//! The body is streamed into `<dest>/<filename>.part` and only renamed to the
//! final name once the transfer (and, if enabled, checksum verification)
//! succeeds. A failed or interrupted download therefore never leaves a
//! non-empty file under the final name; at worst a stale `.part` remains,
//! which the next attempt replaces.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::bottle::{BottleRecord, HostRegistry};
use crate::consts::{APP_NAME, PARTIAL_SUFFIX};
use crate::util::hash::is_sha256_hex;

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("failed to build http client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("unknown bottle host '{0}'")]
  UnknownHost(String),

  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{url} returned HTTP {status}")]
  Status { url: String, status: StatusCode },

  #[error("{url} returned an empty body")]
  EmptyBody { url: String },

  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  #[error("io error on '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl FetchError {
  fn io(path: &Path) -> impl FnOnce(std::io::Error) -> FetchError + '_ {
    move |source| FetchError::Io {
      path: path.to_path_buf(),
      source,
    }
  }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
  /// Check the body against the record's hash when it is a SHA-256 digest.
  pub verify: bool,
  /// Whole-request timeout.
  pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
  fn default() -> Self {
    Self {
      verify: true,
      timeout: None,
    }
  }
}

/// A bottle written to the destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBottle {
  pub url: String,
  pub path: PathBuf,
  pub size: u64,
  pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct BottleFetcher {
  client: reqwest::Client,
  verify: bool,
}

impl BottleFetcher {
  pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
    let mut builder = reqwest::Client::builder().user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = options.timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(FetchError::Client)?;
    Ok(Self {
      client,
      verify: options.verify,
    })
  }

  /// Download `record` from its host into `dest_dir`.
  pub async fn fetch(
    &self,
    hosts: &HostRegistry,
    record: &BottleRecord,
    dest_dir: &Path,
  ) -> Result<FetchedBottle, FetchError> {
    let base = hosts
      .get(&record.host)
      .ok_or_else(|| FetchError::UnknownHost(record.host.clone()))?;
    let url = bottle_url(base, &record.filename);

    fs::create_dir_all(dest_dir).await.map_err(FetchError::io(dest_dir))?;

    let dest = dest_dir.join(&record.filename);
    let partial = dest_dir.join(format!("{}{}", record.filename, PARTIAL_SUFFIX));

    info!(url = %url, "downloading bottle");

    let (size, sha256) = match self.download(&url, &partial, &record.hash).await {
      Ok(done) => done,
      Err(e) => {
        remove_partial(&partial).await;
        return Err(e);
      }
    };

    if let Err(source) = fs::rename(&partial, &dest).await {
      remove_partial(&partial).await;
      return Err(FetchError::Io { path: dest, source });
    }

    info!(path = %dest.display(), size, "download complete");
    Ok(FetchedBottle {
      url,
      path: dest,
      size,
      sha256,
    })
  }

  async fn download(&self, url: &str, partial: &Path, expected: &str) -> Result<(u64, String), FetchError> {
    let request_err = |source| FetchError::Request {
      url: url.to_string(),
      source,
    };

    let mut response = self.client.get(url).send().await.map_err(request_err)?;
    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status,
      });
    }

    remove_partial(partial).await;
    let mut file = fs::OpenOptions::new()
      .write(true)
      .create_new(true)
      .open(partial)
      .await
      .map_err(FetchError::io(partial))?;

    let mut hasher = Sha256::new();
    let mut size = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(request_err)? {
      hasher.update(&chunk);
      size += chunk.len() as u64;
      file.write_all(&chunk).await.map_err(FetchError::io(partial))?;
    }
    file.flush().await.map_err(FetchError::io(partial))?;
    drop(file);

    if size == 0 {
      return Err(FetchError::EmptyBody { url: url.to_string() });
    }

    let actual = hex::encode(hasher.finalize());
    if self.verify {
      if is_sha256_hex(expected) {
        if !actual.eq_ignore_ascii_case(expected) {
          return Err(FetchError::HashMismatch {
            url: url.to_string(),
            expected: expected.to_string(),
            actual,
          });
        }
        debug!(sha256 = %actual, "hash verified");
      } else {
        warn!(url = %url, hash = %expected, "manifest hash is not a sha256 digest, skipping verification");
      }
    }

    Ok((size, actual))
  }
}

fn bottle_url(base: &str, filename: &str) -> String {
  format!("{}/{}", base.trim_end_matches('/'), filename)
}

async fn remove_partial(path: &Path) {
  match fs::remove_file(path).await {
    Ok(()) => debug!(path = %path.display(), "removed partial download"),
    Err(e) if e.kind() == ErrorKind::NotFound => {}
    Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial download"),
  }
}
