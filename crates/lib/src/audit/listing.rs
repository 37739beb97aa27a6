//! S3-style bucket listings.
//!
//! A `ListBucketResult` document is scanned for `<Key>` elements naming
//! bottle tarballs. This is a text scan, not an XML parse.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ListingError {
  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{url} returned HTTP {status}")]
  Status { url: String, status: reqwest::StatusCode },
}

/// Bottle filenames present in a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketListing {
  files: BTreeSet<String>,
}

impl BucketListing {
  /// Extract bottle basenames from a listing document.
  pub fn parse(xml: &str) -> Self {
    let files = xml
      .replace("</Key>", "<Key>")
      .split("<Key>")
      .filter(|part| !part.contains(['<', '>']) && is_bottle_key(part))
      .map(|part| part.rsplit('/').next().unwrap_or(part).to_string())
      .collect();
    Self { files }
  }

  pub fn contains(&self, filename: &str) -> bool {
    self.files.contains(filename)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.files.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}

impl<S: Into<String>> FromIterator<S> for BucketListing {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      files: iter.into_iter().map(Into::into).collect(),
    }
  }
}

/// `bottle` followed somewhere later by `.tar`.
fn is_bottle_key(key: &str) -> bool {
  key
    .find("bottle")
    .is_some_and(|idx| key[idx + "bottle".len()..].contains(".tar"))
}

/// The bucket root for a bottle URL: everything before `/bottles`.
pub fn bucket_root(url: &str) -> &str {
  match url.find("/bottles") {
    Some(idx) => &url[..idx],
    None => url,
  }
}

/// Download and parse the listing of the bucket hosting `url`.
pub async fn fetch_bucket_listing(url: &str) -> Result<BucketListing, ListingError> {
  let root = bucket_root(url);
  info!(url = %root, "fetching bucket listing");

  let request_err = |source| ListingError::Request {
    url: root.to_string(),
    source,
  };
  let response = reqwest::get(root).await.map_err(request_err)?;
  let status = response.status();
  if !status.is_success() {
    return Err(ListingError::Status {
      url: root.to_string(),
      status,
    });
  }

  let body = response.text().await.map_err(request_err)?;
  let listing = BucketListing::parse(&body);
  debug!(files = listing.len(), "parsed bucket listing");
  Ok(listing)
}
