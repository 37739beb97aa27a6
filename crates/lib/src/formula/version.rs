//! Best-effort version inference from source archive URLs.
//!
//! Formulas that omit an explicit `version` usually encode it in the archive
//! name. The heuristic is deliberately simple and only tuned for the URL
//! shapes seen in practice:
//!
//! - `https://ftp.gnu.org/gnu/autoconf/autoconf-2.69.tar.gz` -> `2.69`
//! - `https://github.com/miloyip/rapidjson/archive/v1.1.0.tar.gz` -> `1.1.0`
//!
//! It is not guaranteed to be correct for arbitrary URLs.

/// Infer a version string from the last path segment of `url`.
///
/// Steps, in order:
/// 1. keep only the text after the final `/`
/// 2. cut everything from the first `.tar`
/// 3. drop a leading run of ASCII letters and `-` (the package name)
/// 4. drop a leading `2-` left behind by names like `libxml2-2.9.7`
pub fn extract_version_from_url(url: &str) -> String {
  let tail = url.rsplit('/').next().unwrap_or(url);

  let stem = match tail.find(".tar") {
    Some(idx) => &tail[..idx],
    None => tail,
  };

  let stem = stem.trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '-');
  let stem = stem.strip_prefix("2-").unwrap_or(stem);

  stem.to_string()
}
