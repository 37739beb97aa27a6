//! SHA-256 helpers for bottle verification.

use sha2::{Digest, Sha256};

use crate::consts::SHA256_HEX_LEN;

/// Lowercase hex SHA-256 of `bytes`.
pub fn hash_bytes(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  hex::encode(hasher.finalize())
}

/// Whether `s` looks like a hex SHA-256 digest. Manifest hashes that do not
/// are treated as unverifiable rather than as mismatches.
pub fn is_sha256_hex(s: &str) -> bool {
  s.len() == SHA256_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}
