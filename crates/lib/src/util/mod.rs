//! Shared utilities.
//!
//! Row splitting for the manifest files, hashing, and test helpers.

pub mod csv;
pub mod hash;

#[cfg(test)]
pub mod testutil;
