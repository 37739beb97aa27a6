//! Constants shared across the crate.

pub const APP_NAME: &str = "wrangle";

/// Tool version substituted into formulas whose version refers to `llvm_version`.
pub const CURRENT_LLVM_VERSION: &str = "6.0.0";

/// Marker some formulas use in place of a literal version.
pub const LLVM_VERSION_PLACEHOLDER: &str = "llvm_version";

/// Dependency tag marking a build-only dependency.
pub const BUILD_DEP_TAG: &str = ":build";

/// File extension of formula definition files.
pub const FORMULA_EXT: &str = "rb";

/// Suffix appended to in-flight downloads before they are moved into place.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Default number of formulas resolved concurrently.
pub const DEFAULT_PARALLELISM: usize = 4;

/// Type tags selected from the platform manifest when none are given.
pub const DEFAULT_FORMULA_TYPES: &[&str] = &["tool", "dep"];

/// Length of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;
