//! Platform identification and distro selection.
//!
//! The platform token names the per-platform formula manifest
//! (`<token>-formulas.csv`) and decides which bottle distros are acceptable.

pub mod formulas;
pub mod os;

use std::fmt;
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use os::Os;

pub use formulas::{FormulasManifestError, NeededFormulas, PlatformRow};

/// Distros accepted on macOS, oldest first.
pub const DARWIN_DISTROS: &[&str] = &["sierra", "high_sierra", "mojave"];

/// Distros accepted on every other platform.
pub const LINUX_DISTROS: &[&str] = &["x86_64_linux"];

#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("platform helper command is empty")]
  EmptyHelper,

  #[error("failed to run platform helper '{cmd}': {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  #[error("platform helper '{cmd}' exited with code {code:?}")]
  HelperFailed { cmd: String, code: Option<i32> },

  #[error("platform helper '{cmd}' printed no platform")]
  EmptyOutput { cmd: String },

  #[error("unsupported operating system: {0}")]
  Unsupported(&'static str),
}

/// A normalized platform token such as `darwin` or `ubuntu18`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform(String);

impl Platform {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  /// Run an external helper and take the first line of its stdout as the token.
  ///
  /// The command is split on whitespace; no shell is involved.
  pub fn from_helper(cmd: &str) -> Result<Self, PlatformError> {
    let mut parts = cmd.split_whitespace();
    let program = parts.next().ok_or(PlatformError::EmptyHelper)?;

    debug!(cmd = %cmd, "running platform helper");
    let output = Command::new(program)
      .args(parts)
      .output()
      .map_err(|source| PlatformError::Spawn {
        cmd: cmd.to_string(),
        source,
      })?;

    if !output.status.success() {
      return Err(PlatformError::HelperFailed {
        cmd: cmd.to_string(),
        code: output.status.code(),
      });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let token = stdout.lines().next().map(str::trim).unwrap_or_default();
    if token.is_empty() {
      return Err(PlatformError::EmptyOutput { cmd: cmd.to_string() });
    }

    info!(platform = %token, "platform reported by helper");
    Ok(Self::new(token))
  }

  /// Derive the token from the running operating system.
  pub fn detect() -> Result<Self, PlatformError> {
    let os = Os::current().ok_or(PlatformError::Unsupported(std::env::consts::OS))?;
    Ok(Self::new(os.as_str()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_darwin(&self) -> bool {
    self.0 == Os::MacOs.as_str()
  }

  /// Acceptable bottle distros for this platform, in preference order.
  pub fn distros(&self) -> Vec<String> {
    let distros = if self.is_darwin() { DARWIN_DISTROS } else { LINUX_DISTROS };
    distros.iter().map(|d| d.to_string()).collect()
  }

  /// File name of this platform's formula manifest.
  pub fn formulas_manifest_name(&self) -> String {
    format!("{}-formulas.csv", self.0)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
