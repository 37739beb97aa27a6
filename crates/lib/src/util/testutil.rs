//! Test helpers shared by unit tests.

use crate::formula::Formula;
use crate::platform::LINUX_DISTROS;

/// A formula with just a name and version.
pub fn formula(name: &str, version: &str) -> Formula {
  Formula {
    name: name.to_string(),
    version: Some(version.to_string()),
    ..Default::default()
  }
}

/// The distro list used on Linux platforms.
pub fn linux_distros() -> Vec<String> {
  LINUX_DISTROS.iter().map(|d| d.to_string()).collect()
}
