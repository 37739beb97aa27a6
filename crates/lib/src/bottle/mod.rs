//! Bottle naming and availability.

pub mod filename;
pub mod manifest;

pub use filename::{FilenameDeriver, FilenameError};
pub use manifest::{AvailabilityIndex, BottleRecord, HostRegistry, ManifestError, ManifestRow};
