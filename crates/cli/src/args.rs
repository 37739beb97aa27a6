//! Argument groups shared by several commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use wrangle_lib::bottle::{AvailabilityIndex, FilenameDeriver};
use wrangle_lib::consts::CURRENT_LLVM_VERSION;
use wrangle_lib::formula::FormulaIndex;
use wrangle_lib::platform::Platform;

/// Where formula definitions and manifests live.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
  /// Directory holding the formula directory and manifests
  #[arg(long, env = "WRANGLE_PROVISION_DIR", default_value = "./provision")]
  pub provision_dir: PathBuf,

  /// Formula definition directory [default: <provision-dir>/formula]
  #[arg(long)]
  pub formula_dir: Option<PathBuf>,

  /// Hosted bottle manifest [default: <provision-dir>/hosted-bottle-list.csv]
  #[arg(long)]
  pub bottles: Option<PathBuf>,

  /// Version substituted for formulas versioned by `llvm_version`
  #[arg(long, default_value = CURRENT_LLVM_VERSION)]
  pub llvm_version: String,
}

impl SourceArgs {
  pub fn formula_dir(&self) -> PathBuf {
    self
      .formula_dir
      .clone()
      .unwrap_or_else(|| self.provision_dir.join("formula"))
  }

  pub fn bottles_path(&self) -> PathBuf {
    self
      .bottles
      .clone()
      .unwrap_or_else(|| self.provision_dir.join("hosted-bottle-list.csv"))
  }

  pub fn deriver(&self) -> FilenameDeriver {
    FilenameDeriver::new(self.llvm_version.clone())
  }

  pub fn load_formulas(&self) -> Result<FormulaIndex> {
    let dir = self.formula_dir();
    FormulaIndex::load(&dir).with_context(|| format!("Failed to load formulas from {}", dir.display()))
  }

  pub fn load_availability(&self) -> Result<AvailabilityIndex> {
    let path = self.bottles_path();
    AvailabilityIndex::load(&path).with_context(|| format!("Failed to load bottle manifest {}", path.display()))
  }
}

/// How the platform and its distros are determined.
#[derive(Debug, Clone, Args)]
pub struct PlatformArgs {
  /// Platform token (e.g. darwin, ubuntu18); skips the helper
  #[arg(long, env = "WRANGLE_PLATFORM")]
  pub platform: Option<String>,

  /// Command printing the platform token on stdout (e.g. "get_platform.py --platform").
  /// Without it or --platform the token is detected from the running OS (linux, darwin),
  /// which never yields distro-specific tokens such as ubuntu18
  #[arg(long, env = "WRANGLE_PLATFORM_HELPER", value_name = "CMD")]
  pub platform_helper: Option<String>,

  /// Acceptable bottle distro, in preference order (repeatable)
  #[arg(long = "distro", value_name = "DISTRO")]
  pub distros: Vec<String>,
}

impl PlatformArgs {
  /// Explicit token, then helper output, then the running OS.
  pub fn platform(&self) -> Result<Platform> {
    if let Some(token) = &self.platform {
      return Ok(Platform::new(token.clone()));
    }
    if let Some(helper) = &self.platform_helper {
      return Platform::from_helper(helper).context("Failed to determine platform");
    }
    let platform = Platform::detect().context("Failed to determine platform")?;
    debug!(platform = %platform, "detected platform from running os");
    Ok(platform)
  }

  pub fn distros(&self, platform: &Platform) -> Vec<String> {
    if self.distros.is_empty() {
      platform.distros()
    } else {
      self.distros.clone()
    }
  }
}
