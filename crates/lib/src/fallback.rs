//! Source-build fallback for formulas without a usable bottle.
//!
//! When a build tool is configured, each missing formula is bottled with
//! `<tool> bottle --skip-relocation <name>`. Without one the formulas are only
//! reported. Builds run one at a time; a failed build does not stop the rest.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::formula::Formula;

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("failed to spawn '{cmd}': {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildStatus {
  /// No build tool configured; the formula was only reported.
  Skipped,
  Built,
  Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
  pub name: String,
  #[serde(flatten)]
  pub status: BuildStatus,
}

#[derive(Debug, Clone, Default)]
pub struct BuildFallback {
  tool: Option<PathBuf>,
}

impl BuildFallback {
  pub fn new(tool: Option<PathBuf>) -> Self {
    Self { tool }
  }

  pub fn tool(&self) -> Option<&PathBuf> {
    self.tool.as_ref()
  }

  pub async fn run(&self, formulas: &[&Formula]) -> Vec<BuildOutcome> {
    let mut outcomes = Vec::with_capacity(formulas.len());
    for formula in formulas {
      info!(formula = %formula.name, "building bottle");
      let status = match &self.tool {
        None => BuildStatus::Skipped,
        Some(tool) => match bottle(tool, &formula.name).await {
          Ok(()) => BuildStatus::Built,
          Err(e) => {
            warn!(formula = %formula.name, error = %e, "bottle build failed");
            BuildStatus::Failed { message: e.to_string() }
          }
        },
      };
      outcomes.push(BuildOutcome {
        name: formula.name.clone(),
        status,
      });
    }
    outcomes
  }
}

async fn bottle(tool: &Path, name: &str) -> Result<(), BuildError> {
  let cmd = format!("{} bottle --skip-relocation {}", tool.display(), name);
  debug!(cmd = %cmd, "spawning build");

  let output = Command::new(tool)
    .args(["bottle", "--skip-relocation", name])
    .output()
    .await
    .map_err(|source| BuildError::Spawn {
      cmd: cmd.clone(),
      source,
    })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "build stderr");
    }
    return Err(BuildError::CmdFailed {
      cmd,
      code: output.status.code(),
    });
  }

  Ok(())
}
