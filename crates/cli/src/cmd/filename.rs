//! Implementation of the `wrangle filename` command.

use anyhow::{Result, bail};
use serde::Serialize;

use crate::args::{PlatformArgs, SourceArgs};
use crate::output::{OutputFormat, print_json, print_warning, symbols, truncate_hash};

#[derive(Debug, Serialize)]
struct FilenameRow {
  distro: String,
  filename: String,
  listed: bool,
  sha256: Option<String>,
}

/// Print the bottle filename a formula would have for each acceptable distro,
/// whether the manifest lists it, and the hash the formula declares.
pub fn cmd_filename(name: &str, source: &SourceArgs, platform: &PlatformArgs, output: OutputFormat) -> Result<()> {
  let formulas = source.load_formulas()?;
  let Some(formula) = formulas.get(name) else {
    bail!("Formula file not found for '{}'", name);
  };

  let availability = source.load_availability()?;
  let deriver = source.deriver();
  let distros = platform.distros(&platform.platform()?);

  let mut rows = Vec::with_capacity(distros.len());
  for distro in distros {
    let filename = deriver.derive(formula, &distro)?;
    rows.push(FilenameRow {
      listed: availability.lookup(&filename).is_some(),
      sha256: formula.bottle_hash(&distro).map(str::to_string),
      distro,
      filename,
    });
  }

  if output.is_json() {
    return print_json(&serde_json::json!({
      "formula": formula,
      "bottles": rows,
    }));
  }

  println!("{}", formula);
  for row in &rows {
    let symbol = if row.listed { symbols::SUCCESS } else { symbols::ERROR };
    let sha = row.sha256.as_deref().map(truncate_hash).unwrap_or("-");
    println!("  {} {:<14} {} {}", symbol, row.distro, row.filename, sha);
  }
  if rows.iter().all(|r| !r.listed) {
    print_warning("No hosted bottle for any acceptable distro");
  }

  Ok(())
}
