//! Implementation of the `wrangle fetch` command.
//!
//! Loads formulas and manifests, resolves every formula the platform needs to
//! a cached or downloaded bottle, and hands the rest to the build fallback.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use wrangle_lib::fallback::{BuildFallback, BuildStatus};
use wrangle_lib::fetch::FetchOptions;
use wrangle_lib::platform::NeededFormulas;
use wrangle_lib::resolve::{Catalog, ResolveOptions, Resolver, State};

use crate::args::{PlatformArgs, SourceArgs};
use crate::output::{
  OutputFormat, format_duration, print_error, print_info, print_json, print_outcome, print_stat, print_success,
  print_warning,
};

pub struct FetchArgs {
  pub source: SourceArgs,
  pub platform: PlatformArgs,
  pub platform_manifest: Option<PathBuf>,
  pub types: Vec<String>,
  pub dest: PathBuf,
  pub jobs: usize,
  pub verify: bool,
  pub timeout: Option<Duration>,
  pub build_tool: Option<PathBuf>,
}

/// Execute the fetch command.
///
/// Exits successfully even when bottles are missing; those formulas are
/// listed and, with `--build-tool`, built from source.
pub fn cmd_fetch(args: FetchArgs, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let platform = args.platform.platform()?;
  let distros = args.platform.distros(&platform);
  info!(platform = %platform, distros = ?distros, "selected platform");

  let formulas = args.source.load_formulas()?;
  let availability = args.source.load_availability()?;

  let manifest_path = args
    .platform_manifest
    .clone()
    .unwrap_or_else(|| args.source.provision_dir.join(platform.formulas_manifest_name()));
  let needed = NeededFormulas::load(&manifest_path, &args.types)
    .with_context(|| format!("Failed to load platform formulas {}", manifest_path.display()))?;

  let options = ResolveOptions {
    distros: distros.clone(),
    dest_dir: args.dest.clone(),
    parallelism: args.jobs,
    deriver: args.source.deriver(),
    fetch: FetchOptions {
      verify: args.verify,
      timeout: args.timeout,
    },
  };
  let catalog = Arc::new(Catalog::new(formulas, availability));
  let resolver = Resolver::new(catalog, options).context("Failed to create bottle fetcher")?;
  let fallback = BuildFallback::new(args.build_tool.clone());

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(resolver.resolve(&needed));
  let missing = report.missing();
  let builds = rt.block_on(fallback.run(&missing));

  if output.is_json() {
    return print_json(&serde_json::json!({
      "platform": platform.as_str(),
      "distros": distros,
      "report": report,
      "builds": builds,
    }));
  }

  print_info(&format!("Platform {} ({})", platform, distros.join(", ")));
  println!();
  for outcome in &report.outcomes {
    print_outcome(outcome);
  }
  for name in &report.unresolved {
    print_error(&format!("Formula file not found for '{}'", name));
  }

  if !missing.is_empty() {
    println!();
    match fallback.tool() {
      None => print_warning(&format!("{} formula(s) need a source build", missing.len())),
      Some(tool) => print_info(&format!("Building missing bottles with {}", tool.display())),
    }
    for build in &builds {
      match &build.status {
        BuildStatus::Skipped => println!("  Building bottle {}", build.name),
        BuildStatus::Built => print_success(&format!("Built bottle {}", build.name)),
        BuildStatus::Failed { message } => print_error(&format!("Build failed for {}: {}", build.name, message)),
      }
    }
  }

  println!();
  print_success("Bottle resolution complete!");
  print_stat("Cached", &report.count(State::Cached).to_string());
  print_stat("Downloaded", &report.count(State::Downloaded).to_string());
  print_stat("Missing", &report.count(State::Missing).to_string());
  if !report.unresolved.is_empty() {
    print_stat("Unknown formulas", &report.unresolved.len().to_string());
  }
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
