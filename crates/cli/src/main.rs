mod args;
mod cmd;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wrangle_lib::consts::{DEFAULT_FORMULA_TYPES, DEFAULT_PARALLELISM};

use args::{PlatformArgs, SourceArgs};
use cmd::{AuditArgs, FetchArgs, cmd_audit, cmd_fetch, cmd_filename, cmd_platform};
use output::OutputFormat;

/// wrangle - Resolve prebuilt bottles before building from source
#[derive(Parser)]
#[command(name = "wrangle")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Fetch bottles for every formula the platform needs
  Fetch {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    platform: PlatformArgs,

    /// Needed-formula manifest [default: <provision-dir>/<platform>-formulas.csv]
    #[arg(long)]
    platform_manifest: Option<PathBuf>,

    /// Formula types to take from the manifest
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_FORMULA_TYPES.iter().map(|t| t.to_string()))]
    types: Vec<String>,

    /// Destination directory, also used as the bottle cache
    #[arg(long, env = "WRANGLE_DEST_DIR", default_value = "./build")]
    dest: PathBuf,

    /// Maximum concurrent resolutions
    #[arg(short, long, env = "WRANGLE_JOBS", default_value_t = DEFAULT_PARALLELISM)]
    jobs: usize,

    /// Skip sha256 verification of downloaded bottles
    #[arg(long)]
    no_verify: bool,

    /// Per-request timeout (e.g. 30s, 5m)
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Tool invoked as `<tool> bottle --skip-relocation <name>` for missing bottles
    #[arg(long)]
    build_tool: Option<PathBuf>,
  },

  /// Show the bottle filenames a formula maps to
  Filename {
    /// Formula name
    name: String,

    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    platform: PlatformArgs,
  },

  /// Compare declared bottles against the bucket listing
  Audit {
    #[command(flatten)]
    source: SourceArgs,

    /// Bucket listing URL [default: the manifest URL of --host]
    #[arg(long)]
    listing_url: Option<String>,

    /// Host key written into regenerated manifest rows
    #[arg(long, default_value = "bottles")]
    host: String,
  },

  /// Show the detected platform and its acceptable distros
  Platform {
    #[command(flatten)]
    platform: PlatformArgs,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Fetch {
      source,
      platform,
      platform_manifest,
      types,
      dest,
      jobs,
      no_verify,
      timeout,
      build_tool,
    } => cmd_fetch(
      FetchArgs {
        source,
        platform,
        platform_manifest,
        types,
        dest,
        jobs,
        verify: !no_verify,
        timeout,
        build_tool,
      },
      cli.output,
    ),
    Commands::Filename { name, source, platform } => cmd_filename(&name, &source, &platform, cli.output),
    Commands::Audit {
      source,
      listing_url,
      host,
    } => cmd_audit(
      AuditArgs {
        source,
        listing_url,
        host,
      },
      cli.output,
    ),
    Commands::Platform { platform } => cmd_platform(&platform, cli.output),
  }
}
