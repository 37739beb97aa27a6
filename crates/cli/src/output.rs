//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, human-readable byte/duration formatting, and Unicode symbols.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use wrangle_lib::resolve::{FormulaOutcome, MissingReason, Resolution};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// First 12 characters of `hash`, cut on a character boundary.
pub fn truncate_hash(hash: &str) -> &str {
  hash.char_indices().nth(12).map_or(hash, |(idx, _)| &hash[..idx])
}

pub fn format_bytes(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;
  const GB: u64 = MB * 1024;

  if bytes >= GB {
    format!("{:.1} GB", bytes as f64 / GB as f64)
  } else if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{} B", bytes)
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// One line per formula: symbol, name, and what happened.
pub fn print_outcome(outcome: &FormulaOutcome) {
  let name = &outcome.formula.name;
  match &outcome.resolution {
    Resolution::Cached { filename } => println!(
      "  {} {} {}",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      name,
      format!("(cached {})", filename).if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
    Resolution::Downloaded { filename, size, .. } => println!(
      "  {} {} {} {}",
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.cyan()),
      name,
      filename,
      format!("({})", format_bytes(*size)).if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
    Resolution::Missing { reason } => {
      println!(
        "  {} {} {}",
        symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
        name,
        format!("(missing: {})", reason).if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
      if let MissingReason::DownloadFailed { attempts } = reason {
        for attempt in attempts {
          println!("      {}: {}", attempt.filename, attempt.error);
        }
      }
    }
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
