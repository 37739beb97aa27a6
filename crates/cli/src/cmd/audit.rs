//! Implementation of the `wrangle audit` command.
//!
//! Prints the manifest rows the formula definitions imply and marks every
//! bottle the bucket does not actually hold.

use anyhow::{Context, Result, bail};

use wrangle_lib::audit::{BucketListing, audit, fetch_bucket_listing};

use crate::args::SourceArgs;
use crate::output::{OutputFormat, print_json, print_stat, print_success, print_warning};

pub struct AuditArgs {
  pub source: SourceArgs,
  pub listing_url: Option<String>,
  pub host: String,
}

pub fn cmd_audit(args: AuditArgs, output: OutputFormat) -> Result<()> {
  let formulas = args.source.load_formulas()?;
  let deriver = args.source.deriver();

  let url = match &args.listing_url {
    Some(url) => url.clone(),
    None => {
      let availability = args.source.load_availability()?;
      match availability.host_url(&args.host) {
        Some(url) => url.to_string(),
        None => bail!("Host '{}' is not defined in the bottle manifest; pass --listing-url", args.host),
      }
    }
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let listing: BucketListing = rt
    .block_on(fetch_bucket_listing(&url))
    .context("Failed to fetch bucket listing")?;

  let report = audit(&formulas, &deriver, &listing);

  if output.is_json() {
    return print_json(&report);
  }

  for row in &report.rows {
    println!("{}", row.manifest_line(&args.host));
    if !row.listed {
      println!("_MISSING,--^^^^--");
    }
  }
  for name in &report.unversioned {
    print_warning(&format!("Skipped '{}': no version", name));
  }

  println!();
  if report.missing_count() == 0 {
    print_success("Every declared bottle is hosted");
  } else {
    print_warning(&format!("{} declared bottle(s) missing from the bucket", report.missing_count()));
  }
  print_stat("Bottles", &report.rows.len().to_string());
  print_stat("Listed files", &listing.len().to_string());

  Ok(())
}
