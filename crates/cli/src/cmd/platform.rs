use anyhow::Result;

use crate::args::PlatformArgs;
use crate::output::{OutputFormat, print_json};

pub fn cmd_platform(args: &PlatformArgs, output: OutputFormat) -> Result<()> {
  let platform = args.platform()?;
  let distros = args.distros(&platform);

  if output.is_json() {
    return print_json(&serde_json::json!({
      "platform": platform.as_str(),
      "distros": distros,
      "formulas_manifest": platform.formulas_manifest_name(),
    }));
  }

  println!("Platform: {}", platform);
  println!("Distros: {}", distros.join(", "));
  println!("Formulas manifest: {}", platform.formulas_manifest_name());
  Ok(())
}
