//! Line scanner for formula definition files.
//!
//! Definitions are Ruby source, but only a handful of leading tokens matter.
//! Each line is classified on its own; anything unrecognised becomes
//! [`FormulaLine::Ignored`].

/// A classified formula definition line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaLine {
  Desc(String),
  Url(String),
  Version(String),
  Revision(String),
  Rebuild(String),
  /// `depends_on "name" => :tag`
  DependsOn { name: String, tag: Option<String> },
  /// `sha256 "hash" => :distro`
  BottleHash { sha256: String, distro: String },
  /// Terminates scanning of the current formula.
  End,
  Ignored,
}

impl FormulaLine {
  /// Classify a single line.
  pub fn parse(line: &str) -> Self {
    let line = line.trim();
    let (key, value) = match line.split_once(char::is_whitespace) {
      Some((key, value)) => (key, Some(value.trim())),
      None => (line, None),
    };

    match (key, value) {
      ("end", _) => FormulaLine::End,
      ("desc", Some(v)) => FormulaLine::Desc(unquote(v)),
      ("url", Some(v)) => FormulaLine::Url(unquote(v)),
      ("version", Some(v)) => FormulaLine::Version(unquote(v)),
      ("revision", Some(v)) => FormulaLine::Revision(v.to_string()),
      ("rebuild", Some(v)) => FormulaLine::Rebuild(v.to_string()),
      ("depends_on", Some(v)) => parse_dependency(v),
      ("sha256", Some(v)) => parse_bottle_hash(v),
      _ => FormulaLine::Ignored,
    }
  }
}

fn parse_dependency(value: &str) -> FormulaLine {
  let (name, tag) = match value.split_once("=>") {
    Some((name, tag)) => (name, Some(tag.trim().to_string())),
    None => (value, None),
  };

  FormulaLine::DependsOn {
    name: unquote(name),
    tag,
  }
}

fn parse_bottle_hash(value: &str) -> FormulaLine {
  // A bare `sha256 "..."` is the source archive checksum, not a bottle.
  match value.split_once("=>") {
    Some((sha256, distro)) => FormulaLine::BottleHash {
      sha256: unquote(sha256),
      distro: distro.trim().replace(':', ""),
    },
    None => FormulaLine::Ignored,
  }
}

/// Strip surrounding double quotes, keeping only the first quoted string.
fn unquote(value: &str) -> String {
  let value = value.trim();
  match value.strip_prefix('"').and_then(|rest| rest.split_once('"')) {
    Some((inner, _)) => inner.to_string(),
    None => value.replace('"', ""),
  }
}
