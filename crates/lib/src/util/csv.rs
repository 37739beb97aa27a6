//! Minimal comma-separated row splitting for the manifest files.
//!
//! Fields may be wrapped in double quotes; a doubled quote inside a quoted
//! field is a literal quote. Surrounding whitespace is trimmed.

/// Split one line into fields. A blank line yields no fields.
pub fn split_row(line: &str) -> Vec<String> {
  let line = line.trim_end_matches(['\r', '\n']);
  if line.trim().is_empty() {
    return Vec::new();
  }

  let mut fields = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut chars = line.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '"' if in_quotes && chars.peek() == Some(&'"') => {
        chars.next();
        field.push('"');
      }
      '"' => in_quotes = !in_quotes,
      ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
      _ => field.push(c),
    }
  }
  fields.push(field.trim().to_string());

  fields
}

/// True for rows the manifest readers skip outright: too short, or a comment.
pub fn is_skipped(fields: &[String]) -> bool {
  fields.len() <= 1 || fields[0].starts_with('#')
}
