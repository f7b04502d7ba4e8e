//! Import parsers and export formatters for `.env` and JSON files.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use zeroize::Zeroizing;

use crate::errors::{LockifyError, Result};

/// Text formats accepted by `import` and produced by `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FileFormat {
    /// KEY=value lines
    Dotenv,
    /// A flat JSON object of strings
    Json,
}

impl FileFormat {
    /// Guess the format from a file extension, defaulting to dotenv.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Dotenv,
        }
    }

    pub fn parse(self, content: &str) -> Result<BTreeMap<String, String>> {
        match self {
            Self::Dotenv => Ok(parse_dotenv(content)),
            Self::Json => parse_json(content),
        }
    }

    pub fn format(self, entries: &BTreeMap<String, Zeroizing<String>>) -> Result<Zeroizing<String>> {
        match self {
            Self::Dotenv => Ok(format_dotenv(entries)),
            Self::Json => format_json(entries),
        }
    }
}

// ── dotenv ──────────────────────────────────────────────────────────

/// Parse a single `.env` line into a (key, value) pair.
///
/// Returns `None` for blank lines, comments, and lines without `=`.
/// Handles: `export` prefix, double/single quotes, values with `=`.
/// Inside double quotes `\n`, `\"` and `\\` are unescaped.
pub fn parse_env_line(line: &str) -> Option<(&str, Cow<'_, str>)> {
    let trimmed = line.trim();

    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
        return None;
    }

    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);

    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() {
        return None;
    }

    let value = if let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    {
        unescape_double_quoted(inner)
    } else if let Some(inner) = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
    {
        Cow::Borrowed(inner)
    } else {
        Cow::Borrowed(value)
    };

    Some((key, value))
}

fn unescape_double_quoted(inner: &str) -> Cow<'_, str> {
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Parse `.env` content into a key-value map. Later duplicates win.
pub fn parse_dotenv(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .filter_map(parse_env_line)
        .map(|(k, v)| (k.to_string(), v.into_owned()))
        .collect()
}

/// Render entries as `KEY=value` lines, quoting values that need it.
pub fn format_dotenv(entries: &BTreeMap<String, Zeroizing<String>>) -> Zeroizing<String> {
    let mut out = Zeroizing::new(String::new());
    for (key, value) in entries {
        out.push_str(key);
        out.push('=');
        if needs_quotes(value) {
            out.push('"');
            for c in value.chars() {
                match c {
                    '\n' => out.push_str("\\n"),
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    other => out.push(other),
                }
            }
            out.push('"');
        } else {
            out.push_str(value);
        }
        out.push('\n');
    }
    out
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$'))
}

// ── JSON ────────────────────────────────────────────────────────────

/// Parse a flat JSON object. Numbers and booleans are stringified.
pub fn parse_json(content: &str) -> Result<BTreeMap<String, String>> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
        .map_err(|e| LockifyError::Validation(format!("failed to decode JSON: {e}")))?;

    map.into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(LockifyError::Validation(format!(
                        "value of '{key}' must be a string, number or boolean"
                    )))
                }
            };
            Ok((key, value))
        })
        .collect()
}

/// Render entries as an indented JSON object.
pub fn format_json(entries: &BTreeMap<String, Zeroizing<String>>) -> Result<Zeroizing<String>> {
    let view: BTreeMap<&str, &str> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    serde_json::to_string_pretty(&view)
        .map(Zeroizing::new)
        .map_err(|e| LockifyError::SerializationError(format!("export: {e}")))
}
