//! `{{placeholder}}` substitution applied to request text before lexing
//!
//! Placeholders name a field of a JSON data object, optionally as a dotted
//! path (`{{user.id}}`, `{{items.0}}`). A leading dot is accepted
//! (`{{.Id}}`). Strings are inserted as-is, other values as compact JSON.
//!
//! A trailing `?` guards a placeholder: `{{token?}}` renders as an empty
//! string when there is no data or the field is absent, where `{{token}}`
//! would fail with `MissingField`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {offset}")]
    Unclosed { offset: usize },

    #[error("invalid placeholder '{{{{{placeholder}}}}}'")]
    InvalidPlaceholder { placeholder: String },

    #[error("no value for '{field}' in template data")]
    MissingField { field: String },
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\.?[A-Za-z_][A-Za-z0-9_]*(?:\.(?:[A-Za-z_][A-Za-z0-9_]*|[0-9]+))*$").unwrap()
    })
}

/// Whether `text` contains anything that looks like a placeholder
pub fn has_placeholders(text: &str) -> bool {
    text.contains("{{")
}

/// Render all placeholders in `text` against `data`.
///
/// Without data, any unguarded placeholder is a `MissingField` error; text
/// with no placeholder comes back unchanged.
pub fn render(text: &str, data: Option<&Value>) -> Result<String, TemplateError> {
    if !has_placeholders(text) {
        return Ok(text.to_string());
    }

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    let mut consumed = 0;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);

        let inner = &rest[start + 2..];
        let end = inner.find("}}").ok_or(TemplateError::Unclosed {
            offset: consumed + start,
        })?;
        let placeholder = inner[..end].trim();
        let (path, guarded) = match placeholder.strip_suffix('?') {
            Some(path) => (path.trim_end(), true),
            None => (placeholder, false),
        };
        if !placeholder_pattern().is_match(path) {
            return Err(TemplateError::InvalidPlaceholder {
                placeholder: placeholder.to_string(),
            });
        }

        match resolve(data, path) {
            Ok(value) => output.push_str(&value),
            Err(TemplateError::MissingField { .. }) if guarded => {}
            Err(e) => return Err(e),
        }

        let advance = start + 2 + end + 2;
        consumed += advance;
        rest = &rest[advance..];
    }

    output.push_str(rest);
    Ok(output)
}

fn resolve(data: Option<&Value>, placeholder: &str) -> Result<String, TemplateError> {
    let path = placeholder.strip_prefix('.').unwrap_or(placeholder);
    let missing = || TemplateError::MissingField {
        field: path.to_string(),
    };

    let mut current = data.ok_or_else(missing)?;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(missing)?;
    }

    Ok(match current {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
