//! `{name}` message templates rendered from error metadata.

use serde_json::Value;
use thiserror::Error;

use crate::error::Metadata;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("message template references `{name}` but metadata has no such field")]
    MissingVariable { name: String },

    #[error("message template has an unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },
}

/// Substitute `{name}` placeholders with metadata values.
///
/// Strings render without quotes, every other JSON value renders as JSON.
/// `{{` and `}}` produce literal braces.
pub fn render(template: &str, metadata: &Metadata) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            consumed += pos + 2;
            continue;
        }
        if tail.starts_with('}') {
            // A lone closing brace is literal text.
            out.push('}');
            rest = &tail[1..];
            consumed += pos + 1;
            continue;
        }

        let end = tail[1..].find('}').ok_or(TemplateError::Unterminated {
            offset: consumed + pos,
        })?;
        let name = tail[1..=end].trim();
        let value = metadata
            .get(name)
            .ok_or_else(|| TemplateError::MissingVariable {
                name: name.to_string(),
            })?;
        match value {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
        rest = &tail[end + 2..];
        consumed += pos + end + 2;
    }

    out.push_str(rest);
    Ok(out)
}
