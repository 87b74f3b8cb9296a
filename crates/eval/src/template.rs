//! `{{…}}` placeholder expansion, run over the action text before it is
//! parsed. Placeholders draw from three sources: the clock the host
//! passes in, the file context, and the note's front matter (`fm:PATH`).
//! Unknown names are errors; a `{{` with no closing `}}` is left as-is.

use std::fmt::Write as _;

use chrono::{DateTime, Local, SecondsFormat};
use marq_core::{Limits, Path, Value};

use crate::error::EvalError;

/// Host-supplied facts about the note being processed.
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    /// File name without directories (e.g. `note.md`)
    pub basename: String,
    /// Vault-relative path (e.g. `projects/note.md`)
    pub path: String,
    /// Directory part of `path`
    pub folder: String,
    pub vault_name: String,
}

/// Expand every complete `{{ name }}` placeholder in `text`.
pub fn expand(
    text: &str,
    value: &Value,
    ctx: &FileContext,
    now: DateTime<Local>,
) -> Result<String, EvalError> {
    expand_with(text, value, ctx, now, &Limits::default())
}

pub fn expand_with(
    text: &str,
    value: &Value,
    ctx: &FileContext,
    now: DateTime<Local>,
    limits: &Limits,
) -> Result<String, EvalError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 2..];
        match tail.find("}}") {
            Some(close) => {
                let name = tail[..close].trim();
                out.push_str(&resolve_name(name, value, ctx, now, limits)?);
                rest = &tail[close + 2..];
            }
            None => {
                // unmatched braces pass through verbatim
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn resolve_name(
    name: &str,
    value: &Value,
    ctx: &FileContext,
    now: DateTime<Local>,
    limits: &Limits,
) -> Result<String, EvalError> {
    if let Some(format) = name.strip_prefix("date:") {
        let mut rendered = String::new();
        write!(rendered, "{}", now.format(format)).map_err(|_| EvalError::InvalidDateFormat {
            format: format.to_string(),
        })?;
        return Ok(rendered);
    }
    if let Some(raw_path) = name.strip_prefix("fm:") {
        let path = Path::parse_with(raw_path, limits).map_err(|e| EvalError::BadTemplatePath {
            message: e.message,
        })?;
        let target = path
            .resolve(value)
            .ok_or_else(|| EvalError::MissingTemplateTarget {
                path: raw_path.to_string(),
            })?;
        return Ok(target.to_string());
    }

    match name {
        "today" => Ok(now.format("%Y-%m-%d").to_string()),
        "now" => Ok(now.to_rfc3339_opts(SecondsFormat::Secs, false)),
        "timestamp" => Ok(now.timestamp().to_string()),
        "year" => Ok(now.format("%Y").to_string()),
        "month" => Ok(now.format("%m").to_string()),
        "day" => Ok(now.format("%d").to_string()),
        "time" => Ok(now.format("%H:%M:%S").to_string()),
        "filename" | "basename" => Ok(ctx.basename.clone()),
        "filepath" => Ok(ctx.path.clone()),
        "folder" => Ok(ctx.folder.clone()),
        "vault" => Ok(ctx.vault_name.clone()),
        other => Err(EvalError::UnknownTemplate {
            name: other.to_string(),
        }),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
