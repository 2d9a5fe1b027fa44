//! Building a [`NoteRecord`] from raw file bytes.

use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_yaml::Value;
use thiserror::Error;

use super::record::NoteRecord;
use crate::frontmatter::{self, Frontmatter};
use crate::vault::hasher::digest_bytes;

/// A note whose frontmatter cannot produce a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedDocument {
    #[error("document is not valid UTF-8")]
    NotUtf8,

    #[error("{0}")]
    InvalidYaml(String),

    #[error("missing '{field}' in frontmatter")]
    MissingField { field: &'static str },

    #[error("invalid ISO date '{value}' for '{field}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
}

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// `YYYY-MM-DD` and a real calendar day.
pub fn is_iso_date(s: &str) -> bool {
    ISO_DATE_RE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Parse raw bytes for the note at `rel_path` (slash-normalized).
pub fn parse_note(rel_path: &str, raw: &[u8]) -> Result<NoteRecord, MalformedDocument> {
    parse_note_with_digest(rel_path, raw, digest_bytes(raw))
}

/// Same as [`parse_note`] with a digest the caller already computed.
pub fn parse_note_with_digest(
    rel_path: &str,
    raw: &[u8],
    content_hash: String,
) -> Result<NoteRecord, MalformedDocument> {
    let text = std::str::from_utf8(raw).map_err(|_| MalformedDocument::NotUtf8)?;
    let parsed = frontmatter::parse(text)
        .map_err(|e| MalformedDocument::InvalidYaml(e.to_string()))?;
    let fm = parsed.frontmatter.unwrap_or_default();

    let id = scalar(&fm, "id").unwrap_or_else(|| file_stem(rel_path));
    let title = scalar(&fm, "title").ok_or(MalformedDocument::MissingField { field: "title" })?;
    let created = required_date(&fm, "created")?;
    let updated = required_date(&fm, "updated")?;

    Ok(NoteRecord {
        id,
        path: rel_path.to_string(),
        title,
        created,
        updated,
        tags: string_list(&fm, "tags"),
        links: string_list(&fm, "links"),
        content: parsed.body.trim().to_string(),
        content_hash,
    })
}

fn required_date(fm: &Frontmatter, field: &'static str) -> Result<String, MalformedDocument> {
    let value = scalar(fm, field).ok_or(MalformedDocument::MissingField { field })?;
    if !is_iso_date(&value) {
        return Err(MalformedDocument::InvalidDate { field, value });
    }
    Ok(value)
}

/// Non-empty scalar field coerced to a string.
fn scalar(fm: &Frontmatter, key: &str) -> Option<String> {
    fm.get(key).and_then(coerce).filter(|s| !s.trim().is_empty())
}

fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => coerce(&tagged.value),
        _ => None,
    }
}

/// Sequence field as strings, first occurrence kept. Anything else is empty.
fn string_list(fm: &Frontmatter, key: &str) -> Vec<String> {
    let Some(Value::Sequence(items)) = fm.get(key) else {
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for s in items.iter().filter_map(coerce) {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

fn file_stem(rel_path: &str) -> String {
    Path::new(rel_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(rel_path)
        .to_string()
}
