//! Frontmatter parsing from note documents.

use super::types::{Frontmatter, ParsedDocument};
use thiserror::Error;

/// Errors that can occur during frontmatter parsing.
#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Parse frontmatter from document content.
///
/// Frontmatter is delimited by `---` at the start of the document:
/// ```markdown
/// ---
/// id: rust-notes
/// title: Rust notes
/// ---
/// Body text
/// ```
///
/// A document without an opening delimiter, or with no closing one, is all body.
pub fn parse(content: &str) -> Result<ParsedDocument, FrontmatterParseError> {
    let trimmed = content.trim_start();

    let Some(after_first) = trimmed.strip_prefix("---") else {
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    };

    // The opening delimiter must be alone on its line.
    let Some(after_newline) = after_first
        .strip_prefix('\n')
        .or_else(|| after_first.strip_prefix("\r\n"))
    else {
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    };

    let Some((yaml_end, body_start)) = find_closing_delimiter(after_newline) else {
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    };

    let yaml_content = &after_newline[..yaml_end];
    let body = after_newline[body_start..].to_string();

    let frontmatter: Frontmatter = if yaml_content.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)?
    };

    Ok(ParsedDocument { frontmatter: Some(frontmatter), body })
}

/// Locate the closing `---` line.
///
/// Returns the byte offset where the YAML ends and the offset where the body
/// begins (just past the delimiter line and its line break).
fn find_closing_delimiter(content: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim() == "---" {
            return Some((offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}
