//! Frontmatter parsing for note documents.
//!
//! Notes carry a YAML header delimited by `---` lines. This module splits the
//! header from the body and decodes it into loosely-typed fields; validation of
//! the note-specific keys happens in [`crate::note`].

pub mod parser;
pub mod types;

pub use parser::{FrontmatterParseError, parse};
pub use types::{Frontmatter, ParsedDocument};
