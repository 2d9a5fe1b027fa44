//! The note record: the canonical shape of one indexed document.

pub mod extract;
pub mod record;

pub use extract::{MalformedDocument, is_iso_date, parse_note, parse_note_with_digest};
pub use record::{NoteRecord, normalize_rel_path};
