//! Boolean search over indexed notes.
//!
//! Queries are whitespace separated terms with `OR`, `NOT` and `-term`
//! operators; double quotes group a phrase into one term. Matching is
//! case-insensitive substring search over title, id, body and tags.

mod engine;
mod highlight;
mod query;

pub use engine::{
    DEFAULT_LIMIT, ListResponse, QueryError, SearchEngine, SearchFilters, SearchHit,
    SearchOptions, SearchResponse,
};
pub use highlight::excerpt;
pub use query::{ParsedQuery, tokenize};

/// Lowercase `s` one character at a time.
///
/// Characters whose lowercase form is longer than one character are kept as
/// they are, so character offsets in the folded string line up with the
/// original.
pub(crate) fn fold_case(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}
