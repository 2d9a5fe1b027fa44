//! Filtering, ranking and paging.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::fold_case;
use super::highlight::excerpt;
use super::query::ParsedQuery;
use crate::note::{NoteRecord, is_iso_date};

/// Page size when none is given.
pub const DEFAULT_LIMIT: usize = 50;

/// Bodies this long (in characters) take the full length penalty.
const LENGTH_PENALTY_CHARS: f64 = 20_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid query: give search terms or at least one of --tag, --after, --before")]
    InvalidQuery,
}

/// Filters and paging applied around the query terms.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Every tag must be carried by a note (case-insensitive).
    pub tags: Vec<String>,
    /// Inclusive lower bound on `updated`, `YYYY-MM-DD`.
    pub after: Option<String>,
    /// Inclusive upper bound on `updated`, `YYYY-MM-DD`.
    pub before: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { tags: Vec::new(), after: None, before: None, limit: DEFAULT_LIMIT, offset: 0 }
    }
}

/// Filters actually applied, echoed in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub tags: Vec<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub limit: usize,
    pub offset: usize,
    pub negatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub path: String,
    pub updated: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    /// Absent for filter-only queries.
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub filters: SearchFilters,
    /// Matches before paging.
    pub total: usize,
    /// Hits in this page.
    pub count: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub total: usize,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

/// Query engine over a snapshot of records.
///
/// The slice is expected in snapshot order; ties in ranking keep it.
pub struct SearchEngine<'a> {
    records: &'a [NoteRecord],
}

/// Lowercased searchable fields of one record.
struct Folded {
    title: String,
    id: String,
    body: String,
    tags: Vec<String>,
}

impl Folded {
    fn new(record: &NoteRecord) -> Self {
        Self {
            title: fold_case(&record.title),
            id: fold_case(&record.id),
            body: fold_case(&record.content),
            tags: record.tags.iter().map(|t| fold_case(t)).collect(),
        }
    }

    fn contains(&self, term: &str) -> bool {
        self.title.contains(term)
            || self.id.contains(term)
            || self.body.contains(term)
            || self.tags.iter().any(|t| t.contains(term))
    }
}

impl<'a> SearchEngine<'a> {
    pub fn new(records: &'a [NoteRecord]) -> Self {
        Self { records }
    }

    /// Run `query` with `options`.
    ///
    /// Returns [`QueryError::InvalidQuery`] when there are no terms and no
    /// usable filter, before looking at any record.
    pub fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, QueryError> {
        let parsed = ParsedQuery::parse(query);
        let after = date_bound("after", options.after.as_deref());
        let before = date_bound("before", options.before.as_deref());
        let tags: Vec<String> = options
            .tags
            .iter()
            .map(|t| fold_case(t.trim()))
            .filter(|t| !t.is_empty())
            .collect();

        if !parsed.has_terms() && tags.is_empty() && after.is_none() && before.is_none() {
            return Err(QueryError::InvalidQuery);
        }

        let ranked = !parsed.clauses.is_empty();
        let mut terms: Vec<&str> = Vec::new();
        for term in parsed.positive_terms() {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }

        let mut matches: Vec<(&NoteRecord, f64)> = Vec::new();
        for record in self.records {
            if after.is_some_and(|a| record.updated.as_str() < a)
                || before.is_some_and(|b| record.updated.as_str() > b)
            {
                continue;
            }
            if !tags.iter().all(|t| record.tags.iter().any(|rt| fold_case(rt) == *t)) {
                continue;
            }

            let folded = Folded::new(record);
            if parsed.negatives.iter().any(|n| folded.contains(n)) {
                continue;
            }
            if ranked && !parsed.clauses.iter().any(|c| c.iter().all(|t| folded.contains(t))) {
                continue;
            }

            let score = if ranked { score(&folded, &terms) } else { 0.0 };
            matches.push((record, score));
        }

        // Stable: equal keys keep snapshot order.
        matches.sort_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa).then_with(|| b.updated.cmp(&a.updated))
        });

        let total = matches.len();
        let limit = options.limit.max(1);
        let all_terms: Vec<&str> = parsed.positive_terms().collect();
        let results: Vec<SearchHit> = matches
            .into_iter()
            .skip(options.offset)
            .take(limit)
            .map(|(record, score)| SearchHit {
                excerpt: if all_terms.is_empty() {
                    String::new()
                } else {
                    excerpt(&record.content, all_terms.iter().copied())
                },
                score: ranked.then_some(score),
                ..hit(record)
            })
            .collect();

        debug!(query, total, returned = results.len(), "search finished");

        Ok(SearchResponse {
            query: parsed.display(),
            filters: SearchFilters {
                tags,
                after: after.map(str::to_string),
                before: before.map(str::to_string),
                limit,
                offset: options.offset,
                negatives: parsed.negatives.clone(),
            },
            total,
            count: results.len(),
            results,
        })
    }

    /// Records in snapshot order, paged.
    pub fn list(&self, limit: usize, offset: usize) -> ListResponse {
        let results: Vec<SearchHit> =
            self.records.iter().skip(offset).take(limit.max(1)).map(hit).collect();
        ListResponse { total: self.records.len(), count: results.len(), results }
    }
}

fn hit(record: &NoteRecord) -> SearchHit {
    SearchHit {
        id: record.id.clone(),
        title: record.title.clone(),
        path: record.path.clone(),
        updated: record.updated.clone(),
        tags: record.tags.clone(),
        excerpt: String::new(),
        score: None,
    }
}

/// Empty or malformed bounds do not filter.
fn date_bound<'o>(name: &str, value: Option<&'o str>) -> Option<&'o str> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if is_iso_date(value) {
        Some(value)
    } else {
        warn!("Ignoring invalid --{name} date '{value}' (expected YYYY-MM-DD)");
        None
    }
}

fn score(note: &Folded, terms: &[&str]) -> f64 {
    let mut s = 0.0;
    for term in terms {
        if note.title.contains(term) {
            s += 5.0;
        }
        if note.tags.iter().any(|t| t.contains(term)) {
            s += 3.0;
        }
        if note.body.contains(term) {
            s += 2.0;
        }
        if note.id.contains(term) {
            s += 1.0;
        }
        if has_word_start(&note.title, term) {
            s += 1.0;
        }
        if has_word_start(&note.body, term) {
            s += 0.5;
        }
    }

    let len = note.body.chars().count().max(1) as f64;
    s - (len / LENGTH_PENALTY_CHARS).min(1.0)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True if `term` occurs where a word boundary precedes it.
///
/// The boundary is between the preceding character (or the start) and the
/// term's first character: exactly one of the two must be a word character.
fn has_word_start(haystack: &str, term: &str) -> bool {
    let Some(first) = term.chars().next() else {
        return false;
    };
    let starts_word = is_word_char(first);

    haystack.match_indices(term).any(|(idx, _)| {
        let prev_is_word = haystack[..idx].chars().next_back().is_some_and(is_word_char);
        prev_is_word != starts_word
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, title: &str, updated: &str, tags: &[&str], content: &str) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            path: format!("{id}.md"),
            title: title.to_string(),
            created: "2024-01-01".to_string(),
            updated: updated.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            links: Vec::new(),
            content: content.to_string(),
            content_hash: String::new(),
        }
    }

    fn ids(response: &SearchResponse) -> Vec<&str> {
        response.results.iter().map(|h| h.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_without_filters_is_invalid() {
        let records = vec![note("a", "A", "2024-01-01", &[], "")];
        let engine = SearchEngine::new(&records);
        assert_eq!(
            engine.search("  ", &SearchOptions::default()).unwrap_err(),
            QueryError::InvalidQuery
        );

        let bad_date = SearchOptions { after: Some("soon".into()), ..Default::default() };
        assert_eq!(engine.search("", &bad_date).unwrap_err(), QueryError::InvalidQuery);
    }

    #[test]
    fn test_filter_only_query_sorted_by_updated() {
        let records = vec![
            note("old", "Old", "2024-01-01", &["Work"], ""),
            note("new", "New", "2024-03-01", &["work"], ""),
            note("other", "Other", "2024-05-01", &["home"], ""),
        ];
        let engine = SearchEngine::new(&records);
        let options = SearchOptions { tags: vec!["WORK".into()], ..Default::default() };

        let response = engine.search("", &options).unwrap();
        assert_eq!(ids(&response), vec!["new", "old"]);
        assert!(response.results.iter().all(|h| h.score.is_none() && h.excerpt.is_empty()));
    }

    #[test]
    fn test_negatives_only() {
        let records = vec![
            note("keep", "Keep", "2024-01-01", &[], "fine"),
            note("drop", "Drop", "2024-01-02", &["draft"], "fine"),
        ];
        let response = SearchEngine::new(&records).search("-draft", &Default::default()).unwrap();
        assert_eq!(ids(&response), vec!["keep"]);
        assert_eq!(response.filters.negatives, vec!["draft"]);
    }

    #[test]
    fn test_title_outranks_body() {
        let records = vec![
            note("body", "Unrelated", "2024-06-01", &[], "all about rust here"),
            note("title", "Rust notes", "2024-01-01", &[], "nothing else"),
        ];
        let response = SearchEngine::new(&records).search("rust", &Default::default()).unwrap();
        assert_eq!(ids(&response), vec!["title", "body"]);
        assert!(response.results[0].score > response.results[1].score);
    }

    #[test]
    fn test_score_components() {
        let n = note("rust-1", "Rust", "2024-01-01", &["rust"], "rust");
        let folded = Folded::new(&n);
        // title 5 + tag 3 + body 2 + id 1 + title start 1 + body start 0.5 - 4/20000
        let expected = 12.5 - 4.0 / 20_000.0;
        assert!((score(&folded, &["rust"]) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_long_body_penalty_capped() {
        let body = "z".repeat(50_000);
        let n = note("x", "x", "2024-01-01", &[], &body);
        assert_eq!(score(&Folded::new(&n), &[]), -1.0);
    }

    #[test]
    fn test_word_start_boundaries() {
        assert!(has_word_start("hello world", "wor"));
        assert!(!has_word_start("password", "word"));
        assert!(has_word_start("password and words", "word"));
        assert!(has_word_start("snake_case", "snake"));
        assert!(!has_word_start("snake_case", "case"));
        // Term starting with a non-word char needs a word char before it
        assert!(has_word_start("a(b)", "(b"));
        assert!(!has_word_start(" (b)", "(b"));
    }

    #[test]
    fn test_date_bounds_inclusive() {
        let records = vec![
            note("jan", "x", "2024-01-15", &[], ""),
            note("feb", "x", "2024-02-01", &[], ""),
            note("mar", "x", "2024-03-01", &[], ""),
        ];
        let engine = SearchEngine::new(&records);
        let options = SearchOptions {
            after: Some("2024-02-01".into()),
            before: Some("2024-02-28".into()),
            ..Default::default()
        };
        assert_eq!(ids(&engine.search("x", &options).unwrap()), vec!["feb"]);
    }

    #[test]
    fn test_paging_reports_total() {
        let records: Vec<NoteRecord> =
            (0..5).map(|i| note(&format!("n{i}"), "topic", "2024-01-01", &[], "")).collect();
        let engine = SearchEngine::new(&records);
        let options = SearchOptions { limit: 2, offset: 3, ..Default::default() };

        let response = engine.search("topic", &options).unwrap();
        assert_eq!(response.total, 5);
        assert_eq!(response.count, 2);
        assert_eq!(ids(&response), vec!["n3", "n4"]);
    }

    #[test]
    fn test_excerpt_uses_positive_terms() {
        let records = vec![note("a", "A", "2024-01-01", &[], "intro text then the Keyword appears")];
        let response = SearchEngine::new(&records).search("keyword", &Default::default()).unwrap();
        assert_eq!(response.results[0].excerpt, "intro text then the [Keyword] appears");
    }

    #[test]
    fn test_list_pages_snapshot() {
        let records = vec![
            note("a", "A", "2024-02-01", &[], ""),
            note("b", "B", "2024-01-01", &[], ""),
        ];
        let page = SearchEngine::new(&records).list(1, 1);
        assert_eq!(page.total, 2);
        assert_eq!(page.results[0].id, "b");
    }
}
