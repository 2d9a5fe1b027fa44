//! Summary numbers for an index.

use std::collections::HashMap;

use serde::Serialize;

use crate::note::NoteRecord;

const TOP_TAGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteStats {
    pub total_notes: usize,
    /// Distinct tags, compared exactly.
    pub total_tags: usize,
    pub total_words: usize,
    /// Most used tags, ties broken by name.
    pub top_tags: Vec<TagCount>,
}

impl NoteStats {
    pub fn compute(records: &[NoteRecord]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tag in records.iter().flat_map(|r| &r.tags) {
            *counts.entry(tag.as_str()).or_default() += 1;
        }

        let total_tags = counts.len();
        let mut top: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag: tag.to_string(), count })
            .collect();
        top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        top.truncate(TOP_TAGS);

        Self {
            total_notes: records.len(),
            total_tags,
            total_words: records.iter().map(NoteRecord::word_count).sum(),
            top_tags: top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(tags: &[&str], content: &str) -> NoteRecord {
        NoteRecord {
            id: content.to_string(),
            path: format!("{content}.md"),
            title: String::new(),
            created: "2024-01-01".to_string(),
            updated: "2024-01-01".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            links: Vec::new(),
            content: content.to_string(),
            content_hash: String::new(),
        }
    }

    #[test]
    fn test_counts() {
        let records = vec![
            note(&["b", "a"], "one two"),
            note(&["a"], "three"),
            note(&["c", "b"], ""),
        ];
        let stats = NoteStats::compute(&records);

        assert_eq!(stats.total_notes, 3);
        assert_eq!(stats.total_tags, 3);
        assert_eq!(stats.total_words, 3);
        assert_eq!(
            stats.top_tags,
            vec![
                TagCount { tag: "a".into(), count: 2 },
                TagCount { tag: "b".into(), count: 2 },
                TagCount { tag: "c".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_top_tags_capped() {
        let tags: Vec<String> = (0..15).map(|i| format!("t{i:02}")).collect();
        let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
        let stats = NoteStats::compute(&[note(&tag_refs, "x")]);
        assert_eq!(stats.top_tags.len(), 10);
        assert_eq!(stats.top_tags[0].tag, "t00");
    }
}
