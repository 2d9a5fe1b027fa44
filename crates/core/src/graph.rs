//! Link graph between notes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::note::NoteRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub path: String,
    pub tags: Vec<String>,
}

/// Edge between two nodes, by index into [`Graph::nodes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMeta {
    pub count: usize,
    pub links: usize,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub meta: GraphMeta,
}

pub const LINKS_TO: &str = "LINKS_TO";

impl Graph {
    pub fn from_records(records: &[NoteRecord]) -> Self {
        Self::build(records, Utc::now())
    }

    /// One node per record in the given order; links to unknown ids are
    /// dropped.
    pub fn build(records: &[NoteRecord], generated_at: DateTime<Utc>) -> Self {
        let index: HashMap<&str, usize> =
            records.iter().enumerate().map(|(i, r)| (r.id.as_str(), i)).collect();

        let nodes: Vec<GraphNode> = records
            .iter()
            .map(|r| GraphNode {
                id: r.id.clone(),
                label: r.title.clone(),
                path: r.path.clone(),
                tags: r.tags.clone(),
            })
            .collect();

        let edges: Vec<GraphEdge> = records
            .iter()
            .enumerate()
            .flat_map(|(source, r)| {
                r.links.iter().filter_map(|link| index.get(link.as_str())).map(move |&target| {
                    GraphEdge { source, target, kind: LINKS_TO.to_string() }
                })
            })
            .collect();

        let meta = GraphMeta { count: nodes.len(), links: edges.len(), generated_at };
        Self { nodes, edges, meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, links: &[&str]) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            path: format!("{id}.md"),
            title: id.to_uppercase(),
            created: "2024-01-01".to_string(),
            updated: "2024-01-01".to_string(),
            tags: vec!["t".to_string()],
            links: links.iter().map(|l| l.to_string()).collect(),
            content: String::new(),
            content_hash: String::new(),
        }
    }

    #[test]
    fn test_edges_skip_unresolved_links() {
        let records = vec![note("a", &["b", "ghost"]), note("b", &["a"]), note("c", &[])];
        let graph = Graph::from_records(&records);

        assert_eq!(graph.meta.count, 3);
        assert_eq!(graph.meta.links, 2);
        assert_eq!(
            graph.edges,
            vec![
                GraphEdge { source: 0, target: 1, kind: LINKS_TO.into() },
                GraphEdge { source: 1, target: 0, kind: LINKS_TO.into() },
            ]
        );
        assert_eq!(graph.nodes[2].label, "C");
    }

    #[test]
    fn test_json_shape() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z").unwrap().with_timezone(&Utc);
        let graph = Graph::build(&[note("a", &["a"])], at);
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["edges"][0]["type"], "LINKS_TO");
        assert_eq!(json["meta"]["generatedAt"], "2024-05-01T10:00:00Z");
        assert_eq!(json["nodes"][0]["label"], "A");
    }
}
