//! Shared output formatting for query commands.

use notedex_core::search::SearchHit;
use serde::Serialize;

/// Print hits as a table.
pub fn print_hits_table(hits: &[SearchHit], with_excerpt: bool) {
    if hits.is_empty() {
        println!("(no notes found)");
        return;
    }

    let id_width = hits.iter().map(|h| h.id.chars().count()).max().unwrap_or(2).clamp(2, 30);
    let title_width =
        hits.iter().map(|h| h.title.chars().count()).max().unwrap_or(5).clamp(5, 40);

    println!(
        "{:<id_width$}  {:<title_width$}  {:<10}  TAGS",
        "ID",
        "TITLE",
        "UPDATED",
        id_width = id_width,
        title_width = title_width,
    );
    println!(
        "{:-<id_width$}  {:-<title_width$}  {:-<10}  {:-<4}",
        "",
        "",
        "",
        "",
        id_width = id_width,
        title_width = title_width,
    );

    for hit in hits {
        println!(
            "{:<id_width$}  {:<title_width$}  {:<10}  {}",
            truncate(&hit.id, id_width),
            truncate(&hit.title, title_width),
            hit.updated,
            hit.tags.join(", "),
            id_width = id_width,
            title_width = title_width,
        );
        if with_excerpt && !hit.excerpt.is_empty() {
            println!("    {}", hit.excerpt);
        }
    }
}

/// Print paths only (quiet mode).
pub fn print_hits_quiet(hits: &[SearchHit]) {
    for hit in hits {
        println!("{}", hit.path);
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

/// Truncate to `max_len` characters with an ellipsis.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
