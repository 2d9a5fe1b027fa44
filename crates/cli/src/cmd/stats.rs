use std::path::Path;

use notedex_core::stats::NoteStats;
use tabled::{Table, Tabled, settings::Style};

use super::load_records;
use super::output::print_json;
use crate::StatsArgs;

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Notes")]
    count: usize,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, args: StatsArgs) {
    let rc = super::load_config(config, profile);
    let stats = NoteStats::compute(&load_records(&rc));

    if args.json {
        print_json(&stats);
        return;
    }

    println!("Summary:");
    println!("  Total notes: {}", stats.total_notes);
    println!("  Total tags:  {}", stats.total_tags);
    println!("  Total words: {}", stats.total_words);

    if !stats.top_tags.is_empty() {
        let rows: Vec<TagRow> = stats
            .top_tags
            .iter()
            .map(|t| TagRow { tag: t.tag.clone(), count: t.count })
            .collect();
        println!();
        println!("{}", Table::new(&rows).with(Style::rounded()));
    }
}
