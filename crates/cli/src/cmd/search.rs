//! Search command implementation.

use std::path::Path;

use notedex_core::search::{SearchEngine, SearchOptions};

use super::load_records;
use super::output::{print_hits_quiet, print_hits_table, print_json};
use crate::{OutputFormat, SearchArgs};

pub fn run(config: Option<&Path>, profile: Option<&str>, args: SearchArgs) {
    let rc = super::load_config(config, profile);
    let records = load_records(&rc);

    let options = SearchOptions {
        tags: args.tag,
        after: args.after,
        before: args.before,
        limit: args.limit,
        offset: args.offset,
    };
    let query = args.query.join(" ");

    let engine = SearchEngine::new(&records);
    let response = match engine.search(&query, &options) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!(
                "usage: ndx search \"query (AND/OR/NOT)\" [--tag t1,t2] [--after YYYY-MM-DD] [--before YYYY-MM-DD] [--limit N] [--offset N] [--json]"
            );
            std::process::exit(1);
        }
    };

    match resolve_format(args.output, args.json, args.quiet) {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Quiet => print_hits_quiet(&response.results),
        OutputFormat::Table => {
            if response.results.is_empty() {
                println!("No results.");
                return;
            }
            println!(
                "Found {} result(s). Showing {} (offset {})",
                response.total, response.count, response.filters.offset
            );
            println!();
            print_hits_table(&response.results, true);
        }
    }
}

pub(crate) fn resolve_format(output: OutputFormat, json: bool, quiet: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else if quiet {
        OutputFormat::Quiet
    } else {
        output
    }
}
