//! List command implementation.

use std::path::Path;

use notedex_core::search::SearchEngine;

use super::load_records;
use super::output::{print_hits_quiet, print_hits_table, print_json};
use super::search::resolve_format;
use crate::{ListArgs, OutputFormat};

pub fn run(config: Option<&Path>, profile: Option<&str>, args: ListArgs) {
    let rc = super::load_config(config, profile);
    let records = load_records(&rc);
    let page = SearchEngine::new(&records).list(args.limit, args.offset);

    match resolve_format(args.output, args.json, args.quiet) {
        OutputFormat::Json => print_json(&page),
        OutputFormat::Quiet => print_hits_quiet(&page.results),
        OutputFormat::Table => {
            print_hits_table(&page.results, false);
            println!();
            println!("-- {} of {} notes --", page.count, page.total);
        }
    }
}
