//! Reindex command implementation.

use std::path::Path;

use notedex_core::vault::FsChangeSource;

use super::{load_config, open_indexer};
use crate::ReindexArgs;

pub async fn run(config: Option<&Path>, profile: Option<&str>, args: ReindexArgs) {
    let rc = load_config(config, profile);

    let source = match FsChangeSource::new(&rc.notes_root, rc.excluded_folders.clone()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error opening notes root: {}", e);
            std::process::exit(1);
        }
    };

    let indexer = open_indexer(&rc);
    println!("Indexing notes: {}", rc.notes_root.display());

    let report = match indexer.rebuild(&source) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("\nError during indexing: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("Indexing complete:");
    println!("  Files found:    {}", report.files_seen);
    println!("  Notes indexed:  {}", report.indexed);
    if !report.failures.is_empty() {
        println!("  Notes skipped:  {}", report.failures.len());
    }
    if !report.duplicates.is_empty() {
        println!("  Ids renamed:    {}", report.duplicates.len());
    }
    println!("  Duration:       {}ms", report.duration_ms);

    if args.verbose {
        for failure in &report.failures {
            println!("  skipped {}: {}", failure.path, failure.message);
        }
        for dup in &report.duplicates {
            println!("  renamed {}: '{}' -> '{}'", dup.path, dup.original, dup.assigned);
        }
    }

    println!();
    println!("Index stored at: {}", rc.index_path.display());

    if let Err(e) = indexer.shutdown().await {
        eprintln!("Error saving index: {}", e);
        std::process::exit(1);
    }
}
