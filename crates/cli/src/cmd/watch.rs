//! Watch command: rebuild once, then apply file changes as they happen.

use std::path::Path;

use notedex_core::index::ChangeOutcome;
use notedex_core::vault::{FsChangeSource, NotesWatcher};
use tracing::info;

use super::{load_config, open_indexer};

pub async fn run(config: Option<&Path>, profile: Option<&str>) {
    let rc = load_config(config, profile);

    let source = match FsChangeSource::new(&rc.notes_root, rc.excluded_folders.clone()) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error opening notes root: {}", e);
            std::process::exit(1);
        }
    };

    let indexer = open_indexer(&rc);
    match indexer.rebuild(&source) {
        Ok(report) => println!(
            "Indexed {} notes ({} skipped). Watching {} (Ctrl-C to stop)",
            report.indexed,
            report.failures.len(),
            rc.notes_root.display()
        ),
        Err(e) => {
            eprintln!("Error during initial indexing: {}", e);
            std::process::exit(1);
        }
    }

    let (watcher, mut events) =
        match NotesWatcher::spawn(&rc.notes_root, rc.excluded_folders.clone()) {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("Error starting watcher: {}", e);
                std::process::exit(1);
            }
        };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                let path = event.path().to_string();
                match indexer.apply(event) {
                    Ok(ChangeOutcome::Upserted(outcome)) => {
                        println!("indexed  {path} ({})", outcome.id);
                        if let Some(dup) = outcome.renamed {
                            println!("  id '{}' already taken, using '{}'", dup.original, dup.assigned);
                        }
                    }
                    Ok(ChangeOutcome::Removed(true)) => println!("removed  {path}"),
                    Ok(_) => {}
                    Err(e) => eprintln!("skipped  {path}: {e}"),
                }
                if let Some(err) = indexer.last_save_error() {
                    eprintln!("warning: last save failed: {err}");
                }
            }
        }
    }

    watcher.stop().await;
    if let Err(e) = indexer.shutdown().await {
        eprintln!("Error saving index: {}", e);
        std::process::exit(1);
    }
}
