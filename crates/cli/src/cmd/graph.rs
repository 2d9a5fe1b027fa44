use std::fs;
use std::path::Path;

use notedex_core::graph::Graph;

use super::load_records;
use crate::GraphArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: GraphArgs) {
    let rc = super::load_config(config, profile);
    let graph = Graph::from_records(&load_records(&rc));

    let json = match serde_json::to_string_pretty(&graph) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing graph: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = fs::create_dir_all(parent)
    {
        eprintln!("Error creating {}: {}", parent.display(), e);
        std::process::exit(1);
    }

    if let Err(e) = fs::write(&args.out, json) {
        eprintln!("Error writing {}: {}", args.out.display(), e);
        std::process::exit(1);
    }

    println!(
        "{} written  nodes:{}  edges:{}",
        args.out.display(),
        graph.meta.count,
        graph.meta.links
    );
}
