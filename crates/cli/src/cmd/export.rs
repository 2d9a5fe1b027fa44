use std::path::Path;

use notedex_core::export::export_by_tags;

use super::load_store;
use crate::ExportArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: ExportArgs) {
    let rc = super::load_config(config, profile);
    let store = load_store(&rc);

    match export_by_tags(&store, &args.tag, &args.dir) {
        Ok(summary) => {
            println!("Exported {} notes to {}", summary.count, summary.path.display());
        }
        Err(e) => {
            eprintln!("Error exporting notes: {}", e);
            std::process::exit(1);
        }
    }
}
