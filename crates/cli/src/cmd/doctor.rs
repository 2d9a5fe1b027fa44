use notedex_core::config::{ConfigLoader, default_config_path};
use std::path::Path;

/// Check configuration without touching the index or starting logging.
pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            println!("OK   ndx doctor");
            println!("version: {}", notedex_core::version());
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("notes_root: {}", rc.notes_root.display());
            println!("index_path: {}", rc.index_path.display());
            println!("backend: {:?}", rc.backend);
            println!("save_debounce_ms: {}", rc.index.save_debounce_ms);
            if !rc.excluded_folders.is_empty() {
                let excluded: Vec<String> =
                    rc.excluded_folders.iter().map(|p| p.display().to_string()).collect();
                println!("excluded_folders: {}", excluded.join(", "));
            }
            if !rc.notes_root.is_dir() {
                println!("warning: notes_root does not exist yet");
            }
        }
        Err(e) => {
            println!("FAIL ndx doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
