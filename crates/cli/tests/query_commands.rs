use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn ndx(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ndx"));
    cmd.arg("--config").arg(config);
    cmd
}

/// A notes root with three valid notes and one without a title.
fn setup(backend: &str) -> (TempDir, PathBuf) {
    let tmp = tempdir().unwrap();
    let notes = tmp.path().join("notes");

    write_file(
        &notes.join("rust-async.md"),
        "---\nid: rust-async\ntitle: Async Rust\ncreated: 2024-01-01\nupdated: 2024-03-01\ntags: [rust, async]\n---\nNotes on the tokio runtime.\n",
    );
    write_file(
        &notes.join("garden.md"),
        "---\nid: garden\ntitle: Garden plan\ncreated: 2024-01-01\nupdated: 2024-05-01\ntags: [home]\nlinks: [rust-async]\n---\nTomatoes and basil.\n",
    );
    write_file(
        &notes.join("projects/cli.md"),
        "---\nid: cli\ntitle: CLI tooling\ncreated: 2024-01-01\nupdated: 2024-04-01\ntags: [rust]\n---\nclap and tokio draft.\n",
    );
    write_file(&notes.join("broken.md"), "---\nid: broken\n---\nno title\n");
    write_file(&notes.join("drafts/skip.md"), "---\ntitle: Skipped\ncreated: 2024-01-01\nupdated: 2024-01-01\n---\n");

    let cfg = tmp.path().join("config.toml");
    write_file(
        &cfg,
        &format!(
            r#"
version = 1
[profiles.default]
notes_root = "{}"
backend = "{}"
excluded_folders = ["drafts"]

[logging]
level = "error"
"#,
            notes.display(),
            backend
        ),
    );

    ndx(&cfg)
        .args(["reindex", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes indexed:  3"))
        .stdout(predicate::str::contains("Notes skipped:  1"))
        .stdout(predicate::str::contains("skipped broken.md"));

    (tmp, cfg)
}

#[test]
fn reindex_writes_index_file() {
    let (tmp, _cfg) = setup("json");
    let index = tmp.path().join("notes/.notedex/index.json");
    assert!(index.exists());

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(index).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[test]
fn search_json_ranks_and_excludes() {
    let (_tmp, cfg) = setup("json");

    let out = ndx(&cfg).args(["search", "--json", "tokio", "-draft"]).output().unwrap();
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["query"], "tokio -draft");
    assert_eq!(json["total"], 1);
    assert_eq!(json["results"][0]["id"], "rust-async");
    assert_eq!(json["filters"]["negatives"][0], "draft");
}

#[test]
fn search_with_tag_filter_only() {
    let (_tmp, cfg) = setup("sqlite");

    ndx(&cfg)
        .args(["search", "--tag", "rust", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::eq("projects/cli.md\nrust-async.md\n"));
}

#[test]
fn search_without_terms_or_filters_fails() {
    let (_tmp, cfg) = setup("json");

    ndx(&cfg)
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage: ndx search"));
}

#[test]
fn list_orders_by_updated() {
    let (_tmp, cfg) = setup("json");

    ndx(&cfg)
        .args(["list", "--output", "quiet"])
        .assert()
        .success()
        .stdout(predicate::eq("garden.md\nprojects/cli.md\nrust-async.md\n"));
}

#[test]
fn stats_reports_top_tags() {
    let (_tmp, cfg) = setup("json");

    let out = ndx(&cfg).args(["stats", "--json"]).output().unwrap();
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["total_notes"], 3);
    assert_eq!(json["top_tags"][0]["tag"], "rust");
    assert_eq!(json["top_tags"][0]["count"], 2);
}

#[test]
fn export_writes_tagged_notes() {
    let (tmp, cfg) = setup("json");
    let dir = tmp.path().join("out");

    ndx(&cfg)
        .args(["export", "--tag", "rust,async", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 notes"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("notes-rust_async.json")).unwrap())
            .unwrap();
    assert_eq!(json[0]["id"], "rust-async");
}

#[test]
fn graph_writes_nodes_and_edges() {
    let (tmp, cfg) = setup("json");
    let out = tmp.path().join("graph").join("g.json");

    ndx(&cfg).args(["graph", "--out"]).arg(&out).assert().success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    assert_eq!(json["meta"]["count"], 3);
    assert_eq!(json["meta"]["links"], 1);
    assert_eq!(json["edges"][0]["type"], "LINKS_TO");
    assert!(json["meta"]["generatedAt"].is_string());
}
