//! Integration tests for the read-only `tags` and `list` commands.

mod common;

use std::fs;

use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

use common::{add_image, create_test_dataset, tagforge_cmd};

fn json_output(cmd: &mut assert_cmd::Command) -> Value {
    let output = cmd.output().expect("run tagforge");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn record_names(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|record| record["name"].as_str().expect("name").to_string())
        .collect()
}

// ============================================================================
// tags
// ============================================================================

#[test]
fn test_tags_table() {
    let temp = TempDir::new().expect("create temp dir");
    create_test_dataset(temp.path());

    tagforge_cmd()
        .arg("tags")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("TAG"))
        .stdout(predicate::str::contains("grass"))
        .stdout(predicate::str::contains("3 tags across 3 records"));
}

#[test]
fn test_tags_json_first_seen_order() {
    let temp = TempDir::new().expect("create temp dir");
    create_test_dataset(temp.path());

    let tags = json_output(tagforge_cmd().arg("tags").arg(temp.path()).arg("--json"));
    let entries = tags.as_array().expect("array");

    let names: Vec<&str> = entries
        .iter()
        .map(|entry| entry["tag"].as_str().expect("tag"))
        .collect();
    assert_eq!(names, vec!["cat", "grass", "dog"]);
    assert_eq!(entries[0]["records"], 2);
    assert_eq!(entries[1]["records"], 1);
    assert_eq!(entries[0]["color"], Value::Null);
}

#[test]
fn test_tags_palette_from_config() {
    let temp = TempDir::new().expect("create temp dir");
    let dir = temp.path().join("dataset");
    fs::create_dir(&dir).expect("create dataset dir");
    create_test_dataset(&dir);

    let config = temp.path().join("config.yaml");
    fs::write(&config, "ui:\n  palette:\n    cat: red\n").expect("write config");

    let tags = json_output(
        tagforge_cmd()
            .arg("--config")
            .arg(&config)
            .arg("tags")
            .arg(&dir)
            .arg("--json"),
    );
    assert_eq!(tags[0]["tag"], "cat");
    assert_eq!(tags[0]["color"], "red");
    assert_eq!(tags[2]["color"], Value::Null);
}

#[test]
fn test_tags_empty_dataset() {
    let temp = TempDir::new().expect("create temp dir");
    add_image(temp.path(), "blank.png", None);

    tagforge_cmd()
        .arg("tags")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[info] No tags in"))
        .stdout(predicate::str::contains("1 record"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_all_records() {
    let temp = TempDir::new().expect("create temp dir");
    create_test_dataset(temp.path());

    let records = json_output(tagforge_cmd().arg("list").arg(temp.path()).arg("--json"));
    assert_eq!(record_names(&records), vec!["a.png", "b.png", "c.jpg"]);
    assert_eq!(records[0]["key"], 0);
    assert_eq!(records[0]["tags"], serde_json::json!(["cat", "grass"]));
}

#[test]
fn test_list_filter_modes() {
    let temp = TempDir::new().expect("create temp dir");
    create_test_dataset(temp.path());

    let any = json_output(
        tagforge_cmd()
            .arg("list")
            .arg(temp.path())
            .args(["--any", "grass, dog", "--json"]),
    );
    assert_eq!(record_names(&any), vec!["a.png", "b.png", "c.jpg"]);

    let all = json_output(
        tagforge_cmd()
            .arg("list")
            .arg(temp.path())
            .args(["--all", "cat, dog", "--json"]),
    );
    assert_eq!(record_names(&all), vec!["c.jpg"]);

    let exclude = json_output(
        tagforge_cmd()
            .arg("list")
            .arg(temp.path())
            .args(["--exclude", "cat", "--json"]),
    );
    assert_eq!(record_names(&exclude), vec!["b.png"]);
}

#[test]
fn test_list_summary_line() {
    let temp = TempDir::new().expect("create temp dir");
    create_test_dataset(temp.path());

    tagforge_cmd()
        .arg("list")
        .arg(temp.path())
        .args(["--all", "cat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.png"))
        .stdout(predicate::str::contains("2 of 3 records match (include-all cat)"));
}

#[test]
fn test_list_no_match() {
    let temp = TempDir::new().expect("create temp dir");
    create_test_dataset(temp.path());

    tagforge_cmd()
        .arg("list")
        .arg(temp.path())
        .args(["--any", "unicorn"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[info] No matching records"));
}

#[test]
fn test_list_filters_conflict() {
    let temp = TempDir::new().expect("create temp dir");
    create_test_dataset(temp.path());

    tagforge_cmd()
        .arg("list")
        .arg(temp.path())
        .args(["--any", "cat", "--exclude", "dog"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
