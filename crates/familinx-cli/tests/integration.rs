//! Integration tests for the familinx CLI
//!
//! These tests run full CLI workflows against a small pedigree store written
//! into a temporary directory. HOME is redirected so no global config leaks
//! into the runs.

use assert_cmd::Command;
use familinx_core::{Gender, SqliteStore, Years};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for the familinx binary, isolated in `dir`
#[allow(deprecated)]
fn familinx(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("familinx").expect("Failed to find familinx binary");
    cmd.current_dir(dir)
        .env("HOME", dir.join("home"))
        .env_remove("FAMILINX_DB")
        .env_remove("FAMILINX_CONFIG");
    cmd
}

/// Write the fixture pedigree to `<dir>/familinx.db`
///
/// ```text
///  1 (m) + 2 (f)
///      |
///   3 (m), 4 (f)
///   3 + 5 (f) -> 6 -> 8
///   3 + 5 (f) -> 7
/// ```
fn setup_store() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let path = temp.path().join("familinx.db");

    let store = SqliteStore::create(&path).expect("Failed to create store");
    for (id, gender) in [
        (1, Gender::Male),
        (2, Gender::Female),
        (3, Gender::Male),
        (4, Gender::Female),
        (5, Gender::Female),
    ] {
        store.insert_gender_code(id, gender.code()).unwrap();
    }
    store
        .insert_relationships(&[
            (1, 3),
            (2, 3),
            (1, 4),
            (2, 4),
            (3, 6),
            (5, 6),
            (3, 7),
            (5, 7),
            (6, 8),
        ])
        .unwrap();
    store.insert_years(3, Years::new(Some(1820), Some(1881))).unwrap();
    store.insert_age(3, Some(61)).unwrap();

    (temp, path)
}

fn write_local_config(dir: &Path, content: &str) {
    let config_dir = dir.join(".familinx");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), content).unwrap();
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is not JSON")
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_store_and_config() {
    let temp = TempDir::new().unwrap();

    familinx(temp.path()).arg("init").assert().success();

    assert!(temp.path().join("familinx.db").exists());
    assert!(temp.path().join(".familinx").join("config.toml").exists());

    // The new store is empty but valid
    familinx(temp.path())
        .args(["--json", "person", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"parents\": []"));
}

#[test]
fn test_init_no_config() {
    let temp = TempDir::new().unwrap();

    familinx(temp.path())
        .args(["init", "--no-config"])
        .assert()
        .success();

    assert!(temp.path().join("familinx.db").exists());
    assert!(!temp.path().join(".familinx").exists());
}

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_person_json() {
    let (temp, _db) = setup_store();

    let json = json_stdout(familinx(temp.path()).args(["--json", "person", "3"]));

    assert_eq!(json["id"], 3);
    assert_eq!(json["gender"], "male");
    assert_eq!(json["age"], 61);
    assert_eq!(json["birth"], 1820);
    assert_eq!(json["parents"], serde_json::json!([1, 2]));
    assert_eq!(json["children"], serde_json::json!([6, 7]));
    assert_eq!(json["mother"], 2);
    assert_eq!(json["father"], 1);
    assert_eq!(json["partners"], serde_json::json!([5]));
}

#[test]
fn test_person_text() {
    let (temp, _db) = setup_store();

    familinx(temp.path())
        .args(["person", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Person: 6"))
        .stdout(predicate::str::contains("Father: 3"))
        .stdout(predicate::str::contains("Mother: 5"))
        .stdout(predicate::str::contains("Children: 8"));
}

#[test]
fn test_person_outside_bounds() {
    let (temp, _db) = setup_store();
    write_local_config(temp.path(), "[population]\nmax_id = 8\n");

    familinx(temp.path())
        .args(["person", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the population bounds"));
}

#[test]
fn test_missing_store() {
    let temp = TempDir::new().unwrap();

    familinx(temp.path())
        .args(["person", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Store not found"));
}

#[test]
fn test_db_flag_overrides_config() {
    let (temp, db) = setup_store();
    let elsewhere = TempDir::new().unwrap();

    familinx(elsewhere.path())
        .arg("--db")
        .arg(&db)
        .args(["person", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parents: 6"));
    drop(temp);
}

#[test]
fn test_descendants() {
    let (temp, _db) = setup_store();

    let json = json_stdout(familinx(temp.path()).args(["--json", "descendants", "1"]));
    let mut ids: Vec<u64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![3, 4, 6, 7, 8]);

    let json = json_stdout(familinx(temp.path()).args([
        "--json",
        "descendants",
        "1",
        "--limit",
        "2",
    ]));
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[test]
fn test_walk_with_radius() {
    let (temp, _db) = setup_store();

    let json = json_stdout(familinx(temp.path()).args(["--json", "walk", "6", "--radius", "1"]));
    let entries = json.as_array().unwrap();

    assert_eq!(entries[0]["id"], 6);
    assert_eq!(entries[0]["distance"], 0);
    let mut ids: Vec<u64> = entries.iter().map(|e| e["id"].as_u64().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![3, 5, 6, 8]);
    assert!(entries.iter().all(|e| e["distance"].as_u64().unwrap() <= 1));
}

#[test]
fn test_walk_female_line() {
    let (temp, _db) = setup_store();

    familinx(temp.path())
        .args(["walk", "4", "--gender", "female"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4\t0"))
        .stdout(predicate::str::contains("2\t1"))
        .stdout(predicate::str::contains("3\t").not());
}

// ============================================================================
// Export Tests
// ============================================================================

#[test]
fn test_export_descendants_without_render() {
    let (temp, _db) = setup_store();

    familinx(temp.path())
        .args(["export", "6", "--output", "out/family.dot", "--descendants", "--no-render"])
        .assert()
        .success();

    let dot = std::fs::read_to_string(temp.path().join("out").join("family.dot")).unwrap();
    assert_eq!(
        dot,
        "digraph graphname {\n6 [fillcolor=gold,style=filled];\n6 -> 8;\n}\n"
    );
}

#[test]
fn test_export_neighborhood_edges_stay_inside() {
    let (temp, _db) = setup_store();

    familinx(temp.path())
        .args(["export", "3", "-o", "near.dot", "--radius", "1", "--no-render"])
        .assert()
        .success();

    let dot = std::fs::read_to_string(temp.path().join("near.dot")).unwrap();
    assert!(dot.contains("1 -> 3;"));
    assert!(dot.contains("3 -> 7;"));
    // 8 is two steps away
    assert!(!dot.contains("-> 8;"));
}

#[test]
fn test_export_reports_missing_renderer() {
    let (temp, _db) = setup_store();
    write_local_config(
        temp.path(),
        "[export]\ncommand = \"familinx-no-such-renderer\"\n",
    );

    familinx(temp.path())
        .args(["export", "1", "-o", "family.dot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    // The DOT file is still written
    assert!(temp.path().join("family.dot").exists());
}

// ============================================================================
// Scan Tests
// ============================================================================

#[test]
fn test_scan_range() {
    let (temp, _db) = setup_store();

    let json = json_stdout(familinx(temp.path()).args([
        "--json", "scan", "--start", "1", "--end", "9",
    ]));

    assert_eq!(json["scanned"], 8);
    assert_eq!(json["founders"], 3);
    assert_eq!(json["leaves"], 3);
    assert_eq!(json["isolated"], 0);
}

#[test]
fn test_scan_uses_configured_bounds() {
    let (temp, _db) = setup_store();
    write_local_config(temp.path(), "[population]\nmin_id = 4\nmax_id = 6\n");

    let json = json_stdout(familinx(temp.path()).args(["--json", "scan"]));
    assert_eq!(json["scanned"], 3);

    familinx(temp.path())
        .args(["scan", "--start", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside population bounds"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_show_merges_local() {
    let (temp, _db) = setup_store();
    write_local_config(temp.path(), "[export]\nformat = \"svg\"\n");

    let json = json_stdout(familinx(temp.path()).args(["--json", "config", "show"]));
    assert_eq!(json["export"]["format"], "svg");
    assert_eq!(json["export"]["command"], "dot");
    assert_eq!(json["population"]["max_id"], 43_589_549);
}

#[test]
fn test_config_path() {
    let temp = TempDir::new().unwrap();

    let json = json_stdout(familinx(temp.path()).args(["--json", "config", "path"]));
    assert_eq!(json["local_exists"], false);
    assert!(json["local"]
        .as_str()
        .unwrap()
        .ends_with("config.toml"));
}

#[test]
fn test_explicit_config_file() {
    let (temp, _db) = setup_store();
    let config = temp.path().join("custom.toml");
    std::fs::write(&config, "[population]\nmin_id = 10\nmax_id = 5\n").unwrap();

    familinx(temp.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
