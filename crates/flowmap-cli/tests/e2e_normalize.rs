//! E2E tests for `flowmap normalize`, `flowmap stats` and `flowmap config show`.
//!
//! Covers: JSON payload schema, truncation caps from flags and project config,
//! inventory merging, and error rendering for unreadable input.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn flowmap_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flowmap"));
    cmd.current_dir(dir);
    cmd.env("FLOWMAP_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env_remove("FORMAT");
    cmd
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).expect("serialize"))
        .expect("write fixture");
    path
}

/// ds1 → r1 → ds2 → r2 → ds3
fn pipeline() -> Value {
    json!({
        "nodes": {
            "ds1": {"type": "COMPUTABLE_DATASET", "successors": ["r1"]},
            "r1": {"type": "RUNNABLE_RECIPE", "predecessors": ["ds1"], "successors": ["ds2"]},
            "ds2": {"type": "COMPUTABLE_DATASET", "successors": ["r2"]},
            "r2": {"type": "RUNNABLE_RECIPE", "successors": ["ds3"]},
            "ds3": {"type": "COMPUTABLE_DATASET"}
        },
        "datasets": ["ds1", "ds2", "ds3"],
        "recipes": ["r1", "r2"],
        "folders": []
    })
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = flowmap_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("flowmap should not crash");
    assert!(
        output.status.success(),
        "flowmap {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout must be valid JSON")
}

// ---------------------------------------------------------------------------
// flowmap normalize
// ---------------------------------------------------------------------------

#[test]
fn normalize_json_has_map_truncation_and_hash() {
    let dir = TempDir::new().expect("temp dir");
    let file = write_json(dir.path(), "flow.json", &pipeline());

    let report = run_json(
        dir.path(),
        &["normalize", file.to_str().expect("utf8 path"), "--project", "SALES"],
    );

    assert_eq!(report["map"]["projectKey"], "SALES");
    assert_eq!(report["map"]["stats"]["nodeCount"], 5);
    assert_eq!(report["map"]["stats"]["edgeCount"], 4);
    assert_eq!(report["map"]["roots"], json!(["ds1"]));
    assert_eq!(report["map"]["leaves"], json!(["ds3"]));
    assert_eq!(
        report["map"]["edges"][0],
        json!({"from": "ds1", "to": "r1", "relation": "reads"})
    );
    assert_eq!(report["truncation"]["truncated"], false);
    assert_eq!(report["truncation"]["maxNodes"], 300);
    assert_eq!(report["truncation"]["maxEdges"], 600);
    assert!(
        report["contentHash"]
            .as_str()
            .is_some_and(|h| h.starts_with("blake3:"))
    );
}

#[test]
fn normalize_respects_cap_flags() {
    let dir = TempDir::new().expect("temp dir");
    let file = write_json(dir.path(), "flow.json", &pipeline());

    let report = run_json(
        dir.path(),
        &[
            "normalize",
            file.to_str().expect("utf8 path"),
            "--project",
            "SALES",
            "--max-nodes",
            "4",
        ],
    );

    assert_eq!(report["truncation"]["truncated"], true);
    assert_eq!(report["truncation"]["nodeCountAfter"], 4);
    assert_eq!(report["truncation"]["edgeCountAfter"], 2);
    assert_eq!(report["map"]["roots"], json!(["ds1", "ds3"]));
    let warnings = report["map"]["warnings"].as_array().expect("warnings array");
    assert!(
        warnings
            .iter()
            .any(|w| w.as_str().is_some_and(|w| w.starts_with("Map truncated:")))
    );
}

#[test]
fn normalize_uses_project_config_caps() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(dir.path().join(".flowmap")).expect("config dir");
    std::fs::write(
        dir.path().join(".flowmap/config.toml"),
        "[truncate]\nmax_nodes = 2\nmax_edges = 1\n",
    )
    .expect("write config");
    let file = write_json(dir.path(), "flow.json", &pipeline());

    let report = run_json(
        dir.path(),
        &["normalize", file.to_str().expect("utf8 path"), "--project", "SALES"],
    );
    assert_eq!(report["truncation"]["maxNodes"], 2);
    assert_eq!(report["truncation"]["nodeCountAfter"], 2);

    let full = run_json(
        dir.path(),
        &[
            "normalize",
            file.to_str().expect("utf8 path"),
            "--project",
            "SALES",
            "--no-truncate",
        ],
    );
    assert_eq!(full["truncation"]["truncated"], false);
    assert_eq!(full["truncation"]["maxNodes"], Value::Null);
    assert_eq!(full["map"]["stats"]["nodeCount"], 5);
    assert_eq!(full["contentHash"], report["contentHash"]);
}

#[test]
fn normalize_merges_inventory() {
    let dir = TempDir::new().expect("temp dir");
    let file = write_json(dir.path(), "flow.json", &pipeline());
    let inventory = write_json(
        dir.path(),
        "inventory.json",
        &json!({"allDatasetNames": ["ds_isolated"]}),
    );

    let report = run_json(
        dir.path(),
        &[
            "normalize",
            file.to_str().expect("utf8 path"),
            "--project",
            "SALES",
            "--inventory",
            inventory.to_str().expect("utf8 path"),
        ],
    );
    assert_eq!(report["map"]["stats"]["datasets"], 4);
    assert_eq!(report["map"]["roots"], json!(["ds1", "ds_isolated"]));
    assert_eq!(report["map"]["leaves"], json!(["ds3", "ds_isolated"]));
}

#[test]
fn non_object_document_is_a_warning_not_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let file = write_json(dir.path(), "flow.json", &json!([1, 2, 3]));

    let report = run_json(
        dir.path(),
        &["normalize", file.to_str().expect("utf8 path"), "--project", "BAD"],
    );
    assert_eq!(
        report["map"]["warnings"],
        json!(["Flow graph response was not an object."])
    );
    assert_eq!(report["map"]["nodes"], json!([]));
}

#[test]
fn invalid_json_is_rendered_as_error() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("flow.json");
    std::fs::write(&file, "{ not json").expect("write");

    flowmap_cmd(dir.path())
        .args(["normalize", file.to_str().expect("utf8 path"), "--project", "P", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_code\": \"E1002\""));
}

#[test]
fn missing_file_is_rendered_as_error() {
    let dir = TempDir::new().expect("temp dir");

    flowmap_cmd(dir.path())
        .args(["normalize", "missing.json", "--project", "P", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: Flow graph file not found"));
}

#[test]
fn zero_cap_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let file = write_json(dir.path(), "flow.json", &pipeline());

    flowmap_cmd(dir.path())
        .args([
            "normalize",
            file.to_str().expect("utf8 path"),
            "--project",
            "P",
            "--max-edges",
            "0",
            "--json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_code\": \"E2002\""));
}

#[test]
fn text_mode_echoes_warnings_unless_quiet() {
    let dir = TempDir::new().expect("temp dir");
    let file = write_json(
        dir.path(),
        "flow.json",
        &json!({"nodes": {"r1": {"type": "RECIPE", "successors": ["ghost"]}}}),
    );
    let path = file.to_str().expect("utf8 path");

    flowmap_cmd(dir.path())
        .args(["normalize", path, "--project", "P", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("edge r1 ghost unknown"))
        .stderr(predicate::str::contains("warning: Edge references unknown node `ghost`"));

    flowmap_cmd(dir.path())
        .args(["-q", "normalize", path, "--project", "P", "--format", "text"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning:").not());
}

// ---------------------------------------------------------------------------
// flowmap stats / config
// ---------------------------------------------------------------------------

#[test]
fn stats_reports_untruncated_counts() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(dir.path().join(".flowmap")).expect("config dir");
    std::fs::write(
        dir.path().join(".flowmap/config.toml"),
        "[truncate]\nmax_nodes = 1\n",
    )
    .expect("write config");
    let file = write_json(dir.path(), "flow.json", &pipeline());

    let stats = run_json(
        dir.path(),
        &["stats", file.to_str().expect("utf8 path"), "--project", "SALES"],
    );
    assert_eq!(stats["projectKey"], "SALES");
    assert_eq!(stats["stats"]["nodeCount"], 5);
    assert_eq!(stats["stats"]["recipes"], 2);
    assert_eq!(stats["roots"], json!(["ds1"]));
    assert_eq!(stats["warnings"], json!([]));
}

#[test]
fn config_show_reports_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let config = run_json(dir.path(), &["config", "show"]);
    assert_eq!(config["resolved_output"], "json");
    assert_eq!(config["project"]["truncate"]["enabled"], true);
    assert_eq!(config["project"]["truncate"]["max_nodes"], 300);
    assert_eq!(config["project"]["truncate"]["max_edges"], 600);
}

#[test]
fn config_show_reports_format_flag_as_resolved_output() {
    let dir = TempDir::new().expect("temp dir");

    let output = flowmap_cmd(dir.path())
        .args(["config", "show", "--format", "json"])
        .output()
        .expect("flowmap should not crash");
    assert!(output.status.success());
    let config: Value = serde_json::from_slice(&output.stdout).expect("stdout must be valid JSON");
    assert_eq!(config["resolved_output"], "json");

    flowmap_cmd(dir.path())
        .env("FORMAT", "json")
        .args(["config", "show", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resolved_output=text"));
}

#[test]
fn malformed_project_config_is_rendered_as_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(dir.path().join(".flowmap")).expect("config dir");
    std::fs::write(dir.path().join(".flowmap/config.toml"), "[truncate\n").expect("write config");

    flowmap_cmd(dir.path())
        .args(["config", "show", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error_code\": \"E2001\""));
}
