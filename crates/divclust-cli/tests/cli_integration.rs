//! CLI Integration Tests for divclust-cli

#![allow(clippy::unwrap_used)] // Tests can use unwrap

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a divclust command
fn divclust() -> Command {
    Command::cargo_bin("divclust").expect("Failed to find divclust binary")
}

/// Two tight 4x4 grids far apart: ids `left_i` and `right_i`.
fn two_blob_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "id,x,y").unwrap();
    for (name, offset) in [("left", 0.0), ("right", 10.0)] {
        for i in 0..16 {
            let x = offset + (i % 4) as f64 * 0.1;
            let y = offset + (i / 4) as f64 * 0.1;
            writeln!(file, "{name}_{i},{x},{y}").unwrap();
        }
    }
    file
}

fn csv_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(file, "{contents}").unwrap();
    file
}

// ============================================================================
// fit
// ============================================================================

#[test]
fn test_fit_prints_csv_assignments() {
    let file = two_blob_csv();
    let output = divclust()
        .args(["fit", "--method", "pam", "--seed", "1"])
        .arg(file.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("id,cluster"));

    let rows: Vec<(String, String)> = lines
        .map(|l| {
            let (id, cluster) = l.split_once(',').unwrap();
            (id.to_string(), cluster.to_string())
        })
        .collect();
    assert_eq!(rows.len(), 32);

    // the two grids land in different leaves, each grid in one
    let left: Vec<&str> = rows.iter().filter(|(id, _)| id.starts_with("left")).map(|(_, c)| c.as_str()).collect();
    let right: Vec<&str> = rows.iter().filter(|(id, _)| id.starts_with("right")).map(|(_, c)| c.as_str()).collect();
    assert!(left.iter().all(|c| *c == left[0]));
    assert!(right.iter().all(|c| *c == right[0]));
    assert_ne!(left[0], right[0]);
}

#[test]
fn test_fit_json_at_root_level() {
    let file = two_blob_csv();
    divclust()
        .args(["fit", "--method", "pam", "--seed", "1", "--level", "0", "--json"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"level\": 0"))
        .stdout(predicate::str::contains("\"num_levels\": 2"))
        .stdout(predicate::str::contains("\"cluster\": 1").not());
}

#[test]
fn test_fit_reads_config_file() {
    let file = two_blob_csv();
    let config = csv_with(r#"{"method": "pam", "max_k": 1}"#);
    divclust()
        .args(["fit", "--json", "--config"])
        .arg(config.path())
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"num_levels\": 1"));
}

#[test]
fn test_fit_single_row() {
    let file = csv_with("id,x\nonly,1.5\n");
    divclust()
        .arg("fit")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("id,cluster\nonly,0\n"));
}

// ============================================================================
// levels
// ============================================================================

#[test]
fn test_levels_human_output() {
    let file = two_blob_csv();
    divclust()
        .args(["levels", "--method", "pam", "--seed", "3"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Leaves"))
        .stdout(predicate::str::contains("Medoids"));
}

#[test]
fn test_levels_json_output() {
    let file = two_blob_csv();
    divclust()
        .args(["levels", "--method", "pam", "--seed", "3", "--json"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"num_nodes\": 3"))
        .stdout(predicate::str::contains("\"medoids\""));
}

// ============================================================================
// Errors and exit codes
// ============================================================================

#[test]
fn test_missing_file_exit_code() {
    divclust()
        .args(["fit", "/nonexistent/data.csv"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_unknown_method_exit_code() {
    let file = two_blob_csv();
    divclust()
        .args(["fit", "--method", "ward"])
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--method"))
        .stderr(predicate::str::contains("possible values"));
}

#[test]
fn test_non_numeric_feature_exit_code() {
    let file = csv_with("id,x\na,1\nb,two\n");
    divclust()
        .arg("fit")
        .arg(file.path())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not a number"));
}

#[test]
fn test_invalid_alpha_exit_code() {
    let file = two_blob_csv();
    divclust()
        .args(["fit", "--alpha", "1.5"])
        .arg(file.path())
        .assert()
        .code(4);
}

#[test]
fn test_fit_help_lists_methods() {
    divclust()
        .args(["fit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spectral-kmeans"))
        .stdout(predicate::str::contains("spectral-discretize"));
}

#[test]
fn test_help_lists_subcommands() {
    divclust()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fit"))
        .stdout(predicate::str::contains("levels"));
}
