//! Integration tests for the command-line interface
//!
//! Tests verify that:
//! - `import` writes to the database and reports a JSON summary
//! - `--dry-run` leaves no database behind
//! - `inspect` lists tables found in the export
//! - Errors exit non-zero with a message on stderr

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn monica_import_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_monica-import"))
}

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/monica_export.sql")
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, stdout))
}

// =============================================================================
// import
// =============================================================================

#[test]
fn test_import_json_summary() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("contacts.db");

    let output = monica_import_bin()
        .arg("import")
        .arg(fixture())
        .arg("--db")
        .arg(&db)
        .args(["--account", "acct", "--json"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json = json_stdout(&output);
    assert_eq!(json["account_id"], "acct");
    assert_eq!(json["counts"]["contacts"], 4);
    assert_eq!(json["counts"]["relationships"], 2);
    assert_eq!(json["counts"]["calls_as_notes"], 2);
    assert!(json["errors"].as_array().unwrap().is_empty());
    assert!(!json["warnings"].as_array().unwrap().is_empty());
    assert!(json["duration_secs"].is_number());
    assert!(db.exists());
}

#[test]
fn test_import_twice_reports_replaced_rows() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("contacts.db");

    for _ in 0..2 {
        let status = monica_import_bin()
            .arg("import")
            .arg(fixture())
            .arg("--db")
            .arg(&db)
            .args(["--account", "acct"])
            .output()
            .unwrap()
            .status;
        assert!(status.success());
    }

    let output = monica_import_bin()
        .arg("import")
        .arg(fixture())
        .arg("--db")
        .arg(&db)
        .args(["--account", "acct", "--json"])
        .output()
        .unwrap();
    let json = json_stdout(&output);
    assert!(json["wiped_rows"].as_u64().unwrap() > 0);
    assert_eq!(json["counts"]["contacts"], 4);
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("never.db");

    let output = monica_import_bin()
        .arg("import")
        .arg(fixture())
        .arg("--dry-run")
        .args(["--account", "acct", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["counts"]["contacts"], 4);
    assert!(!db.exists());
}

#[test]
fn test_import_gzip_export() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&std::fs::read(fixture()).unwrap())
        .unwrap();
    let compressed = encoder.finish().unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monica.sql.gz");
    std::fs::write(&path, compressed).unwrap();

    let output = monica_import_bin()
        .arg("import")
        .arg(&path)
        .args(["--dry-run", "--account", "acct", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["counts"]["gifts"], 2);
}

#[test]
fn test_import_text_summary() {
    let output = monica_import_bin()
        .arg("import")
        .arg(fixture())
        .args(["--dry-run", "--account", "acct"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dry run"));
    assert!(stdout.contains("TOTAL"));
    assert!(stdout.contains("Warnings ("));
    assert!(!stdout.contains("Errors ("));
}

#[test]
fn test_import_with_config() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "skip_tables:\n  - calls\n  - gifts").unwrap();

    let output = monica_import_bin()
        .arg("import")
        .arg(fixture())
        .args(["--dry-run", "--account", "acct", "--json", "--config"])
        .arg(config.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["counts"]["calls_as_notes"], 0);
    assert_eq!(json["counts"]["gifts"], 0);
    assert_eq!(json["counts"]["notes"], 2);
}

#[test]
fn test_import_requires_db_or_dry_run() {
    let output = monica_import_bin()
        .arg("import")
        .arg(fixture())
        .args(["--account", "acct"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--db"));
}

#[test]
fn test_import_missing_file() {
    let output = monica_import_bin()
        .args(["import", "/nonexistent/monica.sql", "--dry-run", "--account", "acct"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_import_invalid_config() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "report_skips: [not, a, bool]").unwrap();

    let output = monica_import_bin()
        .arg("import")
        .arg(fixture())
        .args(["--dry-run", "--account", "acct", "--config"])
        .arg(config.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid config"));
}

// =============================================================================
// inspect
// =============================================================================

#[test]
fn test_inspect_json() {
    let output = monica_import_bin()
        .arg("inspect")
        .arg(fixture())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["compression"], "none");
    assert!(json["statements"].as_u64().unwrap() > 20);

    let tables = json["tables"].as_array().unwrap();
    let contacts = tables.iter().find(|t| t["table"] == "contacts").unwrap();
    assert_eq!(contacts["insert_blocks"], 2);
    assert_eq!(contacts["tuples"], 6);
    assert_eq!(contacts["imported"], true);

    let migrations = tables.iter().find(|t| t["table"] == "migrations");
    assert!(migrations.is_none());

    let issues = json["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
}

#[test]
fn test_inspect_text() {
    let output = monica_import_bin()
        .arg("inspect")
        .arg(fixture())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Table Name"));
    assert!(stdout.contains("relationships"));
    assert!(stdout.contains("Issues (1)"));
}
