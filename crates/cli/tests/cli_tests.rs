use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn msgpipe() -> Command {
    let mut cmd = Command::cargo_bin("msgpipe").unwrap();
    cmd.env_remove("MSGPIPE_TABLE").env_remove("MSGPIPE_DECODE_MODE").env_remove("RUST_LOG");
    cmd
}

fn write_inputs(dir: &Path, messages: &str, categories: &str) -> (PathBuf, PathBuf) {
    let messages_path = dir.join("messages.csv");
    let categories_path = dir.join("categories.csv");
    std::fs::write(&messages_path, messages).unwrap();
    std::fs::write(&categories_path, categories).unwrap();
    (messages_path, categories_path)
}

fn query_rows(db: &Path, sql: &str) -> Vec<(i64, String, i64, i64)> {
    let conn = Connection::open(db).unwrap();
    let mut stmt = conn.prepare(sql).unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap()
}

#[test]
fn test_cli_help() {
    msgpipe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("decode the packed labels"));
}

#[test]
fn test_wrong_argument_count_does_nothing() {
    let dir = TempDir::new().unwrap();
    let (messages, categories) = write_inputs(dir.path(), "id,message\n1,help\n", "id,categories\n1,related-1\n");

    msgpipe()
        .arg(&messages)
        .arg(&categories)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));

    msgpipe().assert().failure().stderr(predicate::str::contains("Usage"));

    msgpipe()
        .arg(&messages)
        .arg(&categories)
        .arg(dir.path().join("out.db"))
        .arg("extra")
        .assert()
        .failure();

    assert!(!dir.path().join("out.db").exists());
}

#[test]
fn test_end_to_end() {
    let dir = TempDir::new().unwrap();
    let (messages, categories) = write_inputs(
        dir.path(),
        "id,message\n1,help\n",
        "id,categories\n1,related-1;request-0\n",
    );
    let db = dir.path().join("out.db");

    msgpipe()
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Loading data..."))
        .stdout(predicate::str::contains("Cleaning data..."))
        .stdout(predicate::str::contains("Cleaned data saved to database!"));

    let rows = query_rows(&db, "SELECT id, message, related, request FROM Dataset");
    assert_eq!(rows, vec![(1, "help".to_owned(), 1, 0)]);

    let conn = Connection::open(&db).unwrap();
    let columns: Vec<String> = conn
        .prepare("SELECT name FROM pragma_table_info('Dataset') ORDER BY cid")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(columns, vec!["id", "message", "related", "request"]);
}

#[test]
fn test_end_to_end_filters_invalid_rows() {
    let dir = TempDir::new().unwrap();
    let (messages, categories) = write_inputs(
        dir.path(),
        "id,message\n1,help\n2,unclear\n",
        "id,categories\n1,related-1;request-0\n2,related-2;request-1\n",
    );
    let db = dir.path().join("out.db");

    msgpipe().arg(&messages).arg(&categories).arg(&db).assert().success();

    let rows = query_rows(&db, "SELECT id, message, related, request FROM Dataset ORDER BY id");
    assert_eq!(rows, vec![(1, "help".to_owned(), 1, 0)]);
}

#[test]
fn test_rerun_replaces_table() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("out.db");

    let (messages, categories) = write_inputs(
        dir.path(),
        "id,message\n1,help\n2,water\n",
        "id,categories\n1,related-1;request-0\n2,related-1;request-1\n",
    );
    msgpipe().arg(&messages).arg(&categories).arg(&db).assert().success();

    let (messages, categories) =
        write_inputs(dir.path(), "id,message\n3,storm\n", "id,categories\n3,related-0;request-0\n");
    msgpipe().arg(&messages).arg(&categories).arg(&db).assert().success();

    let rows = query_rows(&db, "SELECT id, message, related, request FROM Dataset");
    assert_eq!(rows, vec![(3, "storm".to_owned(), 0, 0)]);
}

#[test]
fn test_custom_table_and_json_summary() {
    let dir = TempDir::new().unwrap();
    let (messages, categories) = write_inputs(
        dir.path(),
        "id,message\n1,help\n2,unclear\n",
        "id,categories\n1,related-1;request-0\n2,related-2;request-1\n",
    );
    let db = dir.path().join("nested").join("out.db");

    let output = msgpipe()
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .args(["--table", "messages_clean", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["table"], "messages_clean");
    assert_eq!(summary["rows_loaded"], 2);
    assert_eq!(summary["dropped_invalid"], 1);
    assert_eq!(summary["rows_written"], 1);
    assert_eq!(summary["mode"], "lenient");
    assert_eq!(summary["indicators"], serde_json::json!(["related", "request"]));

    let rows = query_rows(&db, "SELECT id, message, related, request FROM messages_clean");
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_table_from_env() {
    let dir = TempDir::new().unwrap();
    let (messages, categories) =
        write_inputs(dir.path(), "id,message\n1,help\n", "id,categories\n1,related-1;request-0\n");
    let db = dir.path().join("out.db");

    msgpipe()
        .env("MSGPIPE_TABLE", "from_env")
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .assert()
        .success();

    let rows = query_rows(&db, "SELECT id, message, related, request FROM from_env");
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_strict_mode_rejects_drift_and_keeps_previous_table() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("out.db");

    let (messages, categories) =
        write_inputs(dir.path(), "id,message\n1,help\n", "id,categories\n1,related-1;request-0\n");
    msgpipe().arg(&messages).arg(&categories).arg(&db).assert().success();

    let (messages, categories) = write_inputs(
        dir.path(),
        "id,message\n1,help\n2,water\n",
        "id,categories\n1,related-1;request-0\n2,request-1;related-0\n",
    );
    msgpipe()
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("differ from"));

    let rows = query_rows(&db, "SELECT id, message, related, request FROM Dataset");
    assert_eq!(rows, vec![(1, "help".to_owned(), 1, 0)]);
}

#[test]
fn test_mode_flag_overrides_env() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("out.db");
    let (messages, categories) = write_inputs(
        dir.path(),
        "id,message\n1,help\n2,water\n",
        "id,categories\n1,related-1;request-0\n2,request-1;related-0\n",
    );

    msgpipe()
        .env("MSGPIPE_DECODE_MODE", "strict")
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("differ from"));

    msgpipe()
        .env("MSGPIPE_DECODE_MODE", "strict")
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .args(["--mode", "lenient"])
        .assert()
        .success();

    let rows = query_rows(&db, "SELECT id, message, related, request FROM Dataset ORDER BY id");
    assert_eq!(rows, vec![(1, "help".to_owned(), 1, 0), (2, "water".to_owned(), 1, 0)]);
}

#[test]
fn test_mode_flag_rejects_unknown_value_and_strict_conflict() {
    let dir = TempDir::new().unwrap();
    let (messages, categories) =
        write_inputs(dir.path(), "id,message\n1,help\n", "id,categories\n1,related-1\n");
    let db = dir.path().join("out.db");

    msgpipe()
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .args(["--mode", "loose"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown decode mode"));

    msgpipe()
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .args(["--mode", "lenient", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));

    assert!(!db.exists());
}

#[test]
fn test_strict_mode_rejects_message_without_categories() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("out.db");
    let (messages, categories) = write_inputs(
        dir.path(),
        "id,message\n1,help\n2,orphan\n",
        "id,categories\n1,related-1;request-0\n",
    );

    msgpipe()
        .arg(&messages)
        .arg(&categories)
        .arg(&db)
        .args(["--mode", "strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no packed category string"));

    assert!(!db.exists());
}

#[test]
fn test_missing_input_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("out.db");

    msgpipe()
        .arg(dir.path().join("missing.csv"))
        .arg(dir.path().join("also-missing.csv"))
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load input files"));

    assert!(!db.exists());
}
