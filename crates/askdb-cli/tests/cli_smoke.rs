use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let db_dir = dir.path().join("database");
    std::fs::create_dir_all(&db_dir).unwrap();
    let conn = Connection::open(db_dir.join("shop.db")).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE Users (user_id INTEGER PRIMARY KEY, name TEXT NOT NULL, tier TEXT);
        CREATE TABLE Orders (
            order_id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            amount REAL,
            FOREIGN KEY (user_id) REFERENCES Users(user_id)
        );
        INSERT INTO Users (name, tier) VALUES ('Kim', 'VIP'), ('Lee', 'Basic');
        INSERT INTO Orders (user_id, amount) VALUES (1, 10.5), (1, 3.0), (2, 7.25);
        "#,
    )
    .unwrap();
    dir
}

fn askdb(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("askdb").unwrap();
    cmd.current_dir(dir)
        .arg("--config")
        .arg(dir.join("askdb.yaml"))
        .env("ASKDB_DATABASE_DIR", dir.join("database"))
        .env_remove("ASKDB_PROVIDER")
        .env_remove("ASKDB_CACHE_PATH")
        .env_remove("ASKDB_HISTORY_DB")
        .env_remove("ASKDB_MODEL")
        .env_remove("GEMINI_API_KEY");
    cmd
}

#[test]
fn models_lists_registry() {
    let dir = TempDir::new().unwrap();
    askdb(dir.path())
        .arg("models")
        .assert()
        .success()
        .stdout(contains("gemini-2.5-flash-lite"))
        .stdout(contains("gemini-2.5-pro"));
}

#[test]
fn exec_prints_json_result() {
    let dir = workspace();
    askdb(dir.path())
        .args(["exec", "shop", "SELECT 1 AS x", "--json"])
        .assert()
        .success()
        .stdout(contains("\"success\": true"))
        .stdout(contains("\"x\""));
}

#[test]
fn exec_exports_result_file() {
    let dir = workspace();
    let out = dir.path().join("out.json");
    askdb(dir.path())
        .args(["exec", "shop", "SELECT name FROM Users ORDER BY user_id", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("Kim"))
        .stdout(contains("(2 rows)"));

    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
    assert_eq!(doc["row_count"], 2);
    assert_eq!(doc["rows"][0][0], "Kim");
}

#[test]
fn exec_exports_csv_when_asked() {
    let dir = workspace();
    let out = dir.path().join("reports/users.csv");
    askdb(dir.path())
        .args(["exec", "shop", "SELECT name, tier FROM Users ORDER BY user_id", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stderr(contains("wrote"));

    let raw = std::fs::read_to_string(out).unwrap();
    assert_eq!(raw.lines().collect::<Vec<_>>(), vec!["name,tier", "Kim,VIP", "Lee,Basic"]);
}

#[test]
fn every_statement_in_the_text_runs() {
    let dir = workspace();
    askdb(dir.path())
        .args([
            "exec",
            "shop",
            "INSERT INTO Users (name, tier) VALUES ('Park', 'VIP'); SELECT name FROM Users WHERE user_id = 3",
        ])
        .assert()
        .success()
        .stdout(contains("Park").and(contains("(1 row)")));

    askdb(dir.path())
        .args(["exec", "shop", "SELECT 1; SELECT * FROM missing"])
        .assert()
        .code(1)
        .stdout(contains("statement 2:"));
}

#[test]
fn failing_sql_exits_one() {
    let dir = workspace();
    askdb(dir.path())
        .args(["exec", "shop", "SELECT * FROM missing_table"])
        .assert()
        .code(1)
        .stdout(contains("missing_table"));
}

#[test]
fn unknown_database_exits_two() {
    let dir = workspace();
    askdb(dir.path())
        .args(["exec", "../shop", "SELECT 1"])
        .assert()
        .code(2)
        .stderr(contains("unknown database"));
}

#[test]
fn db_add_list_delete() {
    let dir = workspace();
    askdb(dir.path())
        .args(["db", "add", "hr", "--name", "Human Resources", "--icon", "👥"])
        .assert()
        .success();

    askdb(dir.path())
        .args(["db", "list"])
        .assert()
        .success()
        .stdout(contains("hr"))
        .stdout(contains("Human Resources"))
        .stdout(contains("Shop - No description"));

    askdb(dir.path())
        .args(["db", "add", "hr", "--name", "Again"])
        .assert()
        .code(2)
        .stderr(contains("already exists"));

    askdb(dir.path())
        .args(["db", "delete", "hr"])
        .assert()
        .success();
    assert!(!dir.path().join("database/hr.db").exists());
}

#[test]
fn diagram_is_rendered_offline_and_cached() {
    let dir = workspace();
    askdb(dir.path())
        .args(["diagram", "shop"])
        .assert()
        .success()
        .stdout(contains("erDiagram"))
        .stdout(contains("Users ||--o{ Orders : \"user_id\""));
    assert!(dir.path().join("database/analysis_cache.json").exists());

    askdb(dir.path())
        .args(["cache", "clear", "shop"])
        .assert()
        .success()
        .stderr(contains("cleared 1 cached analyses for shop"));
}

#[test]
fn ask_with_fake_provider_prints_sql() {
    let dir = workspace();
    askdb(dir.path())
        .env("ASKDB_PROVIDER", "fake")
        .args(["ask", "shop", "How many users are there?"])
        .assert()
        .success()
        .stdout(contains("-- SQL generation failed"))
        .stderr(contains("Reasoning:"));
}

#[test]
fn ask_out_requires_execute() {
    let dir = workspace();
    askdb(dir.path())
        .env("ASKDB_PROVIDER", "fake")
        .args(["ask", "shop", "q", "--out", "x.json"])
        .assert()
        .code(2);
}

#[test]
fn explain_without_api_key_degrades() {
    let dir = workspace();
    askdb(dir.path())
        .args(["explain", "shop"])
        .assert()
        .success()
        .stderr(contains("Error: GEMINI_API_KEY is not set"))
        .stdout(predicate::str::is_empty());
    // degraded output is never cached
    assert!(!dir.path().join("database/analysis_cache.json").exists());
}

#[test]
fn history_starts_empty_and_hides_from_catalog() {
    let dir = workspace();
    askdb(dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(dir.path().join("database/query_history.db").exists());

    askdb(dir.path())
        .args(["db", "list"])
        .assert()
        .success()
        .stdout(contains("query_history").not());

    askdb(dir.path())
        .args(["history", "bookmark", "42"])
        .assert()
        .code(2);
}

#[test]
fn strict_config_rejects_unknown_keys() {
    let dir = workspace();
    std::fs::write(dir.path().join("askdb.yaml"), "modle: typo\n").unwrap();
    askdb(dir.path())
        .args(["--strict-config", "db", "list"])
        .assert()
        .code(2)
        .stderr(contains("Unknown fields"));
}

#[test]
fn init_writes_sample_config() {
    let dir = TempDir::new().unwrap();
    askdb(dir.path()).arg("init").assert().success();
    let raw = std::fs::read_to_string(dir.path().join("askdb.yaml")).unwrap();
    assert!(raw.contains("model: gemini-2.5-flash-lite"));
}
