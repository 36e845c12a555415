pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS query_history (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  db_name TEXT NOT NULL,
  question TEXT NOT NULL,
  sql_query TEXT NOT NULL,
  executed_at TEXT NOT NULL,
  is_bookmarked INTEGER NOT NULL DEFAULT 0,
  result_rows INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_query_history_db ON query_history(db_name, executed_at);
"#;
