use crate::engine::HistorySink;
use anyhow::Context;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const DEFAULT_LIST_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub db_name: String,
    pub question: String,
    pub sql_query: String,
    pub executed_at: String,
    pub is_bookmarked: bool,
    pub result_rows: i64,
}

/// Log of successfully executed questions, newest first.
#[derive(Clone)]
pub struct HistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).context("failed to open history db")?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory history db")?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("history store lock poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    pub fn record(
        &self,
        db_name: &str,
        question: &str,
        sql_query: &str,
        result_rows: usize,
    ) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO query_history(db_name, question, sql_query, executed_at, result_rows)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                db_name,
                question,
                sql_query,
                chrono::Utc::now().to_rfc3339(),
                result_rows as i64
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Newest first, optionally restricted to one database.
    pub fn list(&self, db_name: Option<&str>, limit: u32) -> anyhow::Result<Vec<HistoryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, db_name, question, sql_query, executed_at, is_bookmarked, result_rows
             FROM query_history
             WHERE ?1 IS NULL OR db_name = ?1
             ORDER BY executed_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![db_name, limit], |row| {
            Ok(HistoryEntry {
                id: row.get(0)?,
                db_name: row.get(1)?,
                question: row.get(2)?,
                sql_query: row.get(3)?,
                executed_at: row.get(4)?,
                is_bookmarked: row.get::<_, i64>(5)? != 0,
                result_rows: row.get(6)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Flips the bookmark flag; returns false when `id` does not exist.
    pub fn toggle_bookmark(&self, id: i64) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE query_history
             SET is_bookmarked = CASE WHEN is_bookmarked = 0 THEN 1 ELSE 0 END
             WHERE id = ?1",
            params![id],
        )?;
        Ok(n > 0)
    }
}

impl HistorySink for HistoryStore {
    fn record_execution(
        &self,
        db_name: &str,
        question: &str,
        sql: &str,
        result_rows: usize,
    ) -> anyhow::Result<()> {
        self.record(db_name, question, sql, result_rows).map(|_| ())
    }
}
