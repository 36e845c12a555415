use super::{poisoned, CacheStore};
use crate::model::{CacheEntry, CachePayload};
use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS analysis_cache (
  key TEXT PRIMARY KEY,
  payload_json TEXT NOT NULL,
  source_mtime INTEGER NOT NULL,
  model TEXT,
  generated_at TEXT NOT NULL
);
"#;

/// Embedded key-value backend: one row per cache key.
#[derive(Clone)]
pub struct SqliteCacheStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCacheStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open cache db")?;
        conn.execute_batch(DDL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory cache db")?;
        conn.execute_batch(DDL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl CacheStore for SqliteCacheStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<CacheEntry>> {
        let conn = self.conn.lock().map_err(poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT payload_json, source_mtime, model, generated_at FROM analysis_cache WHERE key=?1",
        )?;
        let mut rows = stmt.query(params![key])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let payload_json: String = row.get(0)?;
        let generated_at: String = row.get(3)?;
        let payload = serde_json::from_str::<CachePayload>(&payload_json);
        let generated_at = DateTime::parse_from_rfc3339(&generated_at);
        match (payload, generated_at) {
            (Ok(payload), Ok(generated_at)) => Ok(Some(CacheEntry {
                payload,
                source_mtime: row.get(1)?,
                model: row.get(2)?,
                generated_at: generated_at.with_timezone(&Utc),
            })),
            _ => {
                tracing::warn!(event = "askdb.cache.entry_dropped", key = %key);
                Ok(None)
            }
        }
    }

    fn put(&self, key: &str, entry: &CacheEntry) -> anyhow::Result<()> {
        let conn = self.conn.lock().map_err(poisoned)?;
        conn.execute(
            "INSERT INTO analysis_cache(key, payload_json, source_mtime, model, generated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(key) DO UPDATE SET
                payload_json=excluded.payload_json,
                source_mtime=excluded.source_mtime,
                model=excluded.model,
                generated_at=excluded.generated_at",
            params![
                key,
                serde_json::to_string(&entry.payload)?,
                entry.source_mtime,
                entry.model,
                entry.generated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> anyhow::Result<usize> {
        let conn = self.conn.lock().map_err(poisoned)?;
        // substr avoids LIKE wildcard escaping
        let n = conn.execute(
            "DELETE FROM analysis_cache WHERE substr(key, 1, length(?1)) = ?1",
            params![prefix],
        )?;
        Ok(n)
    }

    fn clear(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().map_err(poisoned)?;
        conn.execute("DELETE FROM analysis_cache", [])?;
        Ok(())
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.lock().map_err(poisoned)?;
        let mut stmt = conn.prepare("SELECT key FROM analysis_cache ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
