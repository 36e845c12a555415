use super::{poisoned, CacheStore};
use crate::model::CacheEntry;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

type Entries = BTreeMap<String, CacheEntry>;

/// Single JSON mapping file, read whole on every access and rewritten whole
/// on every mutation.
///
/// A process-local lock serializes read-modify-write cycles. Separate
/// processes sharing the file can still lose updates. An unreadable or
/// corrupt file reads as empty; individual malformed entries are dropped.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Entries {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
            Err(e) => {
                tracing::warn!(
                    event = "askdb.cache.corrupt",
                    path = %self.path.display(),
                    error = %e,
                    "cache file unreadable, treating as empty"
                );
                return Entries::new();
            }
        };
        if raw.trim().is_empty() {
            return Entries::new();
        }

        let values: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    event = "askdb.cache.corrupt",
                    path = %self.path.display(),
                    error = %e,
                    "cache file is not a JSON object, treating as empty"
                );
                return Entries::new();
            }
        };

        values
            .into_iter()
            .filter_map(|(k, v)| match serde_json::from_value::<CacheEntry>(v) {
                Ok(entry) => Some((k, entry)),
                Err(e) => {
                    tracing::warn!(event = "askdb.cache.entry_dropped", key = %k, error = %e);
                    None
                }
            })
            .collect()
    }

    fn save(&self, entries: &Entries) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl CacheStore for JsonFileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<CacheEntry>> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        Ok(self.load().remove(key))
    }

    fn put(&self, key: &str, entry: &CacheEntry) -> anyhow::Result<()> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        let mut entries = self.load();
        entries.insert(key.to_string(), entry.clone());
        self.save(&entries)
    }

    fn delete_prefix(&self, prefix: &str) -> anyhow::Result<usize> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        let removed = before - entries.len();
        if removed > 0 {
            self.save(&entries)?;
        }
        Ok(removed)
    }

    fn clear(&self) -> anyhow::Result<()> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("failed to remove {}", self.path.display()))),
        }
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        let _guard = self.lock.lock().map_err(poisoned)?;
        Ok(self.load().into_keys().collect())
    }
}
