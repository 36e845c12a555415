use super::{poisoned, CacheStore};
use crate::model::CacheEntry;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<CacheEntry>> {
        Ok(self.entries.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn put(&self, key: &str, entry: &CacheEntry) -> anyhow::Result<()> {
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), entry.clone());
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> anyhow::Result<usize> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        Ok(before - entries.len())
    }

    fn clear(&self) -> anyhow::Result<()> {
        self.entries.lock().map_err(poisoned)?.clear();
        Ok(())
    }

    fn keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.entries.lock().map_err(poisoned)?.keys().cloned().collect())
    }
}
