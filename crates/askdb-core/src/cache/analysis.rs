use super::key::{cache_key, database_id, key_prefix};
use super::CacheStore;
use crate::diagram::render_er_diagram;
use crate::model::{CacheEntry, CachePayload, CacheTask, Task};
use crate::parse::parse_suggestions;
use crate::prompt;
use crate::providers::gateway::{Gateway, Generation};
use crate::schema::{inspect, source_mtime};
use std::path::Path;
use std::sync::Arc;

/// Memoized explain / suggest / diagram results per database file.
///
/// An entry is reused only while the file's mtime is unchanged and, for
/// model-dependent tasks, the model matches. Degraded generations are
/// returned but never stored; a cache hit is never degraded.
#[derive(Clone)]
pub struct AnalysisCache {
    store: Arc<dyn CacheStore>,
    gateway: Gateway,
}

impl AnalysisCache {
    pub fn new(store: Arc<dyn CacheStore>, gateway: Gateway) -> Self {
        Self { store, gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub async fn explain(&self, db_path: &Path, model: &str) -> anyhow::Result<Generation> {
        let mtime = source_mtime(db_path)?;
        if let Some(CachePayload::Analysis(text)) =
            self.lookup(db_path, CacheTask::Explain, mtime, Some(model))
        {
            return Ok(Generation::answer(text));
        }

        let snapshot = inspect(db_path)?;
        let generation = self
            .gateway
            .generate(&prompt::build(&Task::ExplainSchema, &snapshot), model)
            .await;
        if !generation.degraded {
            self.persist(
                db_path,
                CacheTask::Explain,
                CacheEntry::new(
                    CachePayload::Analysis(generation.text.clone()),
                    mtime,
                    Some(model.into()),
                ),
            );
        }
        Ok(generation)
    }

    /// On degraded output the error text is returned as the only item.
    pub async fn suggest(&self, db_path: &Path, model: &str) -> anyhow::Result<Vec<String>> {
        let mtime = source_mtime(db_path)?;
        if let Some(CachePayload::Suggestions(items)) =
            self.lookup(db_path, CacheTask::Suggest, mtime, Some(model))
        {
            return Ok(items);
        }

        let snapshot = inspect(db_path)?;
        let generation = self
            .gateway
            .generate(&prompt::build(&Task::SuggestQuestions, &snapshot), model)
            .await;
        if generation.degraded {
            return Ok(vec![generation.text.trim().to_string()]);
        }

        let items = parse_suggestions(&generation.text);
        self.persist(
            db_path,
            CacheTask::Suggest,
            CacheEntry::new(CachePayload::Suggestions(items.clone()), mtime, Some(model.into())),
        );
        Ok(items)
    }

    /// Rendered straight from the schema; the model plays no part.
    pub fn diagram(&self, db_path: &Path) -> anyhow::Result<String> {
        let mtime = source_mtime(db_path)?;
        if let Some(CachePayload::Diagram(text)) =
            self.lookup(db_path, CacheTask::Diagram, mtime, None)
        {
            return Ok(text);
        }

        let text = render_er_diagram(&inspect(db_path)?);
        self.persist(
            db_path,
            CacheTask::Diagram,
            CacheEntry::new(CachePayload::Diagram(text.clone()), mtime, None),
        );
        Ok(text)
    }

    /// Drops one database's entries, or everything when `database` is `None`.
    pub fn clear(&self, database: Option<&str>) -> anyhow::Result<usize> {
        match database {
            Some(db) => {
                let removed = self.store.delete_prefix(&key_prefix(db))?;
                tracing::info!(event = "askdb.cache.cleared", db = %db, removed);
                Ok(removed)
            }
            None => {
                let removed = self.store.keys()?.len();
                self.store.clear()?;
                tracing::info!(event = "askdb.cache.cleared", db = "*", removed);
                Ok(removed)
            }
        }
    }

    fn lookup(
        &self,
        db_path: &Path,
        task: CacheTask,
        mtime: i64,
        model: Option<&str>,
    ) -> Option<CachePayload> {
        let db = database_id(db_path);
        let key = cache_key(&db, task);
        let entry = match self.store.get(&key) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(event = "askdb.cache.read_failed", key = %key, error = %e);
                None
            }
        };
        let required_model = if task.is_model_dependent() { model } else { None };

        match entry {
            Some(e) if e.is_valid_for(mtime, required_model) => {
                tracing::debug!(event = "askdb.cache.hit", db = %db, task = task.as_str());
                Some(e.payload)
            }
            Some(_) => {
                tracing::debug!(event = "askdb.cache.stale", db = %db, task = task.as_str());
                None
            }
            None => {
                tracing::debug!(event = "askdb.cache.miss", db = %db, task = task.as_str());
                None
            }
        }
    }

    fn persist(&self, db_path: &Path, task: CacheTask, entry: CacheEntry) {
        let key = cache_key(&database_id(db_path), task);
        if let Err(e) = self.store.put(&key, &entry) {
            tracing::warn!(event = "askdb.cache.write_failed", key = %key, error = %e);
        }
    }
}
