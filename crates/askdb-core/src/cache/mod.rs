//! Memoization of model-assisted analysis, keyed by database and task.

use crate::model::CacheEntry;

pub mod analysis;
pub mod file;
pub mod key;
pub mod memory;
pub mod sqlite;

pub use analysis::AnalysisCache;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteCacheStore;

/// Backing store for [`AnalysisCache`].
///
/// Implementations serialize their own mutations; callers never coordinate.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<CacheEntry>>;
    fn put(&self, key: &str, entry: &CacheEntry) -> anyhow::Result<()>;
    /// Removes every entry whose key starts with `prefix`; returns how many.
    fn delete_prefix(&self, prefix: &str) -> anyhow::Result<usize>;
    fn clear(&self) -> anyhow::Result<()>;
    fn keys(&self) -> anyhow::Result<Vec<String>>;
}

pub(crate) fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow::anyhow!("cache store lock poisoned")
}
