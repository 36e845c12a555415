mod common;

use askdb_core::cache::{AnalysisCache, CacheStore, JsonFileStore, MemoryStore, SqliteCacheStore};
use askdb_core::errors::is_data_source_error;
use askdb_core::providers::gateway::Gateway;
use askdb_core::providers::llm::fake::FakeClient;
use std::sync::Arc;
use tempfile::tempdir;

const MODEL: &str = "gemini-2.5-flash-lite";

fn cache_with(store: Arc<dyn CacheStore>, client: Arc<FakeClient>) -> AnalysisCache {
    AnalysisCache::new(store, Gateway::new(client, 0.2))
}

#[tokio::test]
async fn explain_twice_generates_once() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = common::ecommerce_db(dir.path(), "ecommerce");
    let client = Arc::new(FakeClient::new(["An e-commerce schema.", "SECOND CALL"]));
    let store = Arc::new(JsonFileStore::new(dir.path().join("cache.json")));
    let cache = cache_with(store, client.clone());

    let first = cache.explain(&db, MODEL).await?;
    let second = cache.explain(&db, MODEL).await?;

    assert_eq!(client.calls(), 1);
    assert_eq!(first.text, "An e-commerce schema.");
    assert_eq!(first, second);
    assert!(!second.degraded);
    assert!(client.prompts()[0].contains("CREATE TABLE Orders"));
    Ok(())
}

#[tokio::test]
async fn file_change_forces_regeneration() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = common::ecommerce_db(dir.path(), "ecommerce");
    let client = Arc::new(FakeClient::new(["v1", "v2"]));
    let cache = cache_with(Arc::new(MemoryStore::new()), client.clone());

    assert_eq!(cache.explain(&db, MODEL).await?.text, "v1");
    common::bump_mtime(&db);
    assert_eq!(cache.explain(&db, MODEL).await?.text, "v2");
    assert_eq!(client.calls(), 2);

    // the regenerated entry superseded the stale one
    assert_eq!(cache.explain(&db, MODEL).await?.text, "v2");
    assert_eq!(client.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn model_change_is_a_miss_for_model_dependent_tasks() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = common::ecommerce_db(dir.path(), "ecommerce");
    let client = Arc::new(FakeClient::new(["a", "b"]));
    let cache = cache_with(Arc::new(MemoryStore::new()), client.clone());

    cache.explain(&db, MODEL).await?;
    assert_eq!(cache.explain(&db, "gemini-2.5-pro").await?.text, "b");
    assert_eq!(client.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn suggestions_are_parsed_and_cached() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = common::ecommerce_db(dir.path(), "ecommerce");
    let raw = "1. Total revenue per category?\n2. Which VIP users ordered the most?\n3. Average order quantity?\n4. Orders per month?\n5. Best-selling product?\n6. Extra one?";
    let client = Arc::new(FakeClient::new([raw]));
    let cache = cache_with(Arc::new(MemoryStore::new()), client.clone());

    let items = cache.suggest(&db, MODEL).await?;
    assert_eq!(items.len(), 5);
    assert_eq!(items[0], "Total revenue per category?");
    assert_eq!(cache.suggest(&db, MODEL).await?, items);
    assert_eq!(client.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn degraded_generation_is_returned_but_not_cached() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = common::ecommerce_db(dir.path(), "ecommerce");
    let client = Arc::new(FakeClient::failing("quota exceeded"));
    let store = Arc::new(MemoryStore::new());
    let cache = cache_with(store.clone(), client.clone());

    let generation = cache.explain(&db, MODEL).await?;
    assert!(generation.degraded);
    assert_eq!(generation.text, "Error: quota exceeded");
    let items = cache.suggest(&db, MODEL).await?;
    assert_eq!(items, vec!["Error: quota exceeded".to_string()]);

    assert!(store.keys()?.is_empty());
    cache.explain(&db, MODEL).await?;
    assert_eq!(client.calls(), 3);
    Ok(())
}

#[tokio::test]
async fn answer_beginning_with_error_text_is_cached() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = common::ecommerce_db(dir.path(), "ecommerce");
    let answer = "Error: codes are not stored here; Orders holds purchases.";
    let client = Arc::new(FakeClient::new([answer]));
    let store = Arc::new(MemoryStore::new());
    let cache = cache_with(store.clone(), client.clone());

    let first = cache.explain(&db, MODEL).await?;
    assert!(!first.degraded);
    assert_eq!(cache.explain(&db, MODEL).await?.text, answer);
    assert_eq!(client.calls(), 1);
    assert_eq!(store.keys()?, vec!["ecommerce:explain".to_string()]);
    Ok(())
}

#[tokio::test]
async fn diagram_bypasses_the_model_and_ignores_model_identity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = common::ecommerce_db(dir.path(), "ecommerce");
    let client = Arc::new(FakeClient::new(["unused"]));
    let store = Arc::new(SqliteCacheStore::memory()?);
    let cache = cache_with(store.clone(), client.clone());

    let d = cache.diagram(&db)?;
    assert!(d.starts_with("erDiagram"));
    assert!(d.contains("Users ||--o{ Orders"));
    assert!(d.contains("Products ||--o{ Orders"));
    assert_eq!(client.calls(), 0);

    let entry = store.get("ecommerce:diagram")?.unwrap();
    assert!(entry.model.is_none());
    assert_eq!(cache.diagram(&db)?, d);
    Ok(())
}

#[tokio::test]
async fn clear_by_name_leaves_other_databases() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let shop = common::ecommerce_db(dir.path(), "shop");
    let shop2 = common::ecommerce_db(dir.path(), "shop2");
    let client = Arc::new(FakeClient::new(["text"]));
    let store = Arc::new(JsonFileStore::new(dir.path().join("cache.json")));
    let cache = cache_with(store.clone(), client.clone());

    cache.explain(&shop, MODEL).await?;
    cache.diagram(&shop)?;
    cache.explain(&shop2, MODEL).await?;

    assert_eq!(cache.clear(Some("shop"))?, 2);
    assert_eq!(store.keys()?, vec!["shop2:explain".to_string()]);

    cache.explain(&shop2, MODEL).await?;
    assert_eq!(client.calls(), 2);

    cache.clear(None)?;
    assert!(store.keys()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn corrupt_store_is_treated_as_empty() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db = common::ecommerce_db(dir.path(), "ecommerce");
    let cache_file = dir.path().join("cache.json");
    std::fs::write(&cache_file, "[[[ definitely not a cache")?;

    let client = Arc::new(FakeClient::new(["fresh"]));
    let cache = cache_with(Arc::new(JsonFileStore::new(&cache_file)), client.clone());
    assert_eq!(cache.explain(&db, MODEL).await?.text, "fresh");
    assert_eq!(cache.explain(&db, MODEL).await?.text, "fresh");
    assert_eq!(client.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_database_is_fatal() {
    let dir = tempdir().unwrap();
    let client = Arc::new(FakeClient::new(["x"]));
    let cache = cache_with(Arc::new(MemoryStore::new()), client.clone());

    let err = cache
        .explain(&dir.path().join("ghost.db"), MODEL)
        .await
        .unwrap_err();
    assert!(is_data_source_error(&err));
    assert_eq!(client.calls(), 0);
}
