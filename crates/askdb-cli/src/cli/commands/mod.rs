use super::args::*;
use askdb_core::cache::{AnalysisCache, CacheStore, JsonFileStore, SqliteCacheStore};
use askdb_core::catalog::DatabaseCatalog;
use askdb_core::config::{load_config, AppConfig, CacheBackend, ProviderKind};
use askdb_core::engine::{Assistant, HistorySink};
use askdb_core::providers::gateway::{is_known_model, Gateway};
use askdb_core::providers::llm::fake::FakeClient;
use askdb_core::providers::llm::gemini::GeminiClient;
use askdb_core::providers::llm::LlmClient;
use askdb_core::storage::HistoryStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod analyze;
pub mod ask;
pub mod cache;
pub mod db;
pub mod exec;
pub mod history;
pub mod init;
pub mod models;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const SQL_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init => init::cmd_init(&cli.config),
        Command::Models => models::cmd_models(),
        cmd => {
            let cfg = match load(&cli.config, cli.strict_config) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("config error: {}", e);
                    return Ok(exit_codes::CONFIG_ERROR);
                }
            };
            let ctx = Ctx::new(cfg);
            match cmd {
                Command::Db(args) => db::cmd_db(&ctx, args),
                Command::Explain(args) => analyze::cmd_explain(&ctx, args).await,
                Command::Suggest(args) => analyze::cmd_suggest(&ctx, args).await,
                Command::Diagram(args) => analyze::cmd_diagram(&ctx, args),
                Command::Ask(args) => ask::cmd_ask(&ctx, args).await,
                Command::Exec(args) => exec::cmd_exec(&ctx, args),
                Command::History(args) => history::cmd_history(&ctx, args),
                Command::Cache(args) => cache::cmd_cache(&ctx, args),
                Command::Init | Command::Models => Ok(exit_codes::OK),
            }
        }
    }
}

fn load(path: &Path, strict: bool) -> anyhow::Result<AppConfig> {
    let mut cfg = load_config(path, strict)?;
    cfg.apply_env();
    Ok(cfg)
}

/// Everything a command needs, built lazily from the resolved config.
pub struct Ctx {
    pub cfg: AppConfig,
}

impl Ctx {
    fn new(cfg: AppConfig) -> Self {
        Self { cfg }
    }

    /// The history database and a SQLite cache may live next to user
    /// databases; neither is user data.
    pub fn catalog(&self) -> DatabaseCatalog {
        let mut catalog = DatabaseCatalog::new(&self.cfg.database_dir);
        for path in [self.cfg.history_db(), self.cfg.cache_path()] {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                catalog = catalog.excluding(stem);
            }
        }
        catalog
    }

    /// Looks a user-supplied key up in the catalog. Prints the problem and
    /// returns `None` when it does not name a known database.
    pub fn resolve_db(&self, key: &str) -> anyhow::Result<Option<PathBuf>> {
        let path = self.catalog().resolve(key)?;
        if path.is_none() {
            eprintln!(
                "config error: unknown database '{}' in {} (see `askdb db list`)",
                key,
                self.cfg.database_dir.display()
            );
        }
        Ok(path)
    }

    pub fn model(&self, requested: Option<&str>) -> String {
        let model = requested.unwrap_or(&self.cfg.model).to_string();
        if !is_known_model(&model) {
            tracing::warn!(event = "askdb.model.unknown", model = %model);
        }
        model
    }

    pub fn history(&self) -> anyhow::Result<HistoryStore> {
        HistoryStore::open(&self.cfg.history_db())
    }

    fn cache_store(&self) -> anyhow::Result<Arc<dyn CacheStore>> {
        let path = self.cfg.cache_path();
        Ok(match self.cfg.cache_backend {
            CacheBackend::Json => Arc::new(JsonFileStore::new(path)),
            CacheBackend::Sqlite => Arc::new(SqliteCacheStore::open(&path)?),
        })
    }

    fn client(&self) -> Arc<dyn LlmClient> {
        match self.cfg.provider {
            ProviderKind::Gemini => Arc::new(GeminiClient::from_env(
                self.cfg.api_base.clone(),
                self.cfg.max_output_tokens,
            )),
            ProviderKind::Fake => Arc::new(FakeClient::new(Vec::<String>::new())),
        }
    }

    pub fn assistant(&self, with_history: bool) -> anyhow::Result<Assistant> {
        let gateway = Gateway::new(self.client(), self.cfg.temperature);
        let cache = AnalysisCache::new(self.cache_store()?, gateway);
        let history: Option<Arc<dyn HistorySink>> = if with_history {
            Some(Arc::new(self.history()?) as Arc<dyn HistorySink>)
        } else {
            None
        };
        Ok(Assistant::new(cache, history))
    }
}
