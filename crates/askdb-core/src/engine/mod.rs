//! Wiring of the pipeline: schema -> prompt -> model -> parser -> executor.

use crate::cache::key::database_id;
use crate::cache::AnalysisCache;
use crate::exec::execute;
use crate::model::{ExecutionResult, Task, TranslationResult};
use crate::parse::{degraded_translation, parse_translation};
use crate::prompt;
use crate::providers::gateway::{Gateway, Generation};
use crate::schema::inspect;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Receives `(database, question, sql, row count)` after a successful run.
pub trait HistorySink: Send + Sync {
    fn record_execution(
        &self,
        db_name: &str,
        question: &str,
        sql: &str,
        result_rows: usize,
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    pub translation: TranslationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionResult>,
}

pub struct Assistant {
    pub cache: AnalysisCache,
    pub history: Option<Arc<dyn HistorySink>>,
}

impl Assistant {
    pub fn new(cache: AnalysisCache, history: Option<Arc<dyn HistorySink>>) -> Self {
        Self { cache, history }
    }

    fn gateway(&self) -> &Gateway {
        self.cache.gateway()
    }

    /// Never cached: every question is generated fresh.
    pub async fn translate(
        &self,
        db_path: &Path,
        question: &str,
        model: &str,
    ) -> anyhow::Result<TranslationResult> {
        let snapshot = inspect(db_path)?;
        let task = Task::TranslateQuestion {
            question: question.to_string(),
        };
        let generation = self
            .gateway()
            .generate(&prompt::build(&task, &snapshot), model)
            .await;
        let result = if generation.degraded {
            degraded_translation(&generation.text)
        } else {
            parse_translation(&generation.text)
        };
        tracing::info!(
            event = "askdb.translate",
            db = %db_path.display(),
            model = %model,
            sql_chars = result.sql.len()
        );
        Ok(result)
    }

    pub fn execute(&self, db_path: &Path, sql: &str) -> ExecutionResult {
        execute(db_path, sql)
    }

    /// Translates, and when `run` is set executes the SQL and offers a
    /// successful run to the history sink.
    pub async fn ask(
        &self,
        db_path: &Path,
        question: &str,
        model: &str,
        run: bool,
    ) -> anyhow::Result<AskOutcome> {
        let translation = self.translate(db_path, question, model).await?;
        if !run {
            return Ok(AskOutcome {
                translation,
                execution: None,
            });
        }

        let execution = self.execute(db_path, &translation.sql);
        if execution.success {
            self.offer_history(db_path, question, &translation.sql, execution.row_count());
        }
        Ok(AskOutcome {
            translation,
            execution: Some(execution),
        })
    }

    pub fn offer_history(&self, db_path: &Path, question: &str, sql: &str, rows: usize) {
        let Some(sink) = &self.history else {
            return;
        };
        if let Err(e) = sink.record_execution(&database_id(db_path), question, sql, rows) {
            tracing::warn!(event = "askdb.history.write_failed", error = %e);
        }
    }

    pub async fn explain(&self, db_path: &Path, model: &str) -> anyhow::Result<Generation> {
        self.cache.explain(db_path, model).await
    }

    pub async fn suggest(&self, db_path: &Path, model: &str) -> anyhow::Result<Vec<String>> {
        self.cache.suggest(db_path, model).await
    }

    pub fn diagram(&self, db_path: &Path) -> anyhow::Result<String> {
        self.cache.diagram(db_path)
    }

    pub fn clear_cache(&self, database: Option<&str>) -> anyhow::Result<usize> {
        self.cache.clear(database)
    }
}
