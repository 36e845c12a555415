use crate::errors::ConfigError;
use crate::providers::gateway::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::providers::llm::gemini::DEFAULT_API_BASE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "askdb.yaml";
pub const DEFAULT_DATABASE_DIR: &str = "database";
pub const CACHE_FILE: &str = "analysis_cache.json";
pub const HISTORY_FILE: &str = "query_history.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Gemini,
    Fake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_dir: PathBuf,
    pub cache_path: Option<PathBuf>,
    pub cache_backend: CacheBackend,
    pub history_db: Option<PathBuf>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub provider: ProviderKind,
    pub api_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_dir: PathBuf::from(DEFAULT_DATABASE_DIR),
            cache_path: None,
            cache_backend: CacheBackend::Json,
            history_db: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: 2048,
            provider: ProviderKind::Gemini,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(|| {
            let file = match self.cache_backend {
                CacheBackend::Json => CACHE_FILE,
                CacheBackend::Sqlite => "analysis_cache.db",
            };
            self.database_dir.join(file)
        })
    }

    pub fn history_db(&self) -> PathBuf {
        self.history_db
            .clone()
            .unwrap_or_else(|| self.database_dir.join(HISTORY_FILE))
    }

    /// Applies `ASKDB_*` environment overrides on top of file values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|k| std::env::var(k).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("ASKDB_DATABASE_DIR") {
            self.database_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ASKDB_CACHE_PATH") {
            self.cache_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("ASKDB_HISTORY_DB") {
            self.history_db = Some(PathBuf::from(v));
        }
        if let Some(v) = get("ASKDB_MODEL") {
            self.model = v;
        }
        if let Some(v) = get("ASKDB_TEMPERATURE") {
            if let Ok(t) = v.parse() {
                self.temperature = t;
            }
        }
        if let Some(v) = get("ASKDB_PROVIDER") {
            match v.as_str() {
                "gemini" => self.provider = ProviderKind::Gemini,
                "fake" => self.provider = ProviderKind::Fake,
                other => tracing::warn!(event = "askdb.config.bad_env", provider = %other),
            }
        }
    }
}

/// Loads `path` if it exists, otherwise defaults. Unknown keys are warned
/// about, or rejected when `strict`.
pub fn load_config(path: &Path, strict: bool) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, path, strict)
}

pub fn parse_config(raw: &str, path: &Path, strict: bool) -> Result<AppConfig, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    let mut ignored_keys = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);
    let mut cfg: AppConfig = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.push(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML {}: {}", path.display(), e)))?;

    if !ignored_keys.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?} (file: {})",
                ignored_keys,
                path.display()
            )));
        }
        tracing::warn!(
            event = "askdb.config.unknown_fields",
            fields = ?ignored_keys,
            file = %path.display()
        );
    }

    if !(0.0..=2.0).contains(&cfg.temperature) {
        return Err(ConfigError(format!(
            "temperature must be between 0.0 and 2.0, got {}",
            cfg.temperature
        )));
    }

    resolve_paths(&mut cfg, path);
    Ok(cfg)
}

fn resolve_paths(cfg: &mut AppConfig, config_path: &Path) {
    let base = config_path.parent().unwrap_or(Path::new("."));
    let resolve = |p: &mut PathBuf| {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    };
    resolve(&mut cfg.database_dir);
    if let Some(p) = cfg.cache_path.as_mut() {
        resolve(p);
    }
    if let Some(p) = cfg.history_db.as_mut() {
        resolve(p);
    }
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        format!(
            r#"# askdb configuration
database_dir: database
# cache_path: database/analysis_cache.json
# cache_backend: json   # json | sqlite
# history_db: database/query_history.db
provider: gemini        # gemini | fake  (gemini reads GEMINI_API_KEY)
model: {DEFAULT_MODEL}
temperature: {DEFAULT_TEMPERATURE}
max_output_tokens: 2048
"#
        ),
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
