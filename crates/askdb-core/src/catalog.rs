//! Discovery and management of the `.db` files in a database directory.

use anyhow::{bail, Context};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.json";
pub const DB_EXTENSION: &str = "db";
pub const DEFAULT_ICON: &str = "📁";
pub const DEFAULT_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseEntry {
    pub key: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub file: PathBuf,
}

pub struct DatabaseCatalog {
    dir: PathBuf,
    excluded: Vec<String>,
}

impl DatabaseCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            excluded: Vec::new(),
        }
    }

    /// Hides files (by key) that live in the directory but are not user data,
    /// such as the history database.
    pub fn excluding(mut self, key: impl Into<String>) -> Self {
        self.excluded.push(key.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    fn load_metadata(&self) -> anyhow::Result<BTreeMap<String, DatabaseMeta>> {
        let path = self.metadata_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid {}", path.display()))
    }

    fn save_metadata(&self, meta: &BTreeMap<String, DatabaseMeta>) -> anyhow::Result<()> {
        let path = self.metadata_path();
        std::fs::write(&path, serde_json::to_string_pretty(meta)?)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// Every `*.db` file in the directory, sorted by key.
    pub fn list(&self) -> anyhow::Result<Vec<DatabaseEntry>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let meta = self.load_metadata()?;

        let mut out = Vec::new();
        for item in std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to list {}", self.dir.display()))?
        {
            let path = item?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(DB_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            if self.excluded.contains(&key) {
                continue;
            }

            let entry = match meta.get(&key) {
                Some(m) => DatabaseEntry {
                    name: m.name.clone(),
                    description: m.description.clone(),
                    icon: m.icon.clone(),
                    file: path,
                    key,
                },
                None => DatabaseEntry {
                    name: display_name(&key),
                    description: DEFAULT_DESCRIPTION.to_string(),
                    icon: DEFAULT_ICON.to_string(),
                    file: path,
                    key,
                },
            };
            out.push(entry);
        }
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<DatabaseEntry>> {
        Ok(self.list()?.into_iter().find(|e| e.key == key))
    }

    /// Validated path for a catalog key.
    pub fn resolve(&self, key: &str) -> anyhow::Result<Option<PathBuf>> {
        Ok(self.get(key)?.map(|e| e.file))
    }

    /// Creates an empty SQLite database and records its metadata.
    pub fn add(&self, key: &str, name: &str, description: &str, icon: &str) -> anyhow::Result<DatabaseEntry> {
        let key = key.trim();
        let name = name.trim();
        if key.is_empty() || name.is_empty() {
            bail!("database key and name are required");
        }
        if !is_valid_key(key) {
            bail!("database key may only contain ASCII letters, digits and '_'");
        }
        let file = self.dir.join(format!("{}.{}", key, DB_EXTENSION));
        if file.exists() {
            bail!("database '{}' already exists", key);
        }

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        Connection::open(&file)
            .with_context(|| format!("failed to create {}", file.display()))?;

        let icon = match icon.trim() {
            "" => DEFAULT_ICON,
            other => other,
        };
        let mut meta = self.load_metadata()?;
        meta.insert(
            key.to_string(),
            DatabaseMeta {
                name: name.to_string(),
                description: description.trim().to_string(),
                icon: icon.to_string(),
            },
        );
        self.save_metadata(&meta)?;

        tracing::info!(event = "askdb.catalog.added", key = %key);
        Ok(DatabaseEntry {
            key: key.to_string(),
            name: name.to_string(),
            description: description.trim().to_string(),
            icon: icon.to_string(),
            file,
        })
    }

    /// Removes the file and its metadata entry.
    pub fn delete(&self, key: &str) -> anyhow::Result<()> {
        let Some(entry) = self.get(key)? else {
            bail!("database '{}' not found", key);
        };
        if entry.file.exists() {
            std::fs::remove_file(&entry.file)
                .with_context(|| format!("failed to delete {}", entry.file.display()))?;
        }

        let mut meta = self.load_metadata()?;
        if meta.remove(key).is_some() {
            self.save_metadata(&meta)?;
        }
        tracing::info!(event = "askdb.catalog.deleted", key = %key);
        Ok(())
    }
}

pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `online_shop` -> `Online Shop`
pub fn display_name(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
