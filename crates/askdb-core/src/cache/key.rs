use crate::model::CacheTask;
use std::path::Path;

/// Stable database identifier: the file's base name without extension.
///
/// Two files with the same base name in different directories share an
/// identifier and therefore cache entries.
pub fn database_id(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn cache_key(database_id: &str, task: CacheTask) -> String {
    format!("{}{}", key_prefix(database_id), task.as_str())
}

/// Prefix shared by every entry of one database.
pub fn key_prefix(database_id: &str) -> String {
    format!("{}:", database_id)
}
