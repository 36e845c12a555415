use std::path::{Path, PathBuf};
use thiserror::Error;

/// The target database file is missing or is not a SQLite container.
///
/// Fatal to the call that hit it and never retried. Callers holding an
/// `anyhow::Error` can recover it with `downcast_ref::<DataSourceError>()`.
#[derive(Debug, Error)]
#[error("data source error: {reason} ({})", path.display())]
pub struct DataSourceError {
    pub path: PathBuf,
    pub reason: String,
}

impl DataSourceError {
    pub fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn missing(path: &Path) -> Self {
        Self::new(path, "database file not found")
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

/// Returns true when `err` (or anything in its chain) is a [`DataSourceError`].
pub fn is_data_source_error(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<DataSourceError>().is_some())
}
