pub mod console;
pub mod csv;
pub mod json;

use crate::model::ExecutionResult;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// `.csv` (any case) selects CSV; everything else is JSON.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Writes `result` to `path` in the format its extension names.
pub fn export(result: &ExecutionResult, path: &Path) -> anyhow::Result<ExportFormat> {
    let format = ExportFormat::for_path(path);
    match format {
        ExportFormat::Csv => self::csv::write_csv(result, path)?,
        ExportFormat::Json => self::json::write_json(result, path)?,
    }
    tracing::info!(event = "askdb.export.written", path = %path.display(), format = ?format);
    Ok(format)
}
