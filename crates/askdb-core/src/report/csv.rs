use crate::model::{ExecutionResult, SqlValue};
use anyhow::Context;
use std::path::Path;

/// Header from the column names, then one record per row. NULL becomes an
/// empty field and blobs are written as lowercase hex, as in the JSON export.
/// A statement without a result set produces an empty file.
pub fn write_csv(result: &ExecutionResult, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = ::csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if !result.columns.is_empty() {
        writer.write_record(&result.columns)?;
        for row in &result.rows {
            writer.write_record(row.iter().map(cell))?;
        }
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn cell(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Blob(b) => hex::encode(b),
        other => other.to_string(),
    }
}
