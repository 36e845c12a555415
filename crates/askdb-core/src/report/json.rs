use crate::model::ExecutionResult;
use serde_json::json;
use std::path::Path;

/// Exports columns and rows verbatim, one JSON object per result.
pub fn write_json(result: &ExecutionResult, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let doc = json!({
        "columns": result.columns,
        "rows": result.rows,
        "row_count": result.row_count(),
    });
    std::fs::write(path, serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}
