use crate::model::{ExecutionResult, TranslationResult};

const MAX_CELL_WIDTH: usize = 40;

/// Aligned text table; rows beyond `max_rows` are summarized.
pub fn render_table(result: &ExecutionResult, max_rows: usize) -> String {
    if !result.success {
        return format!(
            "❌ {}\n",
            result.error.as_deref().unwrap_or("query failed")
        );
    }
    if result.columns.is_empty() {
        return "✅ Statement executed (no result set)\n".to_string();
    }

    let shown: Vec<Vec<String>> = result
        .rows
        .iter()
        .take(max_rows)
        .map(|row| row.iter().map(|v| truncate(&v.to_string())).collect())
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &shown {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format_row(&result.columns, &widths));
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &shown {
        out.push_str(&format_row(row, &widths));
    }

    let total = result.row_count();
    if total > shown.len() {
        out.push_str(&format!("... {} more rows\n", total - shown.len()));
    }
    out.push_str(&format!(
        "({} row{})\n",
        total,
        if total == 1 { "" } else { "s" }
    ));
    out
}

pub fn print_table(result: &ExecutionResult, max_rows: usize) {
    print!("{}", render_table(result, max_rows));
}

pub fn print_translation(t: &TranslationResult) {
    eprintln!("Reasoning:\n{}\n", t.reasoning);
    println!("{}", t.sql);
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect::<Vec<_>>()
        .join(" | ");
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

fn truncate(s: &str) -> String {
    let single = s.replace('\n', " ");
    if single.chars().count() > MAX_CELL_WIDTH {
        let cut: String = single.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        single
    }
}
