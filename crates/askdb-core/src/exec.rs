use crate::model::{ExecutionResult, SqlValue};
use rusqlite::{Batch, Connection, OpenFlags, Statement};
use std::path::Path;

/// Text containing only whitespace or comments, such as the generation
/// failure sentinel.
pub const NO_STATEMENT: &str = "no SQL statement to execute";

/// Runs `sql` verbatim against the database at `path`.
///
/// Every statement in the text runs, in order, with no rewriting and no
/// surrounding transaction; the result set of the last one is returned.
/// Statements are compiled one at a time, so a later statement may refer to
/// objects an earlier one created. Mutating statements run too. Column names
/// are captured only when the last statement yields a result set. All rows
/// are fetched eagerly. Engine failures are returned as `success: false`
/// with the engine's message, prefixed with the statement's position when
/// it is not the first; statements before the failing one stay applied.
/// This never returns `Err`.
///
/// The file must already exist; it is never created here.
pub fn execute(path: &Path, sql: &str) -> ExecutionResult {
    let started = std::time::Instant::now();
    let result = match run(path, sql) {
        Ok((columns, rows)) => ExecutionResult::ok(columns, rows),
        Err(e) => ExecutionResult::failed(e),
    };

    if result.success {
        tracing::info!(
            event = "askdb.sql.executed",
            db = %path.display(),
            rows = result.row_count(),
            duration_ms = started.elapsed().as_millis() as u64
        );
    } else {
        tracing::info!(
            event = "askdb.sql.failed",
            db = %path.display(),
            error = result.error.as_deref().unwrap_or_default()
        );
    }
    result
}

fn run(path: &Path, sql: &str) -> Result<(Vec<String>, Vec<Vec<SqlValue>>), String> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| e.to_string())?;

    let mut batch = Batch::new(&conn, sql);
    let mut last = None;
    let mut position = 0;
    // comment-only fragments are skipped by the batch
    while let Some(mut stmt) = batch.next().map_err(|e| failure(position + 1, e))? {
        position += 1;
        last = Some(collect(&mut stmt).map_err(|e| failure(position, e))?);
    }
    last.ok_or_else(|| NO_STATEMENT.to_string())
}

fn failure(position: usize, e: rusqlite::Error) -> String {
    if position <= 1 {
        e.to_string()
    } else {
        format!("statement {}: {}", position, e)
    }
}

fn collect(stmt: &mut Statement<'_>) -> rusqlite::Result<(Vec<String>, Vec<Vec<SqlValue>>)> {
    let width = stmt.column_count();
    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(SqlValue::from(row.get_ref(i)?));
        }
        out.push(values);
    }
    Ok((columns, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.db");
        Connection::open(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn select_literal() {
        let (_d, p) = scratch();
        let r = execute(&p, "SELECT 1 AS x");
        assert!(r.success);
        assert_eq!(r.columns, vec!["x"]);
        assert_eq!(r.rows, vec![vec![SqlValue::Integer(1)]]);
        assert!(r.error.is_none());
    }

    #[test]
    fn ddl_has_no_columns() {
        let (_d, p) = scratch();
        let r = execute(&p, "CREATE TABLE t (a INTEGER)");
        assert!(r.success, "{:?}", r.error);
        assert!(r.columns.is_empty());
        assert!(r.rows.is_empty());
    }

    #[test]
    fn comment_only_text_reports_no_statement() {
        let (_d, p) = scratch();
        for sql in ["", "   ", "-- just a comment", "/* block */ ;"] {
            let r = execute(&p, sql);
            assert!(!r.success, "{sql:?}");
            assert_eq!(r.error.as_deref(), Some(NO_STATEMENT), "{sql:?}");
        }
    }

    #[test]
    fn later_statement_sees_earlier_ones() {
        let (_d, p) = scratch();
        let r = execute(&p, "CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (7); SELECT a FROM t");
        assert!(r.success, "{:?}", r.error);
        assert_eq!(r.columns, vec!["a"]);
        assert_eq!(r.rows, vec![vec![SqlValue::Integer(7)]]);
    }

    #[test]
    fn trailing_semicolon_and_comment_are_accepted() {
        let (_d, p) = scratch();
        let r = execute(&p, "SELECT 2 AS y; -- done\n");
        assert!(r.success, "{:?}", r.error);
        assert_eq!(r.rows, vec![vec![SqlValue::Integer(2)]]);
    }

    #[test]
    fn missing_file_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("absent.db");
        let r = execute(&p, "SELECT 1");
        assert!(!r.success);
        assert!(!p.exists());
    }
}
