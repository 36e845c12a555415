//! Read-only introspection of a SQLite database file.

use crate::errors::DataSourceError;
use crate::model::{ColumnInfo, ForeignKey, SchemaSnapshot, SqlValue, TableInfo};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use std::time::UNIX_EPOCH;

pub const SAMPLE_ROW_LIMIT: usize = 3;

/// Builds a [`SchemaSnapshot`] for the database at `path`.
///
/// Tables are visited in catalog order. Each table's `CREATE` statement is
/// appended verbatim to `schema_text`, followed by `;` and a blank line.
/// SQLite-internal tables (`sqlite_%`) are skipped.
pub fn inspect(path: &Path) -> Result<SchemaSnapshot, DataSourceError> {
    let conn = open_read_only(path)?;
    let err = |e: rusqlite::Error| DataSourceError::new(path, e.to_string());

    let mut stmt = conn
        .prepare(
            "SELECT name, sql FROM sqlite_master
             WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        )
        .map_err(err)?;
    let entries = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })
        .map_err(err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(err)?;

    let mut snapshot = SchemaSnapshot::default();
    for (name, create_sql) in entries {
        if let Some(ddl) = create_sql {
            snapshot.schema_text.push_str(&ddl);
            snapshot.schema_text.push_str(";\n\n");
        }

        let info = TableInfo {
            columns: columns(&conn, &name).map_err(err)?,
            sample_rows: sample_rows(&conn, &name).map_err(err)?,
            foreign_keys: foreign_keys(&conn, &name).map_err(err)?,
            name: name.clone(),
        };
        snapshot.tables.push(name);
        snapshot.table_info.push(info);
    }

    tracing::debug!(
        event = "askdb.schema.inspected",
        db = %path.display(),
        tables = snapshot.tables.len()
    );
    Ok(snapshot)
}

/// Modification time of the database file in nanoseconds since the Unix epoch.
pub fn source_mtime(path: &Path) -> Result<i64, DataSourceError> {
    let meta = std::fs::metadata(path).map_err(|_| DataSourceError::missing(path))?;
    if !meta.is_file() {
        return Err(DataSourceError::new(path, "not a regular file"));
    }
    let modified = meta
        .modified()
        .map_err(|e| DataSourceError::new(path, format!("mtime unavailable: {}", e)))?;
    let nanos = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    Ok(i64::try_from(nanos).unwrap_or(i64::MAX))
}

pub(crate) fn open_read_only(path: &Path) -> Result<Connection, DataSourceError> {
    if !path.is_file() {
        return Err(DataSourceError::missing(path));
    }
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| DataSourceError::new(path, e.to_string()))
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1)",
    )?;
    let rows = stmt.query_map(params![table], |row| {
        Ok(ColumnInfo {
            index: row.get(0)?,
            name: row.get(1)?,
            declared_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            not_null: row.get::<_, i64>(3)? != 0,
            default_value: row.get(4)?,
            primary_key: row.get::<_, i64>(5)? > 0,
        })
    })?;
    rows.collect()
}

fn sample_rows(conn: &Connection, table: &str) -> rusqlite::Result<Vec<Vec<SqlValue>>> {
    let sql = format!(
        "SELECT * FROM {} LIMIT {}",
        quote_ident(table),
        SAMPLE_ROW_LIMIT
    );
    let mut stmt = conn.prepare(&sql)?;
    let width = stmt.column_count();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(SqlValue::from(row.get_ref(i)?));
        }
        out.push(values);
    }
    Ok(out)
}

fn foreign_keys(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ForeignKey>> {
    let mut stmt = conn.prepare(
        "SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
    )?;
    let rows = stmt.query_map(params![table], |row| {
        Ok(ForeignKey {
            from_column: row.get(0)?,
            to_table: row.get(1)?,
            to_column: row.get(2)?,
        })
    })?;
    rows.collect()
}
