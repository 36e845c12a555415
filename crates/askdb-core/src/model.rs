use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Point-in-time structural description of a database.
///
/// `tables` and `table_info` share catalog enumeration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaSnapshot {
    pub tables: Vec<String>,
    pub schema_text: String,
    pub table_info: Vec<TableInfo>,
}

impl SchemaSnapshot {
    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.table_info.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    /// At most three rows.
    pub sample_rows: Vec<Vec<SqlValue>>,
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub index: i64,
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub from_column: String,
    pub to_table: String,
    /// `None` when the clause references the parent's primary key implicitly.
    pub to_column: Option<String>,
}

/// A single cell, keeping the storage class SQLite reported for it.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Real(v) => write!(f, "{}", v),
            SqlValue::Text(v) => f.write_str(v),
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Blob(v) => write!(f, "x'{}'", hex::encode(v)),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Integer(v) => serializer.serialize_i64(*v),
            SqlValue::Real(v) => serializer.serialize_f64(*v),
            SqlValue::Text(v) => serializer.serialize_str(v),
            SqlValue::Null => serializer.serialize_unit(),
            SqlValue::Blob(v) => serializer.serialize_str(&hex::encode(v)),
        }
    }
}

impl From<rusqlite::types::ValueRef<'_>> for SqlValue {
    fn from(v: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;
        match v {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(r) => SqlValue::Real(r),
            // SQLite does not validate TEXT; keep undecodable bytes intact
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(s) => SqlValue::Text(s.to_string()),
                Err(_) => SqlValue::Blob(t.to_vec()),
            },
            ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    pub reasoning: String,
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn ok(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            success: true,
            columns,
            rows,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            columns: Vec::new(),
            rows: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Model-assisted operations, one prompt template each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    ExplainSchema,
    SuggestQuestions,
    TranslateQuestion { question: String },
}

/// Namespaces in the shared analysis cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTask {
    Explain,
    Suggest,
    Diagram,
}

impl CacheTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTask::Explain => "explain",
            CacheTask::Suggest => "suggest",
            CacheTask::Diagram => "diagram",
        }
    }

    /// Whether entries are only valid for the model that produced them.
    pub fn is_model_dependent(&self) -> bool {
        !matches!(self, CacheTask::Diagram)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum CachePayload {
    Analysis(String),
    Suggestions(Vec<String>),
    Diagram(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: CachePayload,
    /// Database file modification time (ns since the Unix epoch) at generation.
    pub source_mtime: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(payload: CachePayload, source_mtime: i64, model: Option<String>) -> Self {
        Self {
            payload,
            source_mtime,
            model,
            generated_at: Utc::now(),
        }
    }

    /// Valid iff the mtime matches and, when a model is required, the model matches too.
    pub fn is_valid_for(&self, source_mtime: i64, model: Option<&str>) -> bool {
        if self.source_mtime != source_mtime {
            return false;
        }
        match model {
            Some(m) => self.model.as_deref() == Some(m),
            None => true,
        }
    }
}
