//! Common types used across Owl

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a persisted file (script, macro or data file)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub i64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FileId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Identifier of a database registered on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseId(pub i64);

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DatabaseId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Identity of one open editor tab, distinct from the file it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of file a tab is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Executable SQL script
    #[default]
    ScriptFile,
    /// Jinja-style template rendered into SQL
    MacroFile,
    /// Raw data file (CSV, parquet, ...)
    DataFile,
}

impl FileType {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FileType::ScriptFile => "script",
            FileType::MacroFile => "macro",
            FileType::DataFile => "data file",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference to the file shown in a tab
///
/// An unsaved file has no `id`. Content stays `None` until it is typed
/// or fetched from the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileRef {
    pub id: Option<FileId>,
    pub file_type: FileType,
    pub name: Option<String>,
    pub content: Option<String>,
}

impl FileRef {
    /// A new, never-saved file of the given type
    pub fn unsaved(file_type: FileType) -> Self {
        Self {
            id: None,
            file_type,
            name: None,
            content: None,
        }
    }

    /// A file already persisted on the server
    pub fn persisted(id: FileId, file_type: FileType, name: Option<String>) -> Self {
        Self {
            id: Some(id),
            file_type,
            name,
            content: None,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Current content, empty when unset
    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Script entry as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSummary {
    pub id: FileId,
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub extension: String,
}

impl ScriptSummary {
    pub fn new(id: impl Into<FileId>, name: impl Into<String>) -> Self {
        let name = name.into();
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();
        Self {
            id: id.into(),
            path: name.clone(),
            name,
            extension,
        }
    }
}

/// Data file entry as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFileSummary {
    pub id: FileId,
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub extension: String,
}

/// Multipart upload payload for a script file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadForm {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Parameters for executing a statement against a database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub database_id: Option<DatabaseId>,
    pub query: String,
    /// First row of the requested page (inclusive)
    pub start_row: Option<u64>,
    /// Last row of the requested page (exclusive)
    pub end_row: Option<u64>,
    pub with_total_count: Option<bool>,
}

impl RunRequest {
    pub fn new(database_id: Option<DatabaseId>, query: impl Into<String>) -> Self {
        Self {
            database_id,
            query: query.into(),
            start_row: None,
            end_row: None,
            with_total_count: None,
        }
    }

    pub fn with_page(mut self, start_row: Option<u64>, end_row: Option<u64>) -> Self {
        self.start_row = start_row;
        self.end_row = end_row;
        self
    }

    pub fn with_total_count(mut self, with_total_count: Option<bool>) -> Self {
        self.with_total_count = with_total_count;
        self
    }

    /// Whether this request asks for a page after the first one
    pub fn is_follow_up_page(&self) -> bool {
        self.start_row.is_some_and(|row| row > 0)
    }
}

/// Outcome of a statement execution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub query: String,
    #[serde(default)]
    pub database_id: Option<DatabaseId>,
    #[serde(default)]
    pub statement_type: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    /// One JSON object per row
    #[serde(default)]
    pub data: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
    #[serde(default)]
    pub affected_rows: Option<u64>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub start_row: Option<u64>,
    #[serde(default)]
    pub end_row: Option<u64>,
}

impl RunResult {
    /// Number of rows carried by this page
    pub fn row_count(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }
}

/// Rendered macro text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMacro {
    pub content: String,
}
