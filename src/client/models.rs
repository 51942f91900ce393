//! Typed Salesforce query results

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Timestamp format used by the REST API, e.g. `2024-01-15T10:30:00.000+0000`
const SALESFORCE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Envelope returned by the `query` resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub total_size: u64,

    #[serde(default = "default_done")]
    pub done: bool,

    #[serde(default)]
    pub next_records_url: Option<String>,

    #[serde(default)]
    pub records: Vec<Value>,
}

fn default_done() -> bool {
    true
}

/// One `ContentVersion` row as the API sends it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContentVersionRow {
    id: Option<String>,
    title: Option<String>,
    file_extension: Option<String>,
    content_document_id: Option<String>,
    checksum: Option<String>,
    version_data: Option<String>,
    first_published_location_id: Option<String>,
    created_date: Option<String>,
}

/// A file attachment that can be downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// ContentVersion ID
    pub id: String,

    /// Display title, used as the local file stem
    pub title: String,

    /// Extension without the leading dot
    pub file_extension: String,

    /// Owning ContentDocument ID
    pub content_document_id: Option<String>,

    /// MD5 of the content, hex encoded
    pub checksum: Option<String>,

    /// Relative REST URL of the raw content
    pub version_data: Option<String>,

    /// Record the file was first shared to
    pub first_published_location_id: Option<String>,

    pub created_date: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Build a record from a raw query row.
    ///
    /// Rows without an ID, title or extension can't be turned into a download
    /// and are rejected with a short reason.
    pub fn from_row(row: Value) -> Result<Self, String> {
        let row: ContentVersionRow =
            serde_json::from_value(row).map_err(|e| format!("unexpected row shape: {}", e))?;

        let id = row.id.ok_or("missing Id")?;
        let title = row
            .title
            .ok_or_else(|| format!("record {} has no Title", id))?;
        let file_extension = row
            .file_extension
            .ok_or_else(|| format!("record {} has no FileExtension", id))?;

        let created_date = row.created_date.as_deref().and_then(|raw| {
            let parsed = parse_datetime(raw);
            if parsed.is_none() {
                log::debug!("Ignoring unparseable CreatedDate {:?} on {}", raw, id);
            }
            parsed
        });

        Ok(Self {
            id,
            title,
            file_extension,
            content_document_id: row.content_document_id,
            checksum: row.checksum,
            version_data: row.version_data,
            first_published_location_id: row.first_published_location_id,
            created_date,
        })
    }

    /// Local file name: `{title}.{extension}`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.title, self.file_extension)
    }
}

/// Convert raw rows into records, logging and dropping the malformed ones
pub fn parse_records(rows: Vec<Value>) -> Vec<FileRecord> {
    rows.into_iter()
        .filter_map(|row| match FileRecord::from_row(row) {
            Ok(record) => Some(record),
            Err(reason) => {
                log::warn!("Skipping malformed ContentVersion row: {}", reason);
                None
            }
        })
        .collect()
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, SALESFORCE_DATETIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
