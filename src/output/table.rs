//! Table output for the dry-run listing

use std::path::Path;

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::client::FileRecord;
use crate::download::local_path;

/// One matching file as shown by `--dry-run`
#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "EXT")]
    extension: String,
    #[tabled(rename = "CREATED")]
    created: String,
    #[tabled(rename = "TARGET")]
    target: String,
}

impl FileRow {
    fn new(record: &FileRecord, dir: &Path) -> Self {
        let target = match local_path(dir, record) {
            Ok(path) => path.display().to_string(),
            Err(err) => format!("(skipped: {})", err),
        };

        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            extension: record.file_extension.clone(),
            created: record
                .created_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            target,
        }
    }
}

/// Render the records that would be downloaded into `dir`
pub fn format_file_table(records: &[FileRecord], dir: &Path) -> String {
    if records.is_empty() {
        return "No files found.".to_string();
    }

    let rows: Vec<FileRow> = records.iter().map(|r| FileRow::new(r, dir)).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::record;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_listing() {
        assert_eq!(format_file_table(&[], Path::new("out")), "No files found.");
    }

    #[test]
    fn test_listing_shows_target_and_date() {
        let mut file = record("068xx0000001", "TestFile1", "pdf");
        file.created_date = Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());

        let result = format_file_table(&[file], Path::new("out"));

        assert!(result.contains("TITLE"));
        assert!(result.contains("068xx0000001"));
        assert!(result.contains("2024-01-15 10:30"));
        assert!(result.contains("TestFile1.pdf"));
        // Rounded style uses ╭ for top-left corner
        assert!(result.contains("╭"));
    }

    #[test]
    fn test_listing_flags_unusable_names() {
        let result = format_file_table(&[record("X9", "a/b", "pdf")], Path::new("out"));
        assert!(result.contains("skipped"));
    }

    #[test]
    fn test_listing_missing_date() {
        let result = format_file_table(&[record("X1", "Plain", "txt")], Path::new("out"));
        assert!(result.contains(" - "));
    }
}
