//! CSV table export
//!
//! Optional second export holding exactly the same record set as the
//! JSONL file. The header row mirrors the record's field order; list
//! values are serialized as JSON inside their cell.

use crate::records::JobRecord;
use crate::ExportError;
use std::fs::File;
use std::path::Path;

/// Writes records as a CSV table with a header row
///
/// # Arguments
///
/// * `path` - Destination file path (created or truncated)
/// * `records` - Records in their final (deduplicated, sorted) order
pub fn write_table(path: &Path, records: &[JobRecord]) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(JobRecord::CSV_HEADERS)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }

    writer.flush()?;
    tracing::debug!("Wrote {} row(s) to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{DetailAttributes, InlineMetadata, ListingStub, Sections};
    use tempfile::tempdir;
    use url::Url;

    fn record(id: &str) -> JobRecord {
        let stub = ListingStub {
            id: id.to_string(),
            detail_url: Url::parse("https://example.com/remote-jobs/x").unwrap(),
            title: Some("Engineer, Backend".to_string()),
            company: Some("Acme".to_string()),
            slug: None,
            search_text: None,
            tags: vec!["rust".to_string(), "remote, global".to_string()],
            inline: Some(InlineMetadata {
                posted_at: Some("2026-08-01".to_string()),
                salary_min: Some(90000.0),
                ..Default::default()
            }),
        };
        let detail = DetailAttributes {
            views: Some(1234),
            sections: Sections {
                description: Some("Line one\nLine two".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        JobRecord::merge(stub, detail)
    }

    #[test]
    fn test_header_row_matches_field_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.csv");

        write_table(&path, &[record("1")]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        let header_fields: Vec<&str> = headers.iter().collect();
        assert_eq!(header_fields, JobRecord::CSV_HEADERS.to_vec());
    }

    #[test]
    fn test_rows_round_trip_through_csv_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.csv");

        let original = record("1");
        write_table(&path, std::slice::from_ref(&original)).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);

        // Cells survive commas, embedded newlines, and quotes untouched
        let cells: Vec<String> = rows[0].iter().map(String::from).collect();
        assert_eq!(cells, original.to_row());
    }

    #[test]
    fn test_empty_record_set_writes_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.csv");

        write_table(&path, &[]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), JobRecord::CSV_HEADERS.len());
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn test_tags_cell_is_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.csv");

        write_table(&path, &[record("1")]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        let tags_idx = JobRecord::CSV_HEADERS
            .iter()
            .position(|h| *h == "tags")
            .unwrap();
        let tags: Vec<String> = serde_json::from_str(&row[tags_idx]).unwrap();
        assert_eq!(tags, vec!["rust", "remote, global"]);
    }
}
