//! JSONL record file writing and reading
//!
//! The primary export is JSON Lines: one self-describing record object
//! per line, fields in declaration order, absent values as nulls.

use crate::records::JobRecord;
use crate::ExportError;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes records to a JSONL file, one record per line
///
/// # Arguments
///
/// * `path` - Destination file path (created or truncated)
/// * `records` - Records in their final (deduplicated, sorted) order
pub fn write_jsonl(path: &Path, records: &[JobRecord]) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    tracing::debug!("Wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}

/// Reads records back from a JSONL file
///
/// Blank lines are ignored; any malformed line fails the whole read.
pub fn read_jsonl(path: &Path) -> Result<Vec<JobRecord>, ExportError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{DetailAttributes, ListingStub};
    use tempfile::tempdir;
    use url::Url;

    fn record(id: &str) -> JobRecord {
        let stub = ListingStub {
            id: id.to_string(),
            detail_url: Url::parse("https://example.com/remote-jobs/x").unwrap(),
            title: Some("Engineer".to_string()),
            company: None,
            slug: None,
            search_text: None,
            tags: vec!["rust".to_string()],
            inline: None,
        };
        JobRecord::merge(stub, DetailAttributes::default())
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.jsonl");

        let records = vec![record("1"), record("2"), record("3")];
        write_jsonl(&path, &records).unwrap();

        let restored = read_jsonl(&path).unwrap();
        assert_eq!(restored, records);
    }

    #[test]
    fn test_one_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.jsonl");

        write_jsonl(&path, &[record("1"), record("2")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_empty_record_set_writes_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.jsonl");

        write_jsonl(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.is_empty());
        assert!(read_jsonl(&path).unwrap().is_empty());
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.jsonl");

        write_jsonl(&path, &[record("1")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#""company":null"#));
        assert!(content.contains(r#""title":"Engineer""#));
    }

    #[test]
    fn test_malformed_line_fails_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jobs.jsonl");
        std::fs::write(&path, "{broken\n").unwrap();

        assert!(read_jsonl(&path).is_err());
    }
}
