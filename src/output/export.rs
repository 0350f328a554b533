//! Run export
//!
//! Turns a finished crawl result into files on disk. Every run gets its
//! own timestamped directory under the configured data directory, so no
//! run ever overwrites another:
//!
//! ```text
//! <data-dir>/<stamp>/<stamp>_jobs.jsonl
//! <data-dir>/<stamp>/<stamp>_jobs.csv   (when tabular export is on)
//! ```

use crate::config::OutputConfig;
use crate::output::postprocess::{dedupe_by_identity, sort_records};
use crate::output::{jsonl, tabular};
use crate::records::CrawlResult;
use crate::ExportError;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Suffix probes before giving up on a unique run directory
const RUN_DIR_ATTEMPTS: u32 = 16;

/// Where a finished run's files ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// The run's private directory
    pub directory: PathBuf,

    /// The JSONL record file
    pub records_path: PathBuf,

    /// The CSV table, when tabular export was requested
    pub table_path: Option<PathBuf>,
}

/// Post-processes a crawl result and writes the run's export files
///
/// Deduplicates by identity, orders newest first, then writes the JSONL
/// file (always) and the CSV table (when configured). Both files hold
/// the same record set in the same order.
///
/// # Arguments
///
/// * `result` - The crawl result to export
/// * `output` - Export configuration (data directory, tabular toggle)
///
/// # Returns
///
/// * `Ok(ExportPaths)` - Locations of the written files
/// * `Err(ExportError)` - Directory allocation or file write failure
pub fn finalize(result: CrawlResult, output: &OutputConfig) -> Result<ExportPaths, ExportError> {
    let mut records = dedupe_by_identity(result.records);
    sort_records(&mut records);

    let base = Path::new(&output.data_dir);
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f").to_string();
    let (directory, stamp) = allocate_run_dir(base, &stamp)?;

    let records_path = directory.join(format!("{}_jobs.jsonl", stamp));
    jsonl::write_jsonl(&records_path, &records)?;

    let table_path = if output.tabular_export {
        let path = directory.join(format!("{}_jobs.csv", stamp));
        tabular::write_table(&path, &records)?;
        Some(path)
    } else {
        None
    };

    tracing::info!(
        "Exported {} record(s) from {}/{} page(s) to {}",
        records.len(),
        result.pages_succeeded,
        result.pages_attempted,
        directory.display()
    );

    Ok(ExportPaths {
        directory,
        records_path,
        table_path,
    })
}

/// Creates a uniquely named run directory under the base directory
///
/// Uses the stamp as the directory name, probing `-1`, `-2`, ... suffixes
/// when two runs land on the same millisecond. Returns the directory and
/// the name actually used.
fn allocate_run_dir(base: &Path, stamp: &str) -> Result<(PathBuf, String), ExportError> {
    std::fs::create_dir_all(base)?;

    for attempt in 0..RUN_DIR_ATTEMPTS {
        let name = if attempt == 0 {
            stamp.to_string()
        } else {
            format!("{}-{}", stamp, attempt)
        };

        let directory = base.join(&name);
        match std::fs::create_dir(&directory) {
            Ok(()) => return Ok((directory, name)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ExportError::RunDir(base.to_path_buf()))
}
