//! Output module for post-processing and exporting harvested records
//!
//! This module handles:
//! - Deduplicating records by listing identity
//! - Ordering records by posting date
//! - Writing the JSONL record file and the optional CSV table
//! - Allocating one timestamped directory per run

mod export;
mod jsonl;
mod postprocess;
mod tabular;

pub use export::{finalize, ExportPaths};
pub use jsonl::{read_jsonl, write_jsonl};
pub use postprocess::{dedupe_by_identity, sort_records};
pub use tabular::write_table;
