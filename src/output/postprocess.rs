//! Record post-processing
//!
//! Runs after the crawl loop and before any file is written:
//! - Deduplication by listing identity (the fresher sighting wins)
//! - Stable ordering by posting date, newest first

use crate::records::JobRecord;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Collapses records sharing an identity down to one each
///
/// The source repeats listings across adjacent index pages, so the same
/// identity is routinely harvested more than once per run. The last
/// sighting carries the freshest counters and wins; it is kept at the
/// position where the identity first appeared, so the pre-sort order
/// stays stable.
pub fn dedupe_by_identity(records: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut deduped: Vec<JobRecord> = Vec::with_capacity(records.len());

    for record in records {
        match seen.get(&record.id) {
            Some(&slot) => {
                deduped[slot] = record;
            }
            None => {
                seen.insert(record.id.clone(), deduped.len());
                deduped.push(record);
            }
        }
    }

    deduped
}

/// Orders records by posting date, newest first
///
/// Records whose date is absent or unparsable sink to the end while
/// keeping their relative order; the sort is stable throughout.
pub fn sort_records(records: &mut [JobRecord]) {
    records.sort_by(|a, b| match (a.posted_timestamp(), b.posted_timestamp()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
