//! Job listing record types
//!
//! A listing passes through three shapes on its way to export:
//! 1. `ListingStub` - parsed from one index row (attributes + JSON-LD)
//! 2. `DetailAttributes` - scraped from the listing's detail page
//! 3. `JobRecord` - the flat merge of the two, ready for JSONL/CSV
//!
//! Every field that the source may omit is optional. An absent value
//! stays absent through merge and export; it is never defaulted to an
//! empty string or zero.

use crate::records::sections::Sections;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use url::Url;

/// One listing as seen on an index page
///
/// Identity (`id`) and `detail_url` are guaranteed present; rows missing
/// either are dropped during parsing. Everything else is best-effort.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingStub {
    /// Source-assigned listing identity
    pub id: String,

    /// Absolute URL of the listing's detail page
    pub detail_url: Url,

    /// Position title, from the JSON-LD blob or the row markup
    pub title: Option<String>,

    /// Hiring organization name, from the JSON-LD blob or the row markup
    pub company: Option<String>,

    /// URL slug carried on the row
    pub slug: Option<String>,

    /// Search text carried on the row, truncated before any serialized payload
    pub search_text: Option<String>,

    /// Tag labels in row order, duplicates preserved
    pub tags: Vec<String>,

    /// Structured metadata from the row's embedded JSON-LD blob, when
    /// the blob was present and parseable
    pub inline: Option<InlineMetadata>,
}

/// Structured metadata lifted from a row's JSON-LD blob
///
/// Field-by-field extraction: a malformed or missing value leaves that
/// one field `None` without discarding the rest of the blob.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InlineMetadata {
    pub posted_at: Option<String>,
    pub valid_through: Option<String>,
    pub employment_type: Option<String>,
    pub industry: Option<String>,
    pub location_type: Option<String>,
    /// Applicant location constraints, comma-joined when multi-valued
    pub location_requirements: Option<String>,
    /// Job locations, comma-joined when multi-valued
    pub locations: Option<String>,
    pub occupational_category: Option<String>,
    pub work_hours: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_currency: Option<String>,
    pub company_url: Option<String>,
    pub company_logo: Option<String>,
    pub direct_apply: Option<bool>,
    pub image: Option<String>,
    /// Raw description HTML carried inside the blob; superseded by the
    /// detail page's plain-text description when that one exists
    pub description: Option<String>,
    pub benefits: Option<String>,
}

/// Attributes scraped from a listing's detail page
///
/// A failed detail fetch yields the default value: every attribute
/// absent, sections empty. The listing still exports with whatever the
/// index row provided.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailAttributes {
    /// Absolute URL of the external apply control
    pub apply_link: Option<String>,

    /// View counter, absent when the widget is missing or unparsable
    pub views: Option<u64>,

    /// Application counter, absent when the widget is missing or unparsable
    pub applied: Option<u64>,

    /// Absolute URL of the company profile page
    pub company_link: Option<String>,

    /// Long-form description split into labelled sections
    pub sections: Sections,
}

/// Flat export record for one harvested listing
///
/// Serializes field-for-field in declaration order; the CSV header row
/// mirrors the same order via [`JobRecord::CSV_HEADERS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub detail_url: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub slug: Option<String>,
    pub search_text: Option<String>,
    pub tags: Vec<String>,
    pub posted_at: Option<String>,
    pub valid_through: Option<String>,
    pub employment_type: Option<String>,
    pub industry: Option<String>,
    pub location_type: Option<String>,
    pub location_requirements: Option<String>,
    pub locations: Option<String>,
    pub occupational_category: Option<String>,
    pub work_hours: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_currency: Option<String>,
    pub company_url: Option<String>,
    pub company_logo: Option<String>,
    pub direct_apply: Option<bool>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
    pub tech_stack: Option<String>,
    pub benefits: Option<String>,
    pub salary_text: Option<String>,
    pub apply_link: Option<String>,
    pub views: Option<u64>,
    pub applied: Option<u64>,
    pub company_link: Option<String>,
}

impl JobRecord {
    /// CSV header row, one column per field in declaration order
    pub const CSV_HEADERS: [&'static str; 33] = [
        "id",
        "detail_url",
        "title",
        "company",
        "slug",
        "search_text",
        "tags",
        "posted_at",
        "valid_through",
        "employment_type",
        "industry",
        "location_type",
        "location_requirements",
        "locations",
        "occupational_category",
        "work_hours",
        "salary_min",
        "salary_max",
        "salary_currency",
        "company_url",
        "company_logo",
        "direct_apply",
        "image",
        "description",
        "responsibilities",
        "requirements",
        "tech_stack",
        "benefits",
        "salary_text",
        "apply_link",
        "views",
        "applied",
        "company_link",
    ];

    /// Merges an index stub with its detail attributes into a flat record
    ///
    /// Merge rules:
    /// - Index-derived fields pass through unchanged
    /// - Detail sections win over the inline blob's raw description
    /// - Inline values fill any section the detail page did not provide
    ///
    /// # Arguments
    ///
    /// * `stub` - The listing as parsed from the index page
    /// * `detail` - Attributes from the detail page (default when the
    ///   detail fetch failed)
    pub fn merge(stub: ListingStub, detail: DetailAttributes) -> Self {
        let inline = stub.inline.unwrap_or_default();
        let sections = detail.sections;

        JobRecord {
            id: stub.id,
            detail_url: stub.detail_url.to_string(),
            title: stub.title,
            company: stub.company,
            slug: stub.slug,
            search_text: stub.search_text,
            tags: stub.tags,
            posted_at: inline.posted_at,
            valid_through: inline.valid_through,
            employment_type: inline.employment_type,
            industry: inline.industry,
            location_type: inline.location_type,
            location_requirements: inline.location_requirements,
            locations: inline.locations,
            occupational_category: inline.occupational_category,
            work_hours: inline.work_hours,
            salary_min: inline.salary_min,
            salary_max: inline.salary_max,
            salary_currency: inline.salary_currency,
            company_url: inline.company_url,
            company_logo: inline.company_logo,
            direct_apply: inline.direct_apply,
            image: inline.image,
            description: sections.description.or(inline.description),
            responsibilities: sections.responsibilities,
            requirements: sections.requirements,
            tech_stack: sections.tech_stack,
            benefits: sections.benefits.or(inline.benefits),
            salary_text: sections.salary,
            apply_link: detail.apply_link,
            views: detail.views,
            applied: detail.applied,
            company_link: detail.company_link,
        }
    }

    /// Parses the posting date for ordering purposes
    ///
    /// Accepts RFC 3339 timestamps (normalized to UTC) and plain
    /// `YYYY-MM-DD` dates (taken as midnight). Returns None when the
    /// field is absent or matches neither format.
    pub fn posted_timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.posted_at.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
        None
    }

    /// Renders the record as one CSV row matching [`Self::CSV_HEADERS`]
    ///
    /// Absent values become empty cells. The tags column holds the tag
    /// list as a JSON array so the cell survives commas in tag names.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.detail_url.clone(),
            cell(&self.title),
            cell(&self.company),
            cell(&self.slug),
            cell(&self.search_text),
            serde_json::to_string(&self.tags).unwrap_or_default(),
            cell(&self.posted_at),
            cell(&self.valid_through),
            cell(&self.employment_type),
            cell(&self.industry),
            cell(&self.location_type),
            cell(&self.location_requirements),
            cell(&self.locations),
            cell(&self.occupational_category),
            cell(&self.work_hours),
            num_cell(&self.salary_min),
            num_cell(&self.salary_max),
            cell(&self.salary_currency),
            cell(&self.company_url),
            cell(&self.company_logo),
            num_cell(&self.direct_apply),
            cell(&self.image),
            cell(&self.description),
            cell(&self.responsibilities),
            cell(&self.requirements),
            cell(&self.tech_stack),
            cell(&self.benefits),
            cell(&self.salary_text),
            cell(&self.apply_link),
            num_cell(&self.views),
            num_cell(&self.applied),
            cell(&self.company_link),
        ]
    }
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn num_cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

/// Outcome of a crawl run before post-processing
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Accumulated records in harvest order (pre-dedup, pre-sort)
    pub records: Vec<JobRecord>,

    /// Index pages the coordinator tried to fetch
    pub pages_attempted: u32,

    /// Index pages that were fetched and parsed without error
    pub pages_succeeded: u32,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_stub(id: &str) -> ListingStub {
        ListingStub {
            id: id.to_string(),
            detail_url: Url::parse("https://example.com/remote-jobs/engineer-1").unwrap(),
            title: Some("Engineer".to_string()),
            company: Some("Acme".to_string()),
            slug: Some("engineer-1".to_string()),
            search_text: Some("engineer acme".to_string()),
            tags: vec!["rust".to_string(), "backend".to_string()],
            inline: Some(InlineMetadata {
                posted_at: Some("2026-08-01T12:00:00Z".to_string()),
                description: Some("<p>Inline description</p>".to_string()),
                benefits: Some("Inline benefits".to_string()),
                salary_min: Some(90000.0),
                salary_max: Some(120000.0),
                salary_currency: Some("USD".to_string()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_merge_passes_index_fields_through() {
        let record = JobRecord::merge(test_stub("42"), DetailAttributes::default());
        assert_eq!(record.id, "42");
        assert_eq!(
            record.detail_url,
            "https://example.com/remote-jobs/engineer-1"
        );
        assert_eq!(record.title.as_deref(), Some("Engineer"));
        assert_eq!(record.company.as_deref(), Some("Acme"));
        assert_eq!(record.tags, vec!["rust", "backend"]);
        assert_eq!(record.salary_min, Some(90000.0));
        assert_eq!(record.salary_max, Some(120000.0));
    }

    #[test]
    fn test_merge_prefers_detail_sections_over_inline_description() {
        let detail = DetailAttributes {
            sections: Sections {
                description: Some("Plain text description".to_string()),
                benefits: Some("Detail benefits".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let record = JobRecord::merge(test_stub("42"), detail);
        assert_eq!(record.description.as_deref(), Some("Plain text description"));
        assert_eq!(record.benefits.as_deref(), Some("Detail benefits"));
    }

    #[test]
    fn test_merge_falls_back_to_inline_when_sections_absent() {
        let record = JobRecord::merge(test_stub("42"), DetailAttributes::default());
        assert_eq!(
            record.description.as_deref(),
            Some("<p>Inline description</p>")
        );
        assert_eq!(record.benefits.as_deref(), Some("Inline benefits"));
    }

    #[test]
    fn test_merge_without_inline_blob_leaves_metadata_absent() {
        let mut stub = test_stub("42");
        stub.inline = None;
        let record = JobRecord::merge(stub, DetailAttributes::default());
        assert!(record.posted_at.is_none());
        assert!(record.description.is_none());
        assert!(record.salary_min.is_none());
        // Identity and row attributes survive
        assert_eq!(record.id, "42");
        assert_eq!(record.title.as_deref(), Some("Engineer"));
    }

    #[test]
    fn test_merge_carries_detail_attributes() {
        let detail = DetailAttributes {
            apply_link: Some("https://example.com/l/42".to_string()),
            views: Some(1234),
            applied: Some(56),
            company_link: Some("https://example.com/acme".to_string()),
            sections: Sections::default(),
        };
        let record = JobRecord::merge(test_stub("42"), detail);
        assert_eq!(record.apply_link.as_deref(), Some("https://example.com/l/42"));
        assert_eq!(record.views, Some(1234));
        assert_eq!(record.applied, Some(56));
        assert_eq!(
            record.company_link.as_deref(),
            Some("https://example.com/acme")
        );
    }

    #[test]
    fn test_posted_timestamp_parses_rfc3339() {
        let record = JobRecord::merge(test_stub("42"), DetailAttributes::default());
        let ts = record.posted_timestamp().unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2026-08-01 12:00");
    }

    #[test]
    fn test_posted_timestamp_normalizes_offsets_to_utc() {
        let mut record = JobRecord::merge(test_stub("42"), DetailAttributes::default());
        record.posted_at = Some("2026-08-01T12:00:00+02:00".to_string());
        let ts = record.posted_timestamp().unwrap();
        assert_eq!(ts.format("%H:%M").to_string(), "10:00");
    }

    #[test]
    fn test_posted_timestamp_parses_plain_date() {
        let mut record = JobRecord::merge(test_stub("42"), DetailAttributes::default());
        record.posted_at = Some("2026-08-01".to_string());
        let ts = record.posted_timestamp().unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2026-08-01 00:00");
    }

    #[test]
    fn test_posted_timestamp_rejects_garbage() {
        let mut record = JobRecord::merge(test_stub("42"), DetailAttributes::default());
        record.posted_at = Some("three weeks ago".to_string());
        assert!(record.posted_timestamp().is_none());
        record.posted_at = None;
        assert!(record.posted_timestamp().is_none());
    }

    #[test]
    fn test_to_row_matches_header_width() {
        let record = JobRecord::merge(test_stub("42"), DetailAttributes::default());
        assert_eq!(record.to_row().len(), JobRecord::CSV_HEADERS.len());
    }

    #[test]
    fn test_to_row_cells() {
        let detail = DetailAttributes {
            views: Some(1234),
            ..Default::default()
        };
        let record = JobRecord::merge(test_stub("42"), detail);
        let row = record.to_row();
        assert_eq!(row[0], "42");
        // Tags cell is a JSON array
        assert_eq!(row[6], r#"["rust","backend"]"#);
        // Absent values are empty cells
        let applied_idx = JobRecord::CSV_HEADERS
            .iter()
            .position(|h| *h == "applied")
            .unwrap();
        assert_eq!(row[applied_idx], "");
        let views_idx = JobRecord::CSV_HEADERS
            .iter()
            .position(|h| *h == "views")
            .unwrap();
        assert_eq!(row[views_idx], "1234");
    }
}
