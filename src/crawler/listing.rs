//! Index page parsing
//!
//! The index endpoint answers with a bare sequence of `<tr>` rows, not a
//! full document. This module turns that markup into listing stubs:
//! - Required row attributes give each stub its identity and detail URL
//! - The row's embedded JSON-LD blob, when present and parseable,
//!   contributes structured metadata
//! - Tag labels are collected in row order
//!
//! Extraction is fail-soft throughout: a broken blob or a missing field
//! degrades that one value to absent, and only rows lacking an identity
//! or detail URL are dropped entirely.

use crate::records::{InlineMetadata, ListingStub};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

/// Markers that open a serialized payload inside the search text attribute
const SEARCH_PAYLOAD_MARKERS: [&str; 2] = [" [", " {"];

struct RowSelectors {
    row: Selector,
    tag: Selector,
    ld_json: Selector,
    title: Selector,
}

impl RowSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            row: Selector::parse("tr.job").ok()?,
            tag: Selector::parse(".tag").ok()?,
            ld_json: Selector::parse("script[type='application/ld+json']").ok()?,
            title: Selector::parse("[itemprop='title']").ok()?,
        })
    }
}

/// Parses an index page body into listing stubs
///
/// The body is wrapped in a `<table>` element before parsing; without an
/// enclosing table the HTML parser discards bare `<tr>` rows. Rows whose
/// identity or detail URL is missing or empty are skipped.
///
/// # Arguments
///
/// * `markup` - The index page body as returned by the source
/// * `base_url` - Base URL used to absolutize relative detail links
///
/// # Returns
///
/// Listing stubs in row order; empty when the page holds no rows
pub fn parse_index(markup: &str, base_url: &Url) -> Vec<ListingStub> {
    let mut stubs = Vec::new();
    let selectors = match RowSelectors::new() {
        Some(s) => s,
        None => return stubs,
    };

    let document = Html::parse_document(&format!("<table>{}</table>", markup.trim()));

    for row in document.select(&selectors.row) {
        match parse_row(row, base_url, &selectors) {
            Some(stub) => stubs.push(stub),
            None => tracing::debug!("Skipping listing row without usable identity or detail URL"),
        }
    }

    tracing::debug!("Parsed {} listing stub(s) from index page", stubs.len());
    stubs
}

/// Parses one `tr.job` row into a stub
fn parse_row(row: ElementRef<'_>, base_url: &Url, selectors: &RowSelectors) -> Option<ListingStub> {
    let id = attr(&row, "data-id")?;
    let raw_url = attr(&row, "data-url")?;
    let detail_url = base_url.join(&raw_url).ok()?;

    let blob: Option<Value> = row
        .select(&selectors.ld_json)
        .next()
        .map(|el| el.text().collect::<String>())
        .and_then(|text| serde_json::from_str(&text).ok())
        .filter(|v: &Value| v.is_object());

    let title = blob
        .as_ref()
        .and_then(|v| str_field(v, "title"))
        .or_else(|| {
            row.select(&selectors.title)
                .next()
                .map(|el| el.text().collect::<String>())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        });

    let company = blob
        .as_ref()
        .and_then(org_name)
        .or_else(|| attr(&row, "data-company"));

    let tags: Vec<String> = row
        .select(&selectors.tag)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    Some(ListingStub {
        id,
        detail_url,
        title,
        company,
        slug: attr(&row, "data-slug"),
        search_text: attr(&row, "data-search").and_then(|s| truncate_search(&s)),
        tags,
        inline: blob.as_ref().map(extract_inline_metadata),
    })
}

/// Reads a trimmed, non-empty attribute from a row element
fn attr(row: &ElementRef<'_>, name: &str) -> Option<String> {
    row.value()
        .attr(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Cuts the search text before any serialized payload that follows it
///
/// The source appends a JSON fragment (tags array or metadata object) to
/// the human-readable search text; everything from the first marker on
/// is discarded.
fn truncate_search(raw: &str) -> Option<String> {
    let mut cut = raw.len();
    for marker in SEARCH_PAYLOAD_MARKERS {
        if let Some(idx) = raw.find(marker) {
            cut = cut.min(idx);
        }
    }

    let cleaned = raw[..cut].trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Extracts structured metadata from a parsed JSON-LD blob
///
/// Every field is pulled independently; one malformed value never
/// poisons the others.
fn extract_inline_metadata(value: &Value) -> InlineMetadata {
    InlineMetadata {
        posted_at: str_field(value, "datePosted"),
        valid_through: str_field(value, "validThrough"),
        employment_type: str_or_list(value, "employmentType"),
        industry: str_field(value, "industry"),
        location_type: str_field(value, "jobLocationType"),
        location_requirements: value.get("applicantLocationRequirements").and_then(join_named),
        locations: value.get("jobLocation").and_then(join_locations),
        occupational_category: str_field(value, "occupationalCategory"),
        work_hours: str_field(value, "workHours"),
        salary_min: salary_bound(value, "minValue"),
        salary_max: salary_bound(value, "maxValue"),
        salary_currency: salary_currency(value),
        company_url: org_field(value, "url"),
        company_logo: org_logo(value),
        direct_apply: direct_apply(value),
        image: image_url(value),
        description: str_field(value, "description"),
        benefits: str_field(value, "jobBenefits"),
    }
}

/// Returns the value as a trimmed, non-empty string
fn nonempty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(nonempty_str)
}

/// Reads a numeric field that may be a JSON number or a numeric string
fn num_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a field that may be one string or a list of strings
fn str_or_list(value: &Value, key: &str) -> Option<String> {
    let field = value.get(key)?;
    match field {
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(nonempty_str).collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined.join(", "))
            }
        }
        other => nonempty_str(other),
    }
}

/// Flattens a value that may be a single entry or an array of entries
fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Joins named entries (strings or `{name}` objects) into one display string
fn join_named(value: &Value) -> Option<String> {
    let names: Vec<String> = one_or_many(value)
        .into_iter()
        .filter_map(|item| nonempty_str(item).or_else(|| str_field(item, "name")))
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Joins job locations into one display string
fn join_locations(value: &Value) -> Option<String> {
    let entries: Vec<String> = one_or_many(value)
        .into_iter()
        .filter_map(location_display)
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries.join(", "))
    }
}

/// Renders one location entry as display text
///
/// Accepts a plain string, a `Place` with a postal address, or anything
/// carrying a `name`. The country may itself be a named object.
fn location_display(place: &Value) -> Option<String> {
    if let Some(name) = nonempty_str(place) {
        return Some(name);
    }

    let address = place.get("address").unwrap_or(place);
    let country = str_field(address, "addressCountry").or_else(|| {
        address
            .get("addressCountry")
            .and_then(|c| str_field(c, "name"))
    });

    let parts: Vec<String> = [
        str_field(address, "addressLocality"),
        str_field(address, "addressRegion"),
        country,
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        str_field(place, "name")
    } else {
        Some(parts.join(", "))
    }
}

/// Reads a salary bound from the nested quantitative value, falling back
/// to a flat field on the monetary amount
fn salary_bound(value: &Value, bound: &str) -> Option<f64> {
    let salary = value.get("baseSalary")?;
    salary
        .get("value")
        .and_then(|v| num_field(v, bound))
        .or_else(|| num_field(salary, bound))
}

fn salary_currency(value: &Value) -> Option<String> {
    let salary = value.get("baseSalary")?;
    str_field(salary, "currency")
        .or_else(|| salary.get("value").and_then(|v| str_field(v, "currency")))
}

fn org_field(value: &Value, key: &str) -> Option<String> {
    value
        .get("hiringOrganization")
        .and_then(|org| str_field(org, key))
}

/// Reads the hiring organization name (plain string or `{name}` object)
fn org_name(value: &Value) -> Option<String> {
    let org = value.get("hiringOrganization")?;
    nonempty_str(org).or_else(|| str_field(org, "name"))
}

fn org_logo(value: &Value) -> Option<String> {
    let logo = value.get("hiringOrganization")?.get("logo")?;
    nonempty_str(logo).or_else(|| str_field(logo, "url"))
}

fn image_url(value: &Value) -> Option<String> {
    let image = value.get("image")?;
    nonempty_str(image).or_else(|| str_field(image, "url"))
}

fn direct_apply(value: &Value) -> Option<bool> {
    match value.get("directApply")? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}
