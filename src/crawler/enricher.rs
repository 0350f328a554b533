//! Detail page enrichment
//!
//! For every listing stub the enricher fetches the detail page and pulls
//! out what the index row cannot provide:
//! - The external apply link, matched to the stub's identity
//! - Popularity counters (views, applications) from marker paragraphs
//! - The company profile link
//! - The long-form description, split into labelled sections
//!
//! Enrichment never fails a listing. A fetch error or an unrecognizable
//! page yields empty detail attributes and the listing exports with its
//! index data alone.

use crate::crawler::fetcher::Fetcher;
use crate::records::{DetailAttributes, ListingStub, SectionNormalizer, Sections};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Marker for the view counter paragraph
const VIEWS_MARKER: char = '\u{1F440}'; // 👀

/// Marker for the application counter paragraph
const APPLIED_MARKER: char = '\u{2705}'; // ✅

struct DetailSelectors {
    apply: Selector,
    expand: Selector,
    description: Selector,
    paragraph: Selector,
    company: Selector,
}

impl DetailSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            apply: Selector::parse("a.button.action-apply").ok()?,
            expand: Selector::parse("tr.expand").ok()?,
            description: Selector::parse("div.description").ok()?,
            paragraph: Selector::parse("p").ok()?,
            company: Selector::parse("div.company_profile a[href]").ok()?,
        })
    }
}

/// Detail page scraper
pub struct Enricher {
    base_url: Url,
    normalizer: Box<dyn SectionNormalizer>,
}

impl Enricher {
    /// Creates an enricher
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL used to absolutize apply and profile links
    /// * `normalizer` - Section splitting strategy for description text
    pub fn new(base_url: Url, normalizer: Box<dyn SectionNormalizer>) -> Self {
        Self {
            base_url,
            normalizer,
        }
    }

    /// Fetches and scrapes the detail page for one stub
    ///
    /// Infallible by design: any failure along the way degrades to
    /// default (all-absent) attributes after a warning.
    pub async fn enrich(&self, fetcher: &Fetcher, stub: &ListingStub) -> DetailAttributes {
        tracing::debug!("Enriching listing {} from {}", stub.id, stub.detail_url);

        let body = match fetcher.fetch(stub.detail_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    "Detail fetch failed for listing {} ({}): {}",
                    stub.id,
                    stub.detail_url,
                    e
                );
                return DetailAttributes::default();
            }
        };

        self.extract(&body, &stub.id)
    }

    /// Scrapes detail attributes out of a fetched page body
    ///
    /// All lookups are scoped to the given listing identity so a page
    /// embedding several listings' widgets cannot cross-contaminate.
    ///
    /// # Arguments
    ///
    /// * `html` - The detail page body
    /// * `id` - The listing identity the page was fetched for
    pub fn extract(&self, html: &str, id: &str) -> DetailAttributes {
        let selectors = match DetailSelectors::new() {
            Some(s) => s,
            None => return DetailAttributes::default(),
        };

        let document = Html::parse_document(html);

        let apply_link = document
            .select(&selectors.apply)
            .find(|el| el.value().attr("data-job-id") == Some(id))
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| self.base_url.join(href).ok())
            .map(|u| u.to_string());

        let expand_class = format!("expand-{}", id);
        let expand_row = document
            .select(&selectors.expand)
            .find(|el| el.value().classes().any(|c| c == expand_class));

        let mut views = None;
        let mut applied = None;
        let mut company_link = None;
        let mut sections = Sections::default();

        if let Some(row) = expand_row {
            company_link = row
                .select(&selectors.company)
                .next()
                .and_then(|el| el.value().attr("href"))
                .and_then(|href| self.base_url.join(href).ok())
                .map(|u| u.to_string());

            if let Some(block) = row.select(&selectors.description).next() {
                views = counter_in_block(block, &selectors, VIEWS_MARKER);
                applied = counter_in_block(block, &selectors, APPLIED_MARKER);
                sections = self.normalizer.split(&block_text(block));
            }
        } else {
            tracing::debug!("No detail row found for listing {}", id);
        }

        DetailAttributes {
            apply_link,
            views,
            applied,
            company_link,
            sections,
        }
    }
}

/// Finds the first paragraph carrying the marker and parses its counter
///
/// The first marker-bearing paragraph decides: when its number cannot be
/// parsed the counter stays absent, even if a later paragraph also
/// carries the marker.
fn counter_in_block(
    block: ElementRef<'_>,
    selectors: &DetailSelectors,
    marker: char,
) -> Option<u64> {
    for paragraph in block.select(&selectors.paragraph) {
        let text = paragraph.text().collect::<String>();
        if text.contains(marker) {
            return parse_counter(&text, marker);
        }
    }
    None
}

/// Parses the numeric run following the marker, tolerating thousands
/// separators
fn parse_counter(text: &str, marker: char) -> Option<u64> {
    let idx = text.find(marker)?;
    let after = &text[idx + marker.len_utf8()..];

    let digits: String = after
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();

    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Flattens a description block to plain text, one line per text node
///
/// Counter paragraphs are widgets, not prose; lines carrying a counter
/// marker are left out.
fn block_text(block: ElementRef<'_>) -> String {
    block
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| !t.contains(VIEWS_MARKER) && !t.contains(APPLIED_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
}
