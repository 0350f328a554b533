//! Record types for harvested job listings
//!
//! This module defines the data model for the harvest pipeline:
//! - Listing stubs parsed from index page rows
//! - Inline metadata lifted from embedded JSON-LD blobs
//! - Detail attributes scraped from per-listing detail pages
//! - The flat job record produced by merging the two
//! - Section splitting for long-form description text

pub mod job;
pub mod sections;

pub use job::{CrawlResult, DetailAttributes, InlineMetadata, JobRecord, ListingStub};
pub use sections::{HeadingSplitter, SectionNormalizer, Sections};
