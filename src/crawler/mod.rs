//! Crawler module for harvesting job listings
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with soft-redirect handling and transport retry
//! - Index page parsing into listing stubs
//! - Detail page enrichment
//! - Overall harvest coordination and pacing

mod coordinator;
mod enricher;
mod fetcher;
mod listing;

pub use coordinator::{harvest, Coordinator};
pub use enricher::Enricher;
pub use fetcher::{random_user_agent, FetchSettings, Fetcher};
pub use listing::parse_index;
