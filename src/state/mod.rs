//! State module for tracking harvest progress
//!
//! This module provides the coordinator's phase machine.
//!
//! # Components
//!
//! - `CrawlPhase`: The phase the harvest loop is currently in (idle, fetching, parsing, ...)
//! - `StopReason`: Why a finished harvest stopped

mod crawl_phase;

// Re-export main types
pub use crawl_phase::{CrawlPhase, StopReason};
