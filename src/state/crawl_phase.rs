/// Phase definitions for tracking harvest progress
///
/// This module defines the phases the harvest loop moves through while
/// working one page at a time, and the reasons a finished run stopped.
use std::fmt;

/// Why a harvest run reached its terminal phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// An index page parsed to zero listings (offset pagination ran off the end)
    EmptyPage,

    /// The next offset would exceed the configured ceiling
    OffsetCeiling,

    /// Every configured source URL has been visited
    SourcesExhausted,

    /// Cancellation was requested and honored
    Cancelled,
}

impl StopReason {
    /// Converts the stop reason to a log-friendly string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyPage => "empty_page",
            Self::OffsetCeiling => "offset_ceiling",
            Self::SourcesExhausted => "sources_exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the current phase of the harvest loop
///
/// The loop cycles Fetching -> Parsing -> Enriching -> Accumulated for
/// each page, then either returns to Fetching for the next page or ends
/// in Done with the reason it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Pre-run =====
    /// No page has been requested yet
    Idle,

    // ===== Per-page cycle =====
    /// An index page request is in flight
    Fetching,

    /// The fetched page body is being parsed into listing stubs
    Parsing,

    /// Detail pages for the current page's stubs are being fetched
    Enriching,

    /// The current page's records have been appended to the result
    Accumulated,

    // ===== Terminal =====
    /// The run has stopped and the result is final
    Done(StopReason),
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase (the result is final)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Returns true if the loop is actively working a page
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Fetching | Self::Parsing | Self::Enriching | Self::Accumulated
        )
    }

    /// Returns the stop reason when the run has finished
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Done(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Converts the phase to a log-friendly string (reason omitted)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Enriching => "enriching",
            Self::Accumulated => "accumulated",
            Self::Done(_) => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(reason) => write!(f, "done({})", reason),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlPhase::Idle.is_terminal());
        assert!(!CrawlPhase::Fetching.is_terminal());
        assert!(!CrawlPhase::Parsing.is_terminal());
        assert!(!CrawlPhase::Enriching.is_terminal());
        assert!(!CrawlPhase::Accumulated.is_terminal());

        assert!(CrawlPhase::Done(StopReason::EmptyPage).is_terminal());
        assert!(CrawlPhase::Done(StopReason::Cancelled).is_terminal());
    }

    #[test]
    fn test_is_active() {
        assert!(CrawlPhase::Fetching.is_active());
        assert!(CrawlPhase::Parsing.is_active());
        assert!(CrawlPhase::Enriching.is_active());
        assert!(CrawlPhase::Accumulated.is_active());

        assert!(!CrawlPhase::Idle.is_active());
        assert!(!CrawlPhase::Done(StopReason::SourcesExhausted).is_active());
    }

    #[test]
    fn test_stop_reason() {
        assert_eq!(
            CrawlPhase::Done(StopReason::OffsetCeiling).stop_reason(),
            Some(StopReason::OffsetCeiling)
        );
        assert_eq!(CrawlPhase::Fetching.stop_reason(), None);
        assert_eq!(CrawlPhase::Idle.stop_reason(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::Idle), "idle");
        assert_eq!(format!("{}", CrawlPhase::Enriching), "enriching");
        assert_eq!(
            format!("{}", CrawlPhase::Done(StopReason::EmptyPage)),
            "done(empty_page)"
        );
        assert_eq!(
            format!("{}", CrawlPhase::Done(StopReason::Cancelled)),
            "done(cancelled)"
        );
    }

    #[test]
    fn test_stop_reason_strings() {
        assert_eq!(StopReason::EmptyPage.as_str(), "empty_page");
        assert_eq!(StopReason::OffsetCeiling.as_str(), "offset_ceiling");
        assert_eq!(StopReason::SourcesExhausted.as_str(), "sources_exhausted");
        assert_eq!(StopReason::Cancelled.as_str(), "cancelled");
    }
}
