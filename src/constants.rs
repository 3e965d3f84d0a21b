//! Global Constants
//!
//! Centralized constants for tuning the pipeline.
//! All magic numbers should be defined here with documentation.

/// State vocabulary constants
pub mod states {
    /// A ticket is open unless its state contains one of these markers
    /// (case-insensitive substring match). Source systems use free-text
    /// state fields with unbounded vocabulary, so this stays a substring
    /// heuristic rather than a closed enum.
    pub const CLOSED_STATE_MARKERS: &[&str] =
        &["closed", "resolved", "cancelled", "completed", "done"];
}

/// Import and filtering constants
pub mod import {
    /// Default age cutoff for retrieved tickets (months before now)
    pub const DEFAULT_MONTHS_BACK: u32 = 6;

    /// Conventional container keys for JSON exports wrapped in an object
    pub const CONTAINER_KEYS: &[&str] = &["result", "tickets", "issues", "records"];
}

/// Basic pattern detector constants
pub mod detector {
    /// Default minimum group size for an emitted pattern
    pub const DEFAULT_MIN_OCCURRENCES: usize = 3;

    /// Number of leading significant words in a description signature
    pub const SIGNATURE_WORDS: usize = 5;

    /// Words shorter than this are dropped when building a signature
    pub const SIGNATURE_MIN_WORD_LEN: usize = 4;

    /// Occurrence count at or above which a pattern's impact is "High"
    pub const HIGH_IMPACT_OCCURRENCES: usize = 10;

    /// Open-member count at or above which a pattern's impact is "High"
    pub const HIGH_IMPACT_OPEN: usize = 5;

    /// Occurrence count at or above which a pattern's impact is "Medium"
    pub const MEDIUM_IMPACT_OCCURRENCES: usize = 5;
}

/// Free-text response parser constants
pub mod parser {
    /// Sections shorter than this (trimmed) are discarded as noise
    pub const MIN_SECTION_LEN: usize = 20;

    /// Titles shorter than this after markup stripping are discarded
    pub const MIN_TITLE_LEN: usize = 3;

    /// Number of input tickets attached to a synthesized fallback record
    pub const FALLBACK_TICKET_SAMPLE: usize = 10;

    /// Trailing lines used as suggested content when no labeled
    /// sub-section is found (pattern mode)
    pub const PATTERN_TAIL_LINES: usize = 3;
}

/// HTTP client constants for ticket backends
pub mod http {
    /// Page size for offset-paginated table queries
    pub const SERVICENOW_PAGE_SIZE: usize = 200;

    /// Page size for startAt-paginated search queries
    pub const JIRA_PAGE_SIZE: usize = 100;

    /// Maximum retries for a retryable upstream failure
    pub const MAX_RETRIES: usize = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;
}
