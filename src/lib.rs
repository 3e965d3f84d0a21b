//! ticketlens - AI-Driven ITSM Ticket Analysis
//!
//! Retrieves service-management tickets from a ServiceNow-style backend, a
//! Jira-style backend, or a flat-file export, normalizes them into one
//! canonical record shape, and produces recurring-issue pattern reports,
//! knowledge-base gap analyses, and activity summaries — AI-assisted when a
//! completion provider is available, deterministic otherwise.
//!
//! ## Core Pipeline
//!
//! - **Normalization**: three heterogeneous sources map into
//!   [`types::CanonicalTicket`]; export columns resolve through an alias
//!   table inspected once per file
//! - **Detection**: [`analysis::detect_patterns`] groups deterministically
//!   by category and description signature
//! - **Parsing**: [`analysis::parse_pattern_response`] converts free-text
//!   completions back into structured records, never returning nothing for
//!   a non-empty response
//! - **Aggregation**: role-bucket dedup, timelines, and the canonical
//!   chronological sort in [`analysis::aggregate`]
//!
//! A failed completion call is recovered exactly once by falling back to
//! the deterministic detector; AI unavailability never blocks a report.
//!
//! ## Modules
//!
//! - [`types`]: canonical records, analysis outputs, errors, date handling
//! - [`source`]: backend clients, export reader, field aliasing, filters
//! - [`ai`]: completion providers and prompt construction
//! - [`analysis`]: detector, response parser, aggregation, orchestration
//! - [`report`]: report assembly, JSON/markdown emission, KB drafts
//! - [`config`]: layered configuration

pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod report;
pub mod source;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{BackendKind, Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, Result, TicketError, UpstreamError};

// Records
pub use types::{CanonicalTicket, GapType, KbArticle, KnowledgeGap, RecurringPattern, TicketType};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use analysis::{
    GapAnalysis, PatternAnalysis, detect_missing_gaps, detect_patterns, merge_role_buckets,
    parse_gap_response, parse_pattern_response, run_gap_analysis, run_pattern_analysis,
};

pub use source::{ImportFilter, JiraClient, RoleScope, ServiceNowClient, resolve_columns};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{CompletionProvider, ProviderConfig, SharedProvider, create_provider};
