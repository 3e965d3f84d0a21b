//! Canonical Ticket Record
//!
//! The one normalized record shape every source is mapped into. Constructed
//! once per raw record during normalization, never mutated afterwards, and
//! held only in memory for the duration of one invocation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::states::CLOSED_STATE_MARKERS;
use crate::types::dates;

// =============================================================================
// Ticket Type
// =============================================================================

/// Record type across all supported sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    #[default]
    Incident,
    ChangeRequest,
    Problem,
    ServiceRequest,
    RequestedItem,
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incident => write!(f, "Incident"),
            Self::ChangeRequest => write!(f, "Change Request"),
            Self::Problem => write!(f, "Problem"),
            Self::ServiceRequest => write!(f, "Service Request"),
            Self::RequestedItem => write!(f, "Requested Item"),
        }
    }
}

impl TicketType {
    /// Best-effort parse of a source-supplied type string
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        if lower.contains("incident") || lower.contains("bug") {
            Some(Self::Incident)
        } else if lower.contains("change") {
            Some(Self::ChangeRequest)
        } else if lower.contains("problem") {
            Some(Self::Problem)
        } else if lower.contains("requested item") || lower.contains("req_item") {
            Some(Self::RequestedItem)
        } else if lower.contains("request") {
            Some(Self::ServiceRequest)
        } else {
            None
        }
    }

    /// Parse with the documented default: unmapped types are incidents
    pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }
}

// =============================================================================
// Ticket Source
// =============================================================================

/// Provenance tag recording which backend a ticket came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketSource {
    ServiceNow,
    Jira,
    #[default]
    Export,
}

impl std::fmt::Display for TicketSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceNow => write!(f, "servicenow"),
            Self::Jira => write!(f, "jira"),
            Self::Export => write!(f, "export"),
        }
    }
}

// =============================================================================
// Canonical Ticket
// =============================================================================

/// The unified ticket record.
///
/// `number` plus `source` uniquely identifies a ticket; deduplication across
/// role queries is keyed on `number` alone. Date fields hold the raw source
/// string — parsing is best-effort and deferred to the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CanonicalTicket {
    pub number: String,
    pub ticket_type: TicketType,
    pub short_description: String,
    pub description: String,
    /// Free text, source-specific vocabulary; see [`CanonicalTicket::is_open`]
    pub state: String,
    /// Free text, normalized to "N - Label" where mappable
    pub priority: String,
    pub category: String,
    pub subcategory: String,
    pub opened_at: String,
    pub closed_at: String,
    pub resolved_at: String,
    pub assigned_to: String,
    pub caller_name: String,
    pub close_notes: String,
    pub work_notes: String,
    /// Configuration item / affected asset
    pub ci_name: String,
    pub source: TicketSource,
}

impl CanonicalTicket {
    /// A ticket is open unless its state contains a closed-state marker.
    ///
    /// Deliberate substring heuristic: state vocabularies differ per source
    /// ("Resolved", "Done", "Closed Complete", ...), so synonyms map into
    /// one predicate instead of a closed enum.
    pub fn is_open(&self) -> bool {
        let state = self.state.to_lowercase();
        !CLOSED_STATE_MARKERS
            .iter()
            .any(|marker| state.contains(marker))
    }

    /// Parsed opened date, `None` when the source string is unparseable
    pub fn opened_date(&self) -> Option<NaiveDateTime> {
        dates::parse_flexible(&self.opened_at)
    }

    /// Sort key for chronological ordering; unknown dates sort first
    pub fn opened_sort_key(&self) -> NaiveDateTime {
        dates::sort_key(&self.opened_at)
    }

    /// Case-insensitive substring check against a pre-lowercased needle
    pub fn field_contains(field: &str, needle_lower: &str) -> bool {
        field.to_lowercase().contains(needle_lower)
    }
}

// =============================================================================
// Knowledge Article
// =============================================================================

/// Canonical knowledge-base article, used by the gap analysis.
/// Absent for backends with no native KB concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KbArticle {
    pub number: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub last_updated: String,
    pub workflow_state: String,
}
