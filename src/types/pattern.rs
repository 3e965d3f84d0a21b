//! Analysis Output Records
//!
//! Structured results of pattern detection and gap analysis, produced either
//! by the deterministic detector or by parsing an AI completion. Both paths
//! emit the same shapes so downstream reporting never branches on origin.

use serde::{Deserialize, Serialize};

/// A group of tickets sharing a detected common cause or topic.
///
/// The basic detector only emits patterns whose `occurrence_count` meets the
/// configured minimum; AI-derived patterns are not held to that threshold
/// since they come from an external, unverified source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecurringPattern {
    pub label: String,
    pub occurrence_count: usize,
    /// Insertion order = discovery order
    pub ticket_numbers: Vec<String>,
    /// `YYYY-MM-DD` when derived from parseable member dates, else raw/empty
    pub first_seen: String,
    pub last_seen: String,
    pub suggested_resolution: String,
    pub estimated_impact: String,
}

/// Kind of knowledge-base gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GapType {
    /// No article covers the topic; detectable deterministically
    #[default]
    Missing,
    /// An article exists but has not kept up; AI judgment only
    Stale,
    /// An article exists but lacks needed detail; AI judgment only
    Incomplete,
}

impl std::fmt::Display for GapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "Missing"),
            Self::Stale => write!(f, "Stale"),
            Self::Incomplete => write!(f, "Incomplete"),
        }
    }
}

/// A topic with ticket volume but no (or inadequate) knowledge article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KnowledgeGap {
    pub gap_type: GapType,
    pub topic: String,
    pub related_tickets: Vec<String>,
    pub suggested_title: String,
    pub suggested_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_type_display() {
        assert_eq!(GapType::Missing.to_string(), "Missing");
        assert_eq!(GapType::Stale.to_string(), "Stale");
        assert_eq!(GapType::Incomplete.to_string(), "Incomplete");
    }

    #[test]
    fn test_gap_type_serde_roundtrip() {
        let json = serde_json::to_string(&GapType::Stale).unwrap();
        assert_eq!(json, "\"stale\"");
        let back: GapType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GapType::Stale);
    }
}
