//! Aggregation & Reporting Assembly
//!
//! Role-based deduplication, the open-item predicate, timeline
//! construction, and the canonical chronological sort shared by the per-CI
//! and per-user pipelines. The ordering rules here are the contract with
//! downstream reporting: consumers never re-sort.

use serde::Serialize;

use crate::types::{CanonicalTicket, dates};

/// Which query a merged ticket was filed under.
///
/// Role classification is order-sensitive: buckets merge in the fixed
/// order Requester → Assignee → Mentioned, and the first occurrence of a
/// ticket number wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityRole {
    Requester,
    Assignee,
    Mentioned,
}

impl std::fmt::Display for ActivityRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requester => write!(f, "requester"),
            Self::Assignee => write!(f, "assignee"),
            Self::Mentioned => write!(f, "mentioned"),
        }
    }
}

/// A ticket filed under the role bucket that claimed it first
#[derive(Debug, Clone, Serialize)]
pub struct MergedTicket {
    pub role: ActivityRole,
    pub ticket: CanonicalTicket,
}

/// Merge role-bucketed query results into one deduplicated sequence.
///
/// Deduplication key is the ticket number alone: two tickets with the same
/// number from different queries are the same ticket. Output is sorted by
/// parsed opened date ascending, unparseable dates first.
pub fn merge_role_buckets(
    requested: Vec<CanonicalTicket>,
    assigned: Vec<CanonicalTicket>,
    mentioned: Vec<CanonicalTicket>,
) -> Vec<MergedTicket> {
    let mut merged: Vec<MergedTicket> = Vec::new();

    let buckets = [
        (ActivityRole::Requester, requested),
        (ActivityRole::Assignee, assigned),
        (ActivityRole::Mentioned, mentioned),
    ];
    for (role, tickets) in buckets {
        for ticket in tickets {
            let seen = merged
                .iter()
                .any(|m| m.ticket.number.eq_ignore_ascii_case(&ticket.number));
            if !seen {
                merged.push(MergedTicket { role, ticket });
            }
        }
    }

    merged.sort_by_key(|m| m.ticket.opened_sort_key());
    merged
}

/// Open items per the substring predicate on the state field
pub fn open_tickets<'a>(tickets: &'a [CanonicalTicket]) -> Vec<&'a CanonicalTicket> {
    tickets.iter().filter(|t| t.is_open()).collect()
}

/// One timeline entry per ticket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// `YYYY-MM-DD` when parseable, else the raw string passed through
    pub date: String,
    pub number: String,
    pub short_description: String,
    pub state: String,
}

/// Build a chronological timeline, one entry per ticket, unknown dates first
pub fn build_timeline(tickets: &[CanonicalTicket]) -> Vec<TimelineEntry> {
    let mut sorted: Vec<&CanonicalTicket> = tickets.iter().collect();
    sorted.sort_by_key(|t| t.opened_sort_key());

    sorted
        .into_iter()
        .map(|t| TimelineEntry {
            date: dates::display_date(&t.opened_at),
            number: t.number.clone(),
            short_description: t.short_description.clone(),
            state: t.state.clone(),
        })
        .collect()
}

/// Canonical chronological sort: parsed opened date ascending, unparseable
/// dates first
pub fn sort_by_opened(tickets: &mut [CanonicalTicket]) {
    tickets.sort_by_key(|t| t.opened_sort_key());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(number: &str, opened_at: &str) -> CanonicalTicket {
        CanonicalTicket {
            number: number.to_string(),
            opened_at: opened_at.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_dedup_first_bucket_wins() {
        // INC001 appears in both the requester and assignee query results;
        // it must appear exactly once, filed under Requester
        let requested = vec![ticket("INC0010001", "2026-01-01")];
        let assigned = vec![
            ticket("INC0010001", "2026-01-01"),
            ticket("INC0010002", "2026-01-02"),
        ];

        let merged = merge_role_buckets(requested, assigned, Vec::new());
        assert_eq!(merged.len(), 2);

        let inc1 = merged
            .iter()
            .find(|m| m.ticket.number == "INC0010001")
            .unwrap();
        assert_eq!(inc1.role, ActivityRole::Requester);
        let inc2 = merged
            .iter()
            .find(|m| m.ticket.number == "INC0010002")
            .unwrap();
        assert_eq!(inc2.role, ActivityRole::Assignee);
    }

    #[test]
    fn test_mentioned_bucket_merges_last() {
        let mentioned = vec![ticket("INC0010003", "2026-01-03")];
        let assigned = vec![ticket("INC0010003", "2026-01-03")];

        let merged = merge_role_buckets(Vec::new(), assigned, mentioned);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].role, ActivityRole::Assignee);
    }

    #[test]
    fn test_merge_sorts_ascending_with_unknown_dates_first() {
        let requested = vec![
            ticket("INC0010001", "2026-03-01"),
            ticket("INC0010002", "not recorded"),
            ticket("INC0010003", "2026-01-15"),
        ];
        let merged = merge_role_buckets(requested, Vec::new(), Vec::new());
        let numbers: Vec<&str> = merged.iter().map(|m| m.ticket.number.as_str()).collect();
        assert_eq!(numbers, vec!["INC0010002", "INC0010003", "INC0010001"]);
    }

    #[test]
    fn test_open_tickets() {
        let mut open = ticket("INC0010001", "");
        open.state = "In Progress".to_string();
        let mut closed = ticket("INC0010002", "");
        closed.state = "Closed Complete".to_string();
        let mut done = ticket("INC0010003", "");
        done.state = "Done".to_string();

        let tickets = vec![open, closed, done];
        let open_refs = open_tickets(&tickets);
        assert_eq!(open_refs.len(), 1);
        assert_eq!(open_refs[0].number, "INC0010001");
    }

    #[test]
    fn test_timeline_reformats_parseable_dates_only() {
        let tickets = vec![
            ticket("INC0010001", "2026-02-10 08:00:00"),
            ticket("INC0010002", "around lunch"),
        ];
        let timeline = build_timeline(&tickets);
        assert_eq!(timeline.len(), 2);
        // Unknown date sorts first and passes through raw
        assert_eq!(timeline[0].date, "around lunch");
        assert_eq!(timeline[1].date, "2026-02-10");
    }
}
