//! Basic Pattern Detector
//!
//! Deterministic, AI-free grouping of tickets into recurring-issue patterns
//! and missing-knowledge gaps. Used as the default when AI is explicitly
//! skipped and as the fallback when the completion call errors out.
//!
//! Two independent groupings run in order — category pairs, then
//! description signatures — and concatenate without overlap elimination: a
//! ticket set can appear in one pattern of each kind. The heuristic accepts
//! false negatives (similar tickets worded differently will not group) in
//! exchange for zero false-positive risk and full determinism.

use std::collections::HashSet;

use crate::constants::detector::{
    HIGH_IMPACT_OCCURRENCES, HIGH_IMPACT_OPEN, MEDIUM_IMPACT_OCCURRENCES, SIGNATURE_MIN_WORD_LEN,
    SIGNATURE_WORDS,
};
use crate::types::{CanonicalTicket, GapType, KbArticle, KnowledgeGap, RecurringPattern, dates};

/// Group tickets into recurring-issue patterns.
///
/// Never emits a pattern with fewer than `min_occurrences` members. Output
/// is sorted descending by occurrence count; ties retain discovery order,
/// category groups before description groups.
pub fn detect_patterns(
    tickets: &[CanonicalTicket],
    min_occurrences: usize,
) -> Vec<RecurringPattern> {
    let mut patterns = group_by_category(tickets, min_occurrences);
    patterns.extend(group_by_signature(tickets, min_occurrences));
    patterns.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
    patterns
}

/// Partition by the (category, subcategory) pair
fn group_by_category(
    tickets: &[CanonicalTicket],
    min_occurrences: usize,
) -> Vec<RecurringPattern> {
    let groups = group_in_discovery_order(tickets, |t| {
        // Uncategorized tickets cannot indicate a recurring category
        if t.category.trim().is_empty() {
            None
        } else {
            Some((t.category.clone(), t.subcategory.clone()))
        }
    });

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= min_occurrences)
        .map(|((category, subcategory), members)| {
            build_pattern(format!("Category: {category} > {subcategory}"), &members)
        })
        .collect()
}

/// Group tickets sharing an identical description signature
fn group_by_signature(
    tickets: &[CanonicalTicket],
    min_occurrences: usize,
) -> Vec<RecurringPattern> {
    let groups = group_in_discovery_order(tickets, |t| description_signature(&t.short_description));

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= min_occurrences)
        .map(|(_, members)| {
            build_pattern(
                format!("Similar: {}", members[0].short_description),
                &members,
            )
        })
        .collect()
}

/// Signature of a short description: lowercase, whitespace-split, words of
/// length below the significance threshold discarded, first five remaining
/// words joined by a single space. Empty signatures are discarded.
pub(crate) fn description_signature(short_description: &str) -> Option<String> {
    let lowered = short_description.to_lowercase();
    let words: Vec<&str> = lowered
        .split_whitespace()
        .filter(|w| w.len() >= SIGNATURE_MIN_WORD_LEN)
        .take(SIGNATURE_WORDS)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Stable grouping: keys appear in first-seen order, members in input order
fn group_in_discovery_order<'a, K: PartialEq>(
    tickets: &'a [CanonicalTicket],
    key_fn: impl Fn(&CanonicalTicket) -> Option<K>,
) -> Vec<(K, Vec<&'a CanonicalTicket>)> {
    let mut groups: Vec<(K, Vec<&CanonicalTicket>)> = Vec::new();
    for ticket in tickets {
        let Some(key) = key_fn(ticket) else {
            continue;
        };
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(ticket),
            None => groups.push((key, vec![ticket])),
        }
    }
    groups
}

fn build_pattern(label: String, members: &[&CanonicalTicket]) -> RecurringPattern {
    let (first_seen, last_seen) = member_date_range(members);
    RecurringPattern {
        label,
        occurrence_count: members.len(),
        ticket_numbers: members.iter().map(|t| t.number.clone()).collect(),
        first_seen,
        last_seen,
        suggested_resolution: suggest_resolution(members),
        estimated_impact: estimate_impact(members),
    }
}

/// Earliest/latest opened date among members, with unparseable dates
/// treated as earliest. Displayed as `YYYY-MM-DD` where parseable.
fn member_date_range(members: &[&CanonicalTicket]) -> (String, String) {
    let earliest = members.iter().min_by_key(|t| t.opened_sort_key());
    let latest = members.iter().max_by_key(|t| t.opened_sort_key());
    match (earliest, latest) {
        (Some(first), Some(last)) => (
            dates::display_date(&first.opened_at),
            dates::display_date(&last.opened_at),
        ),
        _ => (String::new(), String::new()),
    }
}

/// First non-empty close note among members, else a review instruction
fn suggest_resolution(members: &[&CanonicalTicket]) -> String {
    members
        .iter()
        .map(|t| t.close_notes.trim())
        .find(|notes| !notes.is_empty())
        .map(String::from)
        .unwrap_or_else(|| {
            format!(
                "Review the {} related tickets for a shared root cause.",
                members.len()
            )
        })
}

/// Tiered heuristic on occurrence count and open-member count
fn estimate_impact(members: &[&CanonicalTicket]) -> String {
    let count = members.len();
    let open = members.iter().filter(|t| t.is_open()).count();
    let level = if count >= HIGH_IMPACT_OCCURRENCES || open >= HIGH_IMPACT_OPEN {
        "High"
    } else if count >= MEDIUM_IMPACT_OCCURRENCES {
        "Medium"
    } else {
        "Low"
    };
    format!("{level} - {count} occurrences, {open} still open")
}

// =============================================================================
// Missing-Gap Detection
// =============================================================================

/// Detect Missing knowledge gaps deterministically: ticket categories with
/// volume at or above the threshold and no article whose category or title
/// contains the category as a substring (case-insensitive).
///
/// Stale and Incomplete gaps are sourced from AI judgment only and have no
/// deterministic fallback.
pub fn detect_missing_gaps(
    tickets: &[CanonicalTicket],
    articles: &[KbArticle],
    min_occurrences: usize,
) -> Vec<KnowledgeGap> {
    let groups = group_in_discovery_order(tickets, |t| {
        if t.category.trim().is_empty() {
            None
        } else {
            Some(t.category.clone())
        }
    });

    let mut gaps: Vec<KnowledgeGap> = groups
        .into_iter()
        .filter(|(_, members)| members.len() >= min_occurrences)
        .filter(|(category, _)| !is_covered(category, articles))
        .map(|(category, members)| build_gap(category, &members))
        .collect();

    gaps.sort_by(|a, b| b.related_tickets.len().cmp(&a.related_tickets.len()));
    gaps
}

fn is_covered(category: &str, articles: &[KbArticle]) -> bool {
    let needle = category.to_lowercase();
    articles.iter().any(|article| {
        article.category.to_lowercase().contains(&needle)
            || article.title.to_lowercase().contains(&needle)
    })
}

fn build_gap(category: String, members: &[&CanonicalTicket]) -> KnowledgeGap {
    let examples: Vec<&str> = members
        .iter()
        .map(|t| t.short_description.trim())
        .filter(|d| !d.is_empty())
        .take(3)
        .collect();
    let resolution = members
        .iter()
        .map(|t| t.close_notes.trim())
        .find(|notes| !notes.is_empty())
        .unwrap_or("none recorded");

    let content = format!(
        "{count} tickets in this area with no covering article. Common examples: {examples}. \
         Documented fix from closed tickets: {resolution}.",
        count = members.len(),
        examples = if examples.is_empty() {
            "(no descriptions)".to_string()
        } else {
            examples.join("; ")
        },
    );

    KnowledgeGap {
        gap_type: GapType::Missing,
        topic: category.clone(),
        related_tickets: members.iter().map(|t| t.number.clone()).collect(),
        suggested_title: format!("Troubleshooting {category} issues"),
        suggested_content: content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(number: &str, category: &str, subcategory: &str, desc: &str) -> CanonicalTicket {
        CanonicalTicket {
            number: number.to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            short_description: desc.to_string(),
            state: "Open".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_category_grouping_threshold() {
        let tickets = vec![
            ticket("INC0010001", "Hardware", "Disk", "Disk failure on db-01"),
            ticket("INC0010002", "Hardware", "Disk", "Disk errors reported by monitoring"),
            ticket("INC0010003", "Hardware", "Disk", "Replace failed drive in array"),
            ticket("INC0010004", "Software", "Email", "Outlook crashes at startup"),
        ];

        let patterns = detect_patterns(&tickets, 2);
        // One category pattern with all three disk tickets; the lone email
        // ticket is below threshold; descriptions differ so no similarity
        // duplicate of the same three tickets
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].label, "Category: Hardware > Disk");
        assert_eq!(patterns[0].occurrence_count, 3);
        assert_eq!(
            patterns[0].ticket_numbers,
            vec!["INC0010001", "INC0010002", "INC0010003"]
        );
    }

    #[test]
    fn test_never_emits_below_threshold() {
        let tickets = vec![
            ticket("INC0010001", "Hardware", "Disk", "Disk failure"),
            ticket("INC0010002", "Hardware", "Disk", "Disk failure"),
        ];
        for min in 1..=4 {
            for pattern in detect_patterns(&tickets, min) {
                assert!(pattern.occurrence_count >= min);
            }
        }
    }

    #[test]
    fn test_signature_grouping() {
        let tickets = vec![
            ticket("INC0010001", "", "", "Cannot connect wireless printer floor three"),
            ticket("INC0010002", "", "", "cannot CONNECT wireless printer floor five"),
            ticket("INC0010003", "", "", "Email bounces from external domains"),
        ];

        // First five significant words match for the two printer tickets:
        // short words ("to", "on" style fillers) are dropped before comparing
        let patterns = detect_patterns(&tickets, 2);
        assert_eq!(patterns.len(), 1);
        assert_eq!(
            patterns[0].label,
            "Similar: Cannot connect wireless printer floor three"
        );
        assert_eq!(patterns[0].occurrence_count, 2);
    }

    #[test]
    fn test_signature_rules() {
        // Words of length <= 3 are discarded, first five kept, lowercased
        assert_eq!(
            description_signature("The VPN is down for ALL remote users again today"),
            Some("down remote users again today".to_string())
        );
        assert_eq!(description_signature("a is to of"), None);
        assert_eq!(description_signature(""), None);
    }

    #[test]
    fn test_groupings_are_not_cross_deduplicated() {
        // Same three tickets share both a category and a signature; both
        // patterns are emitted (documented behavior, no overlap elimination)
        let tickets = vec![
            ticket("INC0010001", "Network", "VPN", "VPN tunnel drops every hour"),
            ticket("INC0010002", "Network", "VPN", "VPN tunnel drops every hour"),
            ticket("INC0010003", "Network", "VPN", "VPN tunnel drops every hour"),
        ];
        let patterns = detect_patterns(&tickets, 2);
        assert_eq!(patterns.len(), 2);
        assert!(patterns.iter().any(|p| p.label.starts_with("Category:")));
        assert!(patterns.iter().any(|p| p.label.starts_with("Similar:")));
    }

    #[test]
    fn test_sort_descending_with_stable_ties() {
        let mut tickets = vec![
            ticket("INC0010001", "Hardware", "Disk", "alpha beta gamma delta epsilon"),
            ticket("INC0010002", "Hardware", "Disk", "unrelated words entirely different here"),
        ];
        // Two more sharing a signature, so counts are 2 and 2
        tickets.push(ticket("INC0010003", "", "", "printer jammed paper tray two"));
        tickets.push(ticket("INC0010004", "", "", "printer jammed paper tray two"));

        let patterns = detect_patterns(&tickets, 2);
        assert_eq!(patterns.len(), 2);
        // Tie on count: category group first (computed first, stable sort)
        assert!(patterns[0].label.starts_with("Category:"));
        assert!(patterns[1].label.starts_with("Similar:"));
    }

    #[test]
    fn test_date_range_and_impact() {
        let mut a = ticket("INC0010001", "Network", "VPN", "one");
        a.opened_at = "2026-03-01".to_string();
        let mut b = ticket("INC0010002", "Network", "VPN", "two");
        b.opened_at = "2026-01-15".to_string();
        let mut c = ticket("INC0010003", "Network", "VPN", "three");
        c.opened_at = "when it rained".to_string();
        c.state = "Closed".to_string();

        let patterns = detect_patterns(&[a, b, c], 3);
        assert_eq!(patterns.len(), 1);
        // Unparseable date sorts earliest and passes through raw
        assert_eq!(patterns[0].first_seen, "when it rained");
        assert_eq!(patterns[0].last_seen, "2026-03-01");
        assert_eq!(patterns[0].estimated_impact, "Low - 3 occurrences, 2 still open");
    }

    #[test]
    fn test_resolution_from_close_notes() {
        let mut a = ticket("INC0010001", "Network", "VPN", "one");
        let mut b = ticket("INC0010002", "Network", "VPN", "two");
        b.close_notes = "Re-issued certificate on the concentrator".to_string();
        a.close_notes = "  ".to_string();

        let patterns = detect_patterns(&[a, b], 2);
        assert_eq!(
            patterns[0].suggested_resolution,
            "Re-issued certificate on the concentrator"
        );
    }

    #[test]
    fn test_missing_gaps() {
        let tickets = vec![
            ticket("INC0010001", "Printing", "", "Printer offline"),
            ticket("INC0010002", "Printing", "", "Printer jams"),
            ticket("INC0010003", "Network", "", "Switch rebooted"),
            ticket("INC0010004", "Network", "", "Port flapping"),
        ];
        let articles = vec![KbArticle {
            number: "KB0000001".to_string(),
            title: "Common network switch problems".to_string(),
            category: "Infrastructure".to_string(),
            ..Default::default()
        }];

        let gaps = detect_missing_gaps(&tickets, &articles, 2);
        // Network is covered by the article title substring; Printing is not
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].topic, "Printing");
        assert_eq!(gaps[0].gap_type, GapType::Missing);
        assert_eq!(gaps[0].related_tickets, vec!["INC0010001", "INC0010002"]);
        assert_eq!(gaps[0].suggested_title, "Troubleshooting Printing issues");
    }
}
