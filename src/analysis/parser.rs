//! Free-Text Response Parser
//!
//! Converts one opaque block of model-generated text into structured
//! pattern or gap records, defensively: there is no guarantee the model
//! followed the requested structure. Sections are segmented on
//! heading-like boundaries, entities extracted by regex, and when nothing
//! parses at all the full response is wrapped into a single synthesized
//! record — a non-empty response is never silently discarded.
//!
//! Parsing ambiguity is absorbed here and never surfaced as an error; the
//! parser's job is to degrade gracefully, not to validate.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::parser::{
    FALLBACK_TICKET_SAMPLE, MIN_SECTION_LEN, MIN_TITLE_LEN, PATTERN_TAIL_LINES,
};
use crate::types::{CanonicalTicket, GapType, KnowledgeGap, RecurringPattern};

/// Heading-like boundary: a markdown heading of 1-3 hashes, or a
/// bolded/unbolded Pattern/Missing/Stale/Incomplete label with an optional
/// number and a colon
static SECTION_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:#{1,3}[ \t]+|(?:\*\*)?(?:pattern|missing|stale|incomplete)\b[^:\r\n]{0,12}:)")
        .expect("boundary regex is valid")
});

/// Common ticket-number shapes: a 2-6 letter prefix, optionally dashed,
/// followed by 5-10 digits
static TICKET_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z]{2,6}-?\d{5,10}\b").expect("ticket id regex is valid")
});

/// Explicit occurrence count ("Occurrences: 7")
static OCCURRENCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\boccurrences?\b[^\d\r\n]{0,10}(\d+)").expect("occurrence regex is valid")
});

/// Labeled suggested-content sub-section
static CONTENT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*(?:\*\*)?(?:suggested fix|suggested content|resolution|recommendation|outline|steps)(?:\*\*)?[ \t]*:?[ \t]*",
    )
    .expect("content label regex is valid")
});

/// Single-line impact annotation
static IMPACT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:\*\*)?impact(?:\*\*)?[ \t]*:[ \t]*(.+)$")
        .expect("impact regex is valid")
});

/// Leading "Pattern 1:"-style label on a title line
static LEADING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:pattern|missing|stale|incomplete)\b[^:]{0,12}:[ \t]*")
        .expect("label regex is valid")
});

/// Leading "1." / "2)" numbering on a title line
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)][ \t]*").expect("number regex is valid"));

// =============================================================================
// Public API
// =============================================================================

/// Parse a completion into recurring patterns.
///
/// Output is sorted descending by occurrence count — the authoritative sort
/// for both the AI and basic paths, so downstream consumers never re-sort.
pub fn parse_pattern_response(
    response: &str,
    tickets: &[CanonicalTicket],
) -> Vec<RecurringPattern> {
    let mut patterns: Vec<RecurringPattern> = Vec::new();

    for section in segment_sections(response) {
        let Some(label) = section_title(section) else {
            continue;
        };
        let numbers = extract_ticket_numbers(section);
        let occurrence_count = extract_occurrences(section)
            .unwrap_or(numbers.len())
            .max(1);
        let (first_seen, last_seen) = date_range(&numbers, tickets);

        patterns.push(RecurringPattern {
            label,
            occurrence_count,
            ticket_numbers: numbers,
            first_seen,
            last_seen,
            suggested_resolution: suggested_content(section, ContentMode::Pattern),
            estimated_impact: extract_impact(section),
        });
    }

    if patterns.is_empty() && !response.trim().is_empty() {
        patterns.push(synthesize_pattern(response, tickets));
    }

    patterns.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
    patterns
}

/// Parse a completion into knowledge gaps.
///
/// Sorted descending by related-ticket count, mirroring the pattern sort.
pub fn parse_gap_response(response: &str, tickets: &[CanonicalTicket]) -> Vec<KnowledgeGap> {
    let mut gaps: Vec<KnowledgeGap> = Vec::new();

    for section in segment_sections(response) {
        let Some(topic) = section_title(section) else {
            continue;
        };
        let numbers = extract_ticket_numbers(section);

        gaps.push(KnowledgeGap {
            gap_type: classify_gap(section),
            suggested_title: topic.clone(),
            topic,
            related_tickets: numbers,
            suggested_content: suggested_content(section, ContentMode::Gap),
        });
    }

    if gaps.is_empty() && !response.trim().is_empty() {
        gaps.push(synthesize_gap(response, tickets));
    }

    gaps.sort_by(|a, b| b.related_tickets.len().cmp(&a.related_tickets.len()));
    gaps
}

// =============================================================================
// Segmentation
// =============================================================================

/// Split the response into candidate sections starting at each boundary.
/// Text before the first boundary is preamble, not a section; sections
/// shorter than the noise threshold are discarded.
fn segment_sections(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = SECTION_BOUNDARY.find_iter(text).map(|m| m.start()).collect();

    let mut sections = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let section = &text[start..end];
        if section.trim().len() >= MIN_SECTION_LEN {
            sections.push(section);
        }
    }
    sections
}

/// Classify a gap section by keyword search; Missing is the default
fn classify_gap(section: &str) -> GapType {
    let lower = section.to_lowercase();
    if lower.contains("stale") {
        GapType::Stale
    } else if lower.contains("incomplete") {
        GapType::Incomplete
    } else {
        GapType::Missing
    }
}

// =============================================================================
// Field Extraction
// =============================================================================

/// Title from the first non-empty line, stripped of heading markup.
/// Sections whose title is too short to be meaningful are discarded.
fn section_title(section: &str) -> Option<String> {
    let first_line = section.lines().find(|l| !l.trim().is_empty())?;
    let title = strip_heading_markup(first_line);
    (title.chars().count() >= MIN_TITLE_LEN).then_some(title)
}

fn strip_heading_markup(line: &str) -> String {
    let no_hashes = line.trim().trim_start_matches('#').trim();
    let no_emphasis = no_hashes.replace('*', "");
    let trimmed = no_emphasis.trim().trim_matches('_').trim();

    let after_number = LEADING_NUMBER.replace(trimmed, "");
    let after_label = LEADING_LABEL.replace(&after_number, "");
    after_label.trim().to_string()
}

/// Ticket identifiers, deduplicated preserving first-seen order
fn extract_ticket_numbers(section: &str) -> Vec<String> {
    let mut numbers: Vec<String> = Vec::new();
    for m in TICKET_ID.find_iter(section) {
        let id = m.as_str().to_string();
        if !numbers.iter().any(|n| n.eq_ignore_ascii_case(&id)) {
            numbers.push(id);
        }
    }
    numbers
}

fn extract_occurrences(section: &str) -> Option<usize> {
    OCCURRENCES
        .captures(section)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_impact(section: &str) -> String {
    IMPACT_LABEL
        .captures(section)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_matches('*').trim().to_string())
        .unwrap_or_default()
}

/// Which trailing-lines fallback applies when no labeled sub-section exists
#[derive(Clone, Copy)]
enum ContentMode {
    Pattern,
    Gap,
}

/// Suggested fix/content: an explicitly labeled sub-section captured up to
/// the next heading-like boundary or end of section, else a trailing-lines
/// fallback
fn suggested_content(section: &str, mode: ContentMode) -> String {
    if let Some(label) = CONTENT_LABEL.find(section) {
        let after = &section[label.end()..];
        let end = SECTION_BOUNDARY
            .find(after)
            .map(|b| b.start())
            .unwrap_or(after.len());
        let captured = after[..end].trim();
        if !captured.is_empty() {
            return captured.to_string();
        }
    }

    let lines: Vec<&str> = section
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    match mode {
        // Last lines of the section
        ContentMode::Pattern => {
            let start = lines.len().saturating_sub(PATTERN_TAIL_LINES);
            lines[start..].join("\n")
        }
        // Everything after the title line
        ContentMode::Gap => lines.get(1..).unwrap_or_default().join("\n"),
    }
}

/// First/last-seen from the original ticket set's parsed dates; unmatched
/// identifiers and unparseable dates contribute nothing to the range
fn date_range(numbers: &[String], tickets: &[CanonicalTicket]) -> (String, String) {
    let mut parsed: Vec<chrono::NaiveDateTime> = numbers
        .iter()
        .filter_map(|number| {
            tickets
                .iter()
                .find(|t| t.number.eq_ignore_ascii_case(number))
        })
        .filter_map(|t| t.opened_date())
        .collect();
    parsed.sort();

    match (parsed.first(), parsed.last()) {
        (Some(first), Some(last)) => (
            first.format("%Y-%m-%d").to_string(),
            last.format("%Y-%m-%d").to_string(),
        ),
        _ => (String::new(), String::new()),
    }
}

// =============================================================================
// Guaranteed-Output Synthesis
// =============================================================================

/// The model ignored the requested format entirely: wrap the full raw
/// response into one record tied to the first tickets of the input set
fn synthesize_pattern(response: &str, tickets: &[CanonicalTicket]) -> RecurringPattern {
    let numbers = sample_numbers(tickets);
    let (first_seen, last_seen) = date_range(&numbers, tickets);
    RecurringPattern {
        label: "Unstructured analysis".to_string(),
        occurrence_count: numbers.len().max(1),
        ticket_numbers: numbers,
        first_seen,
        last_seen,
        suggested_resolution: response.to_string(),
        estimated_impact: String::new(),
    }
}

fn synthesize_gap(response: &str, tickets: &[CanonicalTicket]) -> KnowledgeGap {
    KnowledgeGap {
        gap_type: GapType::Missing,
        topic: "Unstructured analysis".to_string(),
        related_tickets: sample_numbers(tickets),
        suggested_title: "Unstructured analysis".to_string(),
        suggested_content: response.to_string(),
    }
}

fn sample_numbers(tickets: &[CanonicalTicket]) -> Vec<String> {
    tickets
        .iter()
        .take(FALLBACK_TICKET_SAMPLE)
        .map(|t| t.number.clone())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
