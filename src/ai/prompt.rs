//! Prompt Construction
//!
//! Builds the completion prompts for pattern detection, gap analysis, and
//! summaries. Ticket data is rendered one line per ticket so the model sees
//! a compact, uniform table; the requested output structure matches what
//! the response parser recognizes, but nothing downstream assumes the model
//! honored it.

use crate::types::{CanonicalTicket, KbArticle};

/// Render one ticket as a single prompt line:
/// `[Type] Number | OpenedAt | ShortDescription | State | Priority | AssignedTo | CloseNotes`
pub fn ticket_line(ticket: &CanonicalTicket) -> String {
    format!(
        "[{}] {} | {} | {} | {} | {} | {} | {}",
        ticket.ticket_type,
        ticket.number,
        ticket.opened_at,
        ticket.short_description,
        ticket.state,
        ticket.priority,
        ticket.assigned_to,
        ticket.close_notes,
    )
}

/// Render the full ticket set, newline-joined
pub fn render_ticket_lines(tickets: &[CanonicalTicket]) -> String {
    tickets
        .iter()
        .map(ticket_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt requesting recurring-issue patterns
pub fn pattern_prompt(tickets: &[CanonicalTicket], min_occurrences: usize) -> String {
    format!(
        "Analyze the following IT service tickets and identify recurring issue patterns.\n\
         Only report patterns backed by at least {min_occurrences} tickets.\n\n\
         For each pattern, use exactly this structure:\n\n\
         ### Pattern 1: <short label>\n\
         Occurrences: <count>\n\
         Tickets: <comma-separated ticket numbers>\n\
         Impact: <one line>\n\
         Suggested Fix: <how to address the root cause>\n\n\
         Tickets ({count} total, one per line):\n\
         [Type] Number | OpenedAt | ShortDescription | State | Priority | AssignedTo | CloseNotes\n\
         {lines}\n",
        min_occurrences = min_occurrences,
        count = tickets.len(),
        lines = render_ticket_lines(tickets),
    )
}

/// Prompt requesting knowledge-base gap analysis
pub fn gap_prompt(tickets: &[CanonicalTicket], articles: &[KbArticle]) -> String {
    let article_lines = if articles.is_empty() {
        "(no knowledge articles exist)".to_string()
    } else {
        articles
            .iter()
            .map(|a| format!("{} | {} | {} | updated {}", a.number, a.title, a.category, a.last_updated))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Compare the following IT service tickets against the existing knowledge-base\n\
         articles and identify documentation gaps. Classify each gap as Missing (no\n\
         article covers the topic), Stale (an article exists but is out of date), or\n\
         Incomplete (an article exists but lacks needed detail).\n\n\
         For each gap, use exactly this structure:\n\n\
         ### Missing 1: <topic>\n\
         Tickets: <comma-separated ticket numbers>\n\
         Suggested Title: <title for the new or revised article>\n\
         Suggested Content: <outline of what the article should cover>\n\n\
         Knowledge articles (number | title | category | updated):\n\
         {articles}\n\n\
         Tickets ({count} total, one per line):\n\
         [Type] Number | OpenedAt | ShortDescription | State | Priority | AssignedTo | CloseNotes\n\
         {lines}\n",
        articles = article_lines,
        count = tickets.len(),
        lines = render_ticket_lines(tickets),
    )
}

/// Prompt requesting a human-readable summary of a ticket set
pub fn summary_prompt(subject: &str, tickets: &[CanonicalTicket]) -> String {
    format!(
        "Write a concise summary of the IT service ticket activity for {subject}.\n\
         Cover: overall volume, what is currently open, notable recurring themes,\n\
         and anything that looks urgent. Plain prose, no more than four paragraphs.\n\n\
         Tickets ({count} total, one per line):\n\
         [Type] Number | OpenedAt | ShortDescription | State | Priority | AssignedTo | CloseNotes\n\
         {lines}\n",
        count = tickets.len(),
        lines = render_ticket_lines(tickets),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TicketSource, TicketType};

    fn ticket() -> CanonicalTicket {
        CanonicalTicket {
            number: "INC0010001".to_string(),
            ticket_type: TicketType::Incident,
            short_description: "VPN drops hourly".to_string(),
            state: "In Progress".to_string(),
            priority: "2 - High".to_string(),
            opened_at: "2026-02-10 08:00:00".to_string(),
            assigned_to: "Lee Park".to_string(),
            close_notes: String::new(),
            source: TicketSource::ServiceNow,
            ..Default::default()
        }
    }

    #[test]
    fn test_ticket_line_format() {
        let line = ticket_line(&ticket());
        assert_eq!(
            line,
            "[Incident] INC0010001 | 2026-02-10 08:00:00 | VPN drops hourly | In Progress | 2 - High | Lee Park | "
        );
    }

    #[test]
    fn test_pattern_prompt_mentions_threshold_and_tickets() {
        let prompt = pattern_prompt(&[ticket()], 3);
        assert!(prompt.contains("at least 3 tickets"));
        assert!(prompt.contains("INC0010001"));
        assert!(prompt.contains("### Pattern 1:"));
    }

    #[test]
    fn test_gap_prompt_without_articles() {
        let prompt = gap_prompt(&[ticket()], &[]);
        assert!(prompt.contains("(no knowledge articles exist)"));
        assert!(prompt.contains("Suggested Content:"));
    }
}
