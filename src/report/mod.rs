//! Report Assembly and Emission
//!
//! Builds the structured report consumed by external renderers, serializes
//! it to JSON, renders a minimal markdown view for the terminal, and emits
//! knowledge-base draft files. Every emitted draft carries the draft
//! workflow marker unconditionally — pushed articles must never appear
//! published.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::analysis::TimelineEntry;
use crate::types::{KnowledgeGap, RecurringPattern, Result, TicketError};

/// Workflow marker stamped on every emitted draft
const DRAFT_WORKFLOW_STATE: &str = "draft";

/// Structured analysis report handed to external renderers
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    pub source: String,
    pub ticket_count: usize,
    pub open_count: usize,
    /// False when the deterministic fallback produced the results
    pub ai_assisted: bool,
    pub patterns: Vec<RecurringPattern>,
    pub gaps: Vec<KnowledgeGap>,
    pub timeline: Vec<TimelineEntry>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Minimal markdown rendering for terminal output or file dumps
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# Ticket Analysis ({})\n\nGenerated: {}\nTickets: {} ({} open)\nMode: {}\n",
            self.source,
            self.generated_at,
            self.ticket_count,
            self.open_count,
            if self.ai_assisted { "AI-assisted" } else { "basic detection" },
        ));

        if !self.patterns.is_empty() {
            out.push_str("\n## Recurring Patterns\n");
            for pattern in &self.patterns {
                out.push_str(&format!(
                    "\n### {} ({} occurrences)\n",
                    pattern.label, pattern.occurrence_count
                ));
                if !pattern.first_seen.is_empty() {
                    out.push_str(&format!(
                        "Seen: {} to {}\n",
                        pattern.first_seen, pattern.last_seen
                    ));
                }
                if !pattern.ticket_numbers.is_empty() {
                    out.push_str(&format!("Tickets: {}\n", pattern.ticket_numbers.join(", ")));
                }
                if !pattern.estimated_impact.is_empty() {
                    out.push_str(&format!("Impact: {}\n", pattern.estimated_impact));
                }
                if !pattern.suggested_resolution.is_empty() {
                    out.push_str(&format!("Suggested fix: {}\n", pattern.suggested_resolution));
                }
            }
        }

        if !self.gaps.is_empty() {
            out.push_str("\n## Knowledge Gaps\n");
            for gap in &self.gaps {
                out.push_str(&format!("\n### [{}] {}\n", gap.gap_type, gap.topic));
                if !gap.related_tickets.is_empty() {
                    out.push_str(&format!("Tickets: {}\n", gap.related_tickets.join(", ")));
                }
                out.push_str(&format!("Suggested title: {}\n", gap.suggested_title));
                if !gap.suggested_content.is_empty() {
                    out.push_str(&format!("{}\n", gap.suggested_content));
                }
            }
        }

        out
    }
}

// =============================================================================
// Knowledge-Base Drafts
// =============================================================================

/// A draft article ready for upstream push.
/// `workflow_state` is always the draft marker; there is no constructor
/// that produces anything else.
#[derive(Debug, Clone, Serialize)]
pub struct KbDraft {
    pub gap_type: String,
    pub topic: String,
    pub related_tickets: Vec<String>,
    pub suggested_title: String,
    pub suggested_content: String,
    pub workflow_state: String,
}

impl KbDraft {
    pub fn from_gap(gap: &KnowledgeGap) -> Self {
        Self {
            gap_type: gap.gap_type.to_string(),
            topic: gap.topic.clone(),
            related_tickets: gap.related_tickets.clone(),
            suggested_title: gap.suggested_title.clone(),
            suggested_content: gap.suggested_content.clone(),
            workflow_state: DRAFT_WORKFLOW_STATE.to_string(),
        }
    }
}

/// Write one JSON draft file per gap into `dir`, returning the paths
pub fn write_kb_drafts(gaps: &[KnowledgeGap], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut paths = Vec::new();
    for (index, gap) in gaps.iter().enumerate() {
        let draft = KbDraft::from_gap(gap);
        let filename = format!("{:03}-{}.json", index + 1, slugify(&gap.topic));
        let path = dir.join(filename);
        std::fs::write(&path, serde_json::to_string_pretty(&draft)?)?;
        paths.push(path);
    }

    info!("Wrote {} knowledge-base drafts to {}", paths.len(), dir.display());
    Ok(paths)
}

fn slugify(topic: &str) -> String {
    let slug: String = topic
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.chars().take(48).collect()
    }
}

/// Write the report itself (JSON or markdown, by extension)
pub fn write_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let contents = match extension.as_str() {
        "json" => report.to_json()?,
        "md" | "markdown" => report.render_markdown(),
        other => {
            return Err(TicketError::Report(format!(
                "Unsupported report extension '{other}': expected json or md"
            )));
        }
    };

    std::fs::write(path, contents)?;
    info!("Wrote report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GapType;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            generated_at: "2026-08-06".to_string(),
            source: "export".to_string(),
            ticket_count: 3,
            open_count: 1,
            ai_assisted: false,
            patterns: vec![RecurringPattern {
                label: "Category: Network > VPN".to_string(),
                occurrence_count: 3,
                ticket_numbers: vec!["INC0010001".to_string()],
                first_seen: "2026-01-01".to_string(),
                last_seen: "2026-02-01".to_string(),
                suggested_resolution: "Renew certificates".to_string(),
                estimated_impact: "Low - 3 occurrences, 1 still open".to_string(),
            }],
            gaps: vec![KnowledgeGap {
                gap_type: GapType::Missing,
                topic: "Printing".to_string(),
                related_tickets: vec!["INC0010002".to_string()],
                suggested_title: "Troubleshooting Printing issues".to_string(),
                suggested_content: "Cover queue resets.".to_string(),
            }],
            timeline: Vec::new(),
        }
    }

    #[test]
    fn test_markdown_rendering() {
        let markdown = sample_report().render_markdown();
        assert!(markdown.contains("# Ticket Analysis (export)"));
        assert!(markdown.contains("### Category: Network > VPN (3 occurrences)"));
        assert!(markdown.contains("### [Missing] Printing"));
        assert!(markdown.contains("basic detection"));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = sample_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ticket_count"], 3);
        assert_eq!(value["patterns"][0]["occurrence_count"], 3);
    }

    #[test]
    fn test_drafts_always_carry_draft_marker() {
        let gap = KnowledgeGap {
            gap_type: GapType::Stale,
            topic: "VPN Setup".to_string(),
            ..Default::default()
        };
        let draft = KbDraft::from_gap(&gap);
        assert_eq!(draft.workflow_state, "draft");
    }

    #[test]
    fn test_write_kb_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let gaps = vec![
            KnowledgeGap {
                topic: "Printing & Scanning".to_string(),
                ..Default::default()
            },
            KnowledgeGap {
                topic: "VPN".to_string(),
                ..Default::default()
            },
        ];

        let paths = write_kb_drafts(&gaps, dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].file_name().unwrap().to_str().unwrap().contains("printing"));

        let contents = std::fs::read_to_string(&paths[0]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["workflow_state"], "draft");
    }

    #[test]
    fn test_write_report_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_report(&sample_report(), &dir.path().join("report.pdf")).unwrap_err();
        assert!(matches!(err, TicketError::Report(_)));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Printing & Scanning"), "printing---scanning");
        assert_eq!(slugify("///"), "untitled");
    }
}
