//! Gaps Command
//!
//! Compares ticket volume against the knowledge base and reports
//! documentation gaps, optionally emitting draft article files.

use std::path::PathBuf;

use chrono::Utc;
use console::style;

use crate::analysis::{build_timeline, open_tickets, run_gap_analysis};
use crate::cli::util::{cutoff_from_months, load_kb_articles, load_tickets, maybe_provider};
use crate::config::Config;
use crate::report::{AnalysisReport, write_kb_drafts, write_report};
use crate::source::ImportFilter;
use crate::types::Result;

/// Options resolved from the command line
#[derive(Debug, Clone, Default)]
pub struct GapsOptions {
    pub months_back: Option<u32>,
    pub min_occurrences: Option<usize>,
    pub no_ai: bool,
    pub output: Option<PathBuf>,
    /// Directory to write one draft article file per gap
    pub drafts_dir: Option<PathBuf>,
}

pub async fn run(config: &Config, options: GapsOptions) -> Result<()> {
    let months_back = options.months_back.unwrap_or(config.analysis.months_back);
    let min_occurrences = options
        .min_occurrences
        .unwrap_or(config.analysis.min_occurrences);

    let filter = ImportFilter {
        cutoff: cutoff_from_months(months_back),
        ..Default::default()
    };

    let tickets = load_tickets(config, &filter).await?;
    let articles = load_kb_articles(config).await?;
    let provider = maybe_provider(config, options.no_ai).await?;

    let analysis =
        run_gap_analysis(provider.as_ref(), &tickets, &articles, min_occurrences).await;

    if let Some(dir) = &options.drafts_dir {
        let paths = write_kb_drafts(&analysis.gaps, dir)?;
        println!(
            "{} {} draft articles in {}",
            style("Wrote").bold().green(),
            paths.len(),
            dir.display()
        );
    }

    let report = AnalysisReport {
        generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        source: config.source.backend.to_string(),
        ticket_count: tickets.len(),
        open_count: open_tickets(&tickets).len(),
        ai_assisted: !analysis.used_fallback,
        patterns: Vec::new(),
        gaps: analysis.gaps,
        timeline: build_timeline(&tickets),
    };

    match &options.output {
        Some(path) => write_report(&report, path)?,
        None => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!(
        "{} {} tickets against the knowledge base ({})",
        style("Analyzed").bold().green(),
        report.ticket_count,
        if report.ai_assisted {
            "AI-assisted"
        } else {
            "basic detection"
        }
    );

    if report.gaps.is_empty() {
        println!("No knowledge gaps found.");
        return;
    }

    for gap in &report.gaps {
        println!();
        println!(
            "{} {}",
            style(format!("[{}]", gap.gap_type)).bold().yellow(),
            style(&gap.topic).bold()
        );
        if !gap.related_tickets.is_empty() {
            println!("  tickets: {}", gap.related_tickets.join(", "));
        }
        println!("  suggested title: {}", gap.suggested_title);
        if !gap.suggested_content.is_empty() {
            println!("  {}", gap.suggested_content);
        }
    }
}
