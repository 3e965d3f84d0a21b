//! Patterns Command
//!
//! Retrieves tickets from the configured source and produces a
//! recurring-issue pattern report, AI-assisted when a provider is
//! available.

use std::path::PathBuf;

use chrono::Utc;
use console::style;

use crate::analysis::{build_timeline, open_tickets, run_pattern_analysis};
use crate::cli::util::{cutoff_from_months, load_tickets, maybe_provider};
use crate::config::Config;
use crate::report::{AnalysisReport, write_report};
use crate::source::{ImportFilter, RoleScope};
use crate::types::Result;

/// Options resolved from the command line
#[derive(Debug, Clone, Default)]
pub struct PatternsOptions {
    pub months_back: Option<u32>,
    pub min_occurrences: Option<usize>,
    pub ci: Option<String>,
    pub user: Option<String>,
    pub role: RoleScope,
    pub no_ai: bool,
    pub output: Option<PathBuf>,
}

pub async fn run(config: &Config, options: PatternsOptions) -> Result<()> {
    let months_back = options.months_back.unwrap_or(config.analysis.months_back);
    let min_occurrences = options
        .min_occurrences
        .unwrap_or(config.analysis.min_occurrences);

    let filter = ImportFilter {
        cutoff: cutoff_from_months(months_back),
        ci: options.ci.clone(),
        user: options.user.clone(),
        role: options.role,
    };

    let tickets = load_tickets(config, &filter).await?;
    let provider = maybe_provider(config, options.no_ai).await?;

    let analysis = run_pattern_analysis(provider.as_ref(), &tickets, min_occurrences).await;

    let report = AnalysisReport {
        generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        source: config.source.backend.to_string(),
        ticket_count: tickets.len(),
        open_count: open_tickets(&tickets).len(),
        ai_assisted: !analysis.used_fallback,
        patterns: analysis.patterns,
        gaps: Vec::new(),
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
        "{} {} tickets, {} open ({})",
        style("Analyzed").bold().green(),
        report.ticket_count,
        report.open_count,
        if report.ai_assisted {
            "AI-assisted"
        } else {
            "basic detection"
        }
    );

    if report.patterns.is_empty() {
        println!("No recurring patterns found.");
        return;
    }

    for pattern in &report.patterns {
        println!();
        println!(
            "{} {}",
            style(&pattern.label).bold(),
            style(format!("×{}", pattern.occurrence_count)).dim()
        );
        if !pattern.first_seen.is_empty() {
            println!("  seen {} to {}", pattern.first_seen, pattern.last_seen);
        }
        if !pattern.ticket_numbers.is_empty() {
            println!("  tickets: {}", pattern.ticket_numbers.join(", "));
        }
        if !pattern.estimated_impact.is_empty() {
            println!("  impact: {}", pattern.estimated_impact);
        }
        if !pattern.suggested_resolution.is_empty() {
            println!("  fix: {}", pattern.suggested_resolution);
        }
    }
}
