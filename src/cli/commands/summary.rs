//! Summary Command
//!
//! Per-CI or per-user activity summary. The user path exercises the
//! role-bucket merge: tickets are classified by the queries that matched
//! them (requester, then assignee, then mentioned), deduplicated on ticket
//! number with the first bucket winning.

use console::style;

use crate::analysis::{
    ActivityRole, MergedTicket, build_timeline, merge_role_buckets, open_tickets, run_summary,
};
use crate::cli::util::{cutoff_from_months, load_tickets, maybe_provider};
use crate::config::Config;
use crate::source::ImportFilter;
use crate::types::{CanonicalTicket, Result, TicketError};

/// Options resolved from the command line
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    pub ci: Option<String>,
    pub user: Option<String>,
    pub months_back: Option<u32>,
    pub no_ai: bool,
}

pub async fn run(config: &Config, options: SummaryOptions) -> Result<()> {
    let months_back = options.months_back.unwrap_or(config.analysis.months_back);

    match (&options.ci, &options.user) {
        (Some(ci), None) => run_ci_summary(config, ci, months_back, options.no_ai).await,
        (None, Some(user)) => run_user_summary(config, user, months_back, options.no_ai).await,
        _ => Err(TicketError::Config(
            "Pass exactly one of --ci <name> or --user <name>".to_string(),
        )),
    }
}

async fn run_ci_summary(config: &Config, ci: &str, months_back: u32, no_ai: bool) -> Result<()> {
    let filter = ImportFilter {
        cutoff: cutoff_from_months(months_back),
        ci: Some(ci.to_string()),
        ..Default::default()
    };
    let tickets = load_tickets(config, &filter).await?;
    let provider = maybe_provider(config, no_ai).await?;

    let (summary, fallback) = run_summary(provider.as_ref(), ci, &tickets).await;
    print_summary(&format!("CI {ci}"), &tickets, &summary, fallback);
    print_timeline(&tickets);
    Ok(())
}

async fn run_user_summary(
    config: &Config,
    user: &str,
    months_back: u32,
    no_ai: bool,
) -> Result<()> {
    let filter = ImportFilter {
        cutoff: cutoff_from_months(months_back),
        ..Default::default()
    };
    let all = load_tickets(config, &filter).await?;
    let merged = bucket_by_role(&all, user);

    let tickets: Vec<CanonicalTicket> = merged.iter().map(|m| m.ticket.clone()).collect();
    let provider = maybe_provider(config, no_ai).await?;
    let (summary, fallback) = run_summary(provider.as_ref(), user, &tickets).await;

    print_summary(&format!("user {user}"), &tickets, &summary, fallback);
    for role in [
        ActivityRole::Requester,
        ActivityRole::Assignee,
        ActivityRole::Mentioned,
    ] {
        let count = merged.iter().filter(|m| m.role == role).count();
        println!("  as {role}: {count}");
    }
    print_timeline(&tickets);
    Ok(())
}

/// Classify tickets into role buckets for one user and merge them.
/// Merge order is fixed (Requester → Assignee → Mentioned), so a ticket
/// matching several roles files under the first.
fn bucket_by_role(tickets: &[CanonicalTicket], user: &str) -> Vec<MergedTicket> {
    let needle = user.to_lowercase();
    let matching = |field: &str| CanonicalTicket::field_contains(field, &needle);

    let requested: Vec<CanonicalTicket> = tickets
        .iter()
        .filter(|t| matching(&t.caller_name))
        .cloned()
        .collect();
    let assigned: Vec<CanonicalTicket> = tickets
        .iter()
        .filter(|t| matching(&t.assigned_to))
        .cloned()
        .collect();
    let mentioned: Vec<CanonicalTicket> = tickets
        .iter()
        .filter(|t| matching(&t.description) || matching(&t.work_notes))
        .cloned()
        .collect();

    merge_role_buckets(requested, assigned, mentioned)
}

fn print_summary(subject: &str, tickets: &[CanonicalTicket], summary: &str, fallback: bool) {
    println!(
        "{} {} — {} tickets, {} open ({})",
        style("Summary for").bold().green(),
        subject,
        tickets.len(),
        open_tickets(tickets).len(),
        if fallback { "basic" } else { "AI-assisted" }
    );
    println!();
    println!("{summary}");
    println!();
}

fn print_timeline(tickets: &[CanonicalTicket]) {
    let timeline = build_timeline(tickets);
    if timeline.is_empty() {
        return;
    }
    println!("{}", style("Timeline").bold());
    for entry in timeline {
        println!(
            "  {}  {}  {}  ({})",
            style(&entry.date).dim(),
            entry.number,
            entry.short_description,
            entry.state
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_by_role_first_bucket_wins() {
        let mut both_roles = CanonicalTicket {
            number: "INC0010001".to_string(),
            ..Default::default()
        };
        both_roles.caller_name = "Dana Reyes".to_string();
        both_roles.assigned_to = "Dana Reyes".to_string();

        let mut assigned_only = CanonicalTicket {
            number: "INC0010002".to_string(),
            ..Default::default()
        };
        assigned_only.assigned_to = "dana reyes".to_string();

        let merged = bucket_by_role(&[both_roles, assigned_only], "dana");
        assert_eq!(merged.len(), 2);

        let first = merged
            .iter()
            .find(|m| m.ticket.number == "INC0010001")
            .unwrap();
        assert_eq!(first.role, ActivityRole::Requester);
        let second = merged
            .iter()
            .find(|m| m.ticket.number == "INC0010002")
            .unwrap();
        assert_eq!(second.role, ActivityRole::Assignee);
    }
}
