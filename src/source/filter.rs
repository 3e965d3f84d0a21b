//! Post-Normalization Filters
//!
//! Age cutoff plus the optional configuration-item and user filters, applied
//! to canonical tickets from any source. Pure functions: the cutoff instant
//! is computed once at the process boundary and passed in, never read from
//! the environment here.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::types::CanonicalTicket;

/// Which ticket roles a user filter matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleScope {
    /// Caller/requester only
    Requester,
    /// Assignee only
    Assignee,
    /// Caller or assignee
    #[default]
    Both,
    /// Caller, assignee, or a mention in description/work notes
    All,
}

impl std::str::FromStr for RoleScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requester" => Ok(Self::Requester),
            "assignee" => Ok(Self::Assignee),
            "both" => Ok(Self::Both),
            "all" => Ok(Self::All),
            _ => Err(format!(
                "Unknown role scope: {}. Valid values: requester, assignee, both, all",
                s
            )),
        }
    }
}

/// Filter criteria applied after normalization
#[derive(Debug, Clone, Default)]
pub struct ImportFilter {
    /// Tickets opened before this instant are excluded. A ticket with no
    /// parseable opened date is never excluded by the cutoff.
    pub cutoff: Option<NaiveDateTime>,
    /// Case-insensitive substring matched against CI name, short
    /// description, or description
    pub ci: Option<String>,
    /// Case-insensitive substring matched per `role`
    pub user: Option<String>,
    pub role: RoleScope,
}

impl ImportFilter {
    /// Apply all configured criteria, preserving input order
    pub fn apply(&self, tickets: Vec<CanonicalTicket>) -> Vec<CanonicalTicket> {
        let before = tickets.len();
        let kept: Vec<CanonicalTicket> = tickets
            .into_iter()
            .filter(|t| self.retains(t))
            .collect();
        if kept.len() != before {
            debug!(
                "Filtered {} of {} tickets (cutoff/ci/user)",
                before - kept.len(),
                before
            );
        }
        kept
    }

    fn retains(&self, ticket: &CanonicalTicket) -> bool {
        self.within_cutoff(ticket) && self.matches_ci(ticket) && self.matches_user(ticket)
    }

    /// Inclusive boundary: a ticket dated exactly at the cutoff is retained.
    /// Absence of a parseable date means "don't filter it out".
    fn within_cutoff(&self, ticket: &CanonicalTicket) -> bool {
        match (self.cutoff, ticket.opened_date()) {
            (Some(cutoff), Some(opened)) => opened >= cutoff,
            _ => true,
        }
    }

    fn matches_ci(&self, ticket: &CanonicalTicket) -> bool {
        let Some(ci) = &self.ci else {
            return true;
        };
        let needle = ci.to_lowercase();
        CanonicalTicket::field_contains(&ticket.ci_name, &needle)
            || CanonicalTicket::field_contains(&ticket.short_description, &needle)
            || CanonicalTicket::field_contains(&ticket.description, &needle)
    }

    fn matches_user(&self, ticket: &CanonicalTicket) -> bool {
        let Some(user) = &self.user else {
            return true;
        };
        let needle = user.to_lowercase();
        let as_caller = CanonicalTicket::field_contains(&ticket.caller_name, &needle);
        let as_assignee = CanonicalTicket::field_contains(&ticket.assigned_to, &needle);

        match self.role {
            RoleScope::Requester => as_caller,
            RoleScope::Assignee => as_assignee,
            RoleScope::Both => as_caller || as_assignee,
            RoleScope::All => {
                as_caller
                    || as_assignee
                    || CanonicalTicket::field_contains(&ticket.description, &needle)
                    || CanonicalTicket::field_contains(&ticket.work_notes, &needle)
            }
        }
    }
}
