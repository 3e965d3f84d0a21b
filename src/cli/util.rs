//! Shared CLI Helpers
//!
//! Source selection, filter assembly, and provider construction shared by
//! the analysis commands. This is the process boundary: "now" and
//! environment-driven settings are resolved here and passed into the core
//! as plain values.

use chrono::{Months, NaiveDateTime, Utc};
use tracing::warn;

use crate::ai::{SharedProvider, create_provider};
use crate::config::{BackendKind, Config};
use crate::source::{ImportFilter, JiraClient, ServiceNowClient, export};
use crate::types::{CanonicalTicket, KbArticle, Result, TicketError};

/// Inclusive cutoff instant for an age window of `months_back` months
pub(crate) fn cutoff_from_months(months_back: u32) -> Option<NaiveDateTime> {
    Utc::now()
        .naive_utc()
        .checked_sub_months(Months::new(months_back))
}

/// Retrieve tickets from the configured backend and apply the filter
pub(crate) async fn load_tickets(
    config: &Config,
    filter: &ImportFilter,
) -> Result<Vec<CanonicalTicket>> {
    let tickets = match config.source.backend {
        BackendKind::ServiceNow => {
            let client =
                ServiceNowClient::new(&config.source.servicenow, config.source.request_timeout_secs)?;
            client.fetch_tickets().await?
        }
        BackendKind::Jira => {
            let client = JiraClient::new(&config.source.jira, config.source.request_timeout_secs)?;
            client.fetch_tickets().await?
        }
        BackendKind::Export => {
            let path = config.source.export_path.as_ref().ok_or_else(|| {
                TicketError::Config(
                    "Export path not configured. Set source.export_path or pass --export"
                        .to_string(),
                )
            })?;
            export::load_tickets(path)?
        }
    };

    let kept = filter.apply(tickets);
    if kept.is_empty() {
        warn!("No tickets matched the requested window and filters");
    }
    Ok(kept)
}

/// Retrieve knowledge articles where the backend has a KB concept
pub(crate) async fn load_kb_articles(config: &Config) -> Result<Vec<KbArticle>> {
    match config.source.backend {
        BackendKind::ServiceNow => {
            let client =
                ServiceNowClient::new(&config.source.servicenow, config.source.request_timeout_secs)?;
            client.fetch_kb_articles().await
        }
        // No native KB concept for these sources
        BackendKind::Jira | BackendKind::Export => Ok(Vec::new()),
    }
}

/// Build the completion provider unless AI is skipped.
///
/// A failed health check is a warning, not an error — the analysis layer
/// falls back to basic detection if the completion call itself fails.
/// Configuration errors (unknown provider, missing key) stay fatal.
pub(crate) async fn maybe_provider(config: &Config, no_ai: bool) -> Result<Option<SharedProvider>> {
    if no_ai || config.llm.skip_ai {
        return Ok(None);
    }

    let provider = create_provider(&config.llm.provider)?;
    match provider.health_check().await {
        Ok(true) => {}
        _ => warn!(
            "Provider {} failed its health check; attempting anyway",
            provider.name()
        ),
    }
    Ok(Some(provider))
}
