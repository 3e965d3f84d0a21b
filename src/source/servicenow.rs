//! ServiceNow-Style REST Backend
//!
//! Table-API client with offset pagination and retry on throttling, plus
//! fixed-table normalization of the backend's native record shape into
//! canonical tickets. Unknown enumeration values pass through unchanged
//! rather than failing.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::http::{BASE_DELAY_MS, MAX_DELAY_SECS, MAX_RETRIES, SERVICENOW_PAGE_SIZE};
use crate::source::{normalize_priority, validate_base_url};
use crate::types::{
    CanonicalTicket, KbArticle, Result, TicketError, TicketSource, TicketType, UpstreamError,
};

const SERVICE: &str = "servicenow";

/// Ticket tables queried per record type
const TICKET_TABLES: &[(&str, TicketType)] = &[
    ("incident", TicketType::Incident),
    ("change_request", TicketType::ChangeRequest),
    ("problem", TicketType::Problem),
    ("sc_request", TicketType::ServiceRequest),
    ("sc_req_item", TicketType::RequestedItem),
];

/// Connection settings for a ServiceNow-style instance
#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ServiceNowConfig {
    /// Instance base URL, e.g. `https://corp.service-now.com`
    pub instance_url: Option<String>,
    pub username: Option<String>,
    /// Never serialized to output
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
}

impl std::fmt::Debug for ServiceNowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceNowConfig")
            .field("instance_url", &self.instance_url)
            .field("username", &self.username)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Table-API client
pub struct ServiceNowClient {
    base: String,
    username: String,
    token: SecretString,
    client: reqwest::Client,
}

impl std::fmt::Debug for ServiceNowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceNowClient")
            .field("base", &self.base)
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ServiceNowClient {
    pub fn new(config: &ServiceNowConfig, timeout_secs: u64) -> Result<Self> {
        let instance_url = config.instance_url.as_deref().ok_or_else(|| {
            TicketError::Config(
                "ServiceNow instance URL not configured. Set source.servicenow.instance_url"
                    .to_string(),
            )
        })?;
        let base = validate_base_url(instance_url, SERVICE)?;

        let username = config.username.clone().unwrap_or_default();
        let token = config.api_token.clone().ok_or_else(|| {
            TicketError::Config(
                "ServiceNow API token not configured. Set source.servicenow.api_token".to_string(),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TicketError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base,
            username,
            token: SecretString::from(token),
            client,
        })
    }

    /// Fetch one page of a table query
    async fn fetch_page(&self, table: &str, offset: usize) -> Result<Vec<Value>> {
        let url = format!("{}/api/now/table/{}", self.base, table);
        let limit = SERVICENOW_PAGE_SIZE.to_string();
        let offset_param = offset.to_string();

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(self.token.expose_secret()))
            .query(&[
                ("sysparm_limit", limit.as_str()),
                ("sysparm_offset", offset_param.as_str()),
                ("sysparm_display_value", "true"),
                ("sysparm_exclude_reference_link", "true"),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(e.to_string(), SERVICE))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::from_http_status(status.as_u16(), body, SERVICE).into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_transport(e.to_string(), SERVICE))?;

        Ok(body
            .get("result")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    /// Paginate a table until exhausted, retrying throttled pages
    async fn fetch_all(&self, table: &str) -> Result<Vec<Value>> {
        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let page = (|| self.fetch_page(table, offset))
                .retry(retry_policy())
                .when(|e: &TicketError| {
                    matches!(e, TicketError::Upstream(u) if u.is_retryable())
                })
                .notify(|err, delay| {
                    warn!("Retrying {} query in {:?}: {}", table, delay, err);
                })
                .await?;

            let count = page.len();
            rows.extend(page);
            if count < SERVICENOW_PAGE_SIZE {
                break;
            }
            offset += count;
        }

        debug!("Fetched {} rows from table {}", rows.len(), table);
        Ok(rows)
    }

    /// Retrieve tickets of every supported type
    pub async fn fetch_tickets(&self) -> Result<Vec<CanonicalTicket>> {
        let mut tickets = Vec::new();
        for (table, ticket_type) in TICKET_TABLES {
            let rows = self.fetch_all(table).await?;
            tickets.extend(rows.iter().map(|row| normalize_record(row, *ticket_type)));
        }
        info!("Retrieved {} tickets from ServiceNow", tickets.len());
        Ok(tickets)
    }

    /// Retrieve published knowledge articles for gap analysis
    pub async fn fetch_kb_articles(&self) -> Result<Vec<KbArticle>> {
        let rows = self.fetch_all("kb_knowledge").await?;
        let articles: Vec<KbArticle> = rows.iter().map(normalize_article).collect();
        info!("Retrieved {} knowledge articles", articles.len());
        Ok(articles)
    }
}

fn retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(BASE_DELAY_MS))
        .with_max_delay(Duration::from_secs(MAX_DELAY_SECS))
        .with_max_times(MAX_RETRIES)
}

// =============================================================================
// Normalization
// =============================================================================

/// Read a field that may arrive as a plain string or, for reference fields,
/// as an object carrying a `display_value`
fn field(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => map
            .get("display_value")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Numeric state codes map to display labels; anything else passes through
fn map_state(raw: &str) -> String {
    match raw.trim() {
        "1" => "New".to_string(),
        "2" => "In Progress".to_string(),
        "3" => "On Hold".to_string(),
        "6" => "Resolved".to_string(),
        "7" => "Closed".to_string(),
        "8" => "Cancelled".to_string(),
        other => other.to_string(),
    }
}

/// Map a native table row into the canonical shape
pub fn normalize_record(row: &Value, ticket_type: TicketType) -> CanonicalTicket {
    CanonicalTicket {
        number: field(row, "number"),
        ticket_type,
        short_description: field(row, "short_description"),
        description: field(row, "description"),
        state: map_state(&field(row, "state")),
        priority: normalize_priority(&field(row, "priority")),
        category: field(row, "category"),
        subcategory: field(row, "subcategory"),
        opened_at: field(row, "opened_at"),
        closed_at: field(row, "closed_at"),
        resolved_at: field(row, "resolved_at"),
        assigned_to: field(row, "assigned_to"),
        caller_name: field(row, "caller_id"),
        close_notes: field(row, "close_notes"),
        work_notes: field(row, "work_notes"),
        ci_name: field(row, "cmdb_ci"),
        source: TicketSource::ServiceNow,
    }
}

fn normalize_article(row: &Value) -> KbArticle {
    KbArticle {
        number: field(row, "number"),
        title: field(row, "short_description"),
        content: field(row, "text"),
        category: field(row, "kb_category"),
        last_updated: field(row, "sys_updated_on"),
        workflow_state: field(row, "workflow_state"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_record_plain_fields() {
        let row = json!({
            "number": "INC0012345",
            "short_description": "Email outage",
            "state": "In Progress",
            "priority": "2",
            "category": "Software",
            "opened_at": "2026-02-10 08:00:00",
            "caller_id": "Dana Reyes"
        });
        let ticket = normalize_record(&row, TicketType::Incident);
        assert_eq!(ticket.number, "INC0012345");
        assert_eq!(ticket.state, "In Progress");
        assert_eq!(ticket.priority, "2 - High");
        assert_eq!(ticket.caller_name, "Dana Reyes");
        assert_eq!(ticket.source, TicketSource::ServiceNow);
    }

    #[test]
    fn test_normalize_record_reference_fields() {
        let row = json!({
            "number": "INC0012346",
            "assigned_to": {"display_value": "Lee Park", "link": "https://x/api/sys_user/1"},
            "cmdb_ci": {"display_value": "web-prod-01"}
        });
        let ticket = normalize_record(&row, TicketType::Incident);
        assert_eq!(ticket.assigned_to, "Lee Park");
        assert_eq!(ticket.ci_name, "web-prod-01");
    }

    #[test]
    fn test_numeric_state_codes_mapped() {
        assert_eq!(map_state("1"), "New");
        assert_eq!(map_state("6"), "Resolved");
        assert_eq!(map_state("7"), "Closed");
        // Unknown values pass through unchanged
        assert_eq!(map_state("42"), "42");
        assert_eq!(map_state("Awaiting Vendor"), "Awaiting Vendor");
    }

    #[test]
    fn test_normalize_article() {
        let row = json!({
            "number": "KB0001234",
            "short_description": "Resetting VPN tokens",
            "text": "Step 1 ...",
            "kb_category": {"display_value": "Network"},
            "workflow_state": "published"
        });
        let article = normalize_article(&row);
        assert_eq!(article.number, "KB0001234");
        assert_eq!(article.category, "Network");
        assert_eq!(article.workflow_state, "published");
    }

    #[test]
    fn test_client_requires_instance_url() {
        let err = ServiceNowClient::new(&ServiceNowConfig::default(), 30).unwrap_err();
        assert!(matches!(err, TicketError::Config(_)));
    }

    #[test]
    fn test_client_requires_token() {
        let config = ServiceNowConfig {
            instance_url: Some("https://corp.service-now.com".to_string()),
            username: Some("svc-reporting".to_string()),
            api_token: None,
        };
        let err = ServiceNowClient::new(&config, 30).unwrap_err();
        assert!(matches!(err, TicketError::Config(_)));
    }
}
