//! Jira-Style REST Backend
//!
//! Search-API client with startAt pagination, plus normalization of the
//! backend's nested issue shape (author/assignee objects carrying a display
//! name) into canonical tickets via fixed mappings. This backend has no
//! native knowledge-base concept.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::http::{BASE_DELAY_MS, JIRA_PAGE_SIZE, MAX_DELAY_SECS, MAX_RETRIES};
use crate::source::{normalize_priority, validate_base_url};
use crate::types::{
    CanonicalTicket, Result, TicketError, TicketSource, TicketType, UpstreamError,
    json_path_string, json_string_or,
};

const SERVICE: &str = "jira";

/// Connection settings for a Jira-style instance
#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Instance base URL, e.g. `https://corp.atlassian.net`
    pub base_url: Option<String>,
    pub email: Option<String>,
    /// Never serialized to output
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Optional project key restricting the search
    pub project: Option<String>,
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("project", &self.project)
            .finish()
    }
}

/// Search-API client
pub struct JiraClient {
    base: String,
    email: String,
    token: SecretString,
    project: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base", &self.base)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .field("project", &self.project)
            .finish()
    }
}

impl JiraClient {
    pub fn new(config: &JiraConfig, timeout_secs: u64) -> Result<Self> {
        let base_url = config.base_url.as_deref().ok_or_else(|| {
            TicketError::Config(
                "Jira base URL not configured. Set source.jira.base_url".to_string(),
            )
        })?;
        let base = validate_base_url(base_url, SERVICE)?;

        let token = config.api_token.clone().ok_or_else(|| {
            TicketError::Config("Jira API token not configured. Set source.jira.api_token".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TicketError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base,
            email: config.email.clone().unwrap_or_default(),
            token: SecretString::from(token),
            project: config.project.clone(),
            client,
        })
    }

    fn jql(&self) -> String {
        match &self.project {
            Some(project) => format!("project = {project} ORDER BY created DESC"),
            None => "ORDER BY created DESC".to_string(),
        }
    }

    /// Fetch one page of search results; returns the issues and the
    /// server-reported total
    async fn search_page(&self, start_at: usize) -> Result<(Vec<Value>, usize)> {
        let url = format!("{}/rest/api/2/search", self.base);
        let jql = self.jql();
        let start = start_at.to_string();
        let max = JIRA_PAGE_SIZE.to_string();

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.email, Some(self.token.expose_secret()))
            .query(&[
                ("jql", jql.as_str()),
                ("startAt", start.as_str()),
                ("maxResults", max.as_str()),
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

        let issues = body
            .get("issues")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let total = body.get("total").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
        Ok((issues, total))
    }

    /// Retrieve every issue the search matches, paginating until exhausted
    pub async fn fetch_tickets(&self) -> Result<Vec<CanonicalTicket>> {
        let mut tickets = Vec::new();
        let mut start_at = 0;

        loop {
            let (issues, total) = (|| self.search_page(start_at))
                .retry(retry_policy())
                .when(|e: &TicketError| {
                    matches!(e, TicketError::Upstream(u) if u.is_retryable())
                })
                .notify(|err, delay| {
                    warn!("Retrying Jira search in {:?}: {}", delay, err);
                })
                .await?;

            let count = issues.len();
            tickets.extend(issues.iter().map(normalize_issue));
            start_at += count;

            debug!("Fetched {}/{} issues", start_at, total);
            if count == 0 || start_at >= total {
                break;
            }
        }

        info!("Retrieved {} tickets from Jira", tickets.len());
        Ok(tickets)
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

/// Map a native issue into the canonical shape.
///
/// Issue type names map into the canonical enum best-effort; the state and
/// priority names are free text and pass through (priority normalized to
/// "N - Label" where mappable).
pub fn normalize_issue(issue: &Value) -> CanonicalTicket {
    let fields = issue.get("fields").cloned().unwrap_or(Value::Null);

    let type_name = json_path_string(&fields, &["issuetype", "name"]).unwrap_or_default();
    let priority = json_path_string(&fields, &["priority", "name"]).unwrap_or_default();

    CanonicalTicket {
        number: json_string_or(issue, "key", ""),
        ticket_type: TicketType::parse_or_default(&type_name),
        short_description: json_string_or(&fields, "summary", ""),
        description: json_string_or(&fields, "description", ""),
        state: json_path_string(&fields, &["status", "name"]).unwrap_or_default(),
        priority: normalize_priority(&priority),
        category: first_name(&fields, "components"),
        subcategory: first_label(&fields),
        opened_at: json_string_or(&fields, "created", ""),
        closed_at: String::new(),
        resolved_at: json_string_or(&fields, "resolutiondate", ""),
        assigned_to: json_path_string(&fields, &["assignee", "displayName"]).unwrap_or_default(),
        caller_name: json_path_string(&fields, &["reporter", "displayName"]).unwrap_or_default(),
        close_notes: String::new(),
        work_notes: String::new(),
        ci_name: String::new(),
        source: TicketSource::Jira,
    }
}

/// First entry's `name` in an array of named objects (components)
fn first_name(fields: &Value, key: &str) -> String {
    fields
        .get(key)
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|item| item.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// First entry in the labels array
fn first_label(fields: &Value) -> String {
    fields
        .get("labels")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
