//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Configuration and I/O errors are fatal and surfaced unchanged; upstream
//! request errors carry a category so callers can decide between retrying
//! and falling back to the deterministic pattern detector.
//!
//! ## Error Categories
//!
//! - **RateLimit**: upstream throttling (wait and retry)
//! - **Auth**: authentication failures (fail fast)
//! - **Network**: connectivity issues (retry with backoff)
//! - **Unavailable**: service down (fall back)
//! - **Transient**: temporary server issues (retry)

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Failure categories for upstream requests (ticket backends and the
/// completion endpoint), used for retry and fallback routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Service unavailable - don't retry, fall back
    Unavailable,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Temporary server issues - retry
    Transient,
    /// Unknown error - conservative, no retry
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth retrying against the same service
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }

    /// Get recommended retry delay for this category
    pub fn recommended_delay(&self) -> Duration {
        match self {
            Self::RateLimit => Duration::from_secs(30),
            Self::Network => Duration::from_secs(5),
            Self::Transient => Duration::from_secs(2),
            _ => Duration::from_millis(500),
        }
    }
}

// =============================================================================
// Upstream Error
// =============================================================================

/// Structured error from an upstream HTTP service with category, context,
/// and retry hints
#[derive(Debug, Clone)]
pub struct UpstreamError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Service that produced the error (backend or provider name)
    pub service: Option<String>,
    /// Suggested wait time before retry (if applicable)
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(service) = &self.service {
            write!(f, "[{}:{}] {}", service, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for UpstreamError {}

impl UpstreamError {
    /// Create a new upstream error
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            service: None,
            retry_after: None,
        }
    }

    /// Add service context
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Add suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    /// Check if the error is worth retrying
    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }

    /// Get recommended retry delay
    pub fn recommended_delay(&self) -> Duration {
        self.retry_after
            .unwrap_or_else(|| self.category.recommended_delay())
    }

    /// Classify an HTTP status code from any upstream service
    pub fn from_http_status(status: u16, message: impl Into<String>, service: &str) -> Self {
        let err = |category| Self::new(category, message).service(service);
        match status {
            429 => err(ErrorCategory::RateLimit).retry_after(Duration::from_secs(30)),
            401 | 403 => err(ErrorCategory::Auth),
            400 | 404 | 422 => err(ErrorCategory::BadRequest),
            500 | 502 | 503 | 504 => {
                err(ErrorCategory::Transient).retry_after(Duration::from_secs(5))
            }
            _ => err(ErrorCategory::Unknown),
        }
    }

    /// Classify a transport-level error message (no HTTP status available)
    pub fn from_transport(message: impl Into<String>, service: &str) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        let category = if lower.contains("timeout") || lower.contains("timed out") {
            ErrorCategory::Network
        } else if lower.contains("connect") || lower.contains("dns") || lower.contains("network")
        {
            ErrorCategory::Network
        } else if lower.contains("unauthorized") || lower.contains("forbidden") {
            ErrorCategory::Auth
        } else {
            ErrorCategory::Unknown
        };

        Self::new(category, message).service(service)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum TicketError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // -------------------------------------------------------------------------
    // Configuration and Input Errors (fatal, surfaced unchanged)
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unsupported export format '{extension}': expected csv, tsv, or json")]
    UnsupportedFormat { extension: String },

    #[error("Export file not found: {0}")]
    FileNotFound(PathBuf),

    // -------------------------------------------------------------------------
    // Upstream Errors (recoverable via fallback)
    // -------------------------------------------------------------------------
    /// Structured upstream error with category and retry hints
    #[error("Upstream request failed: {0}")]
    Upstream(UpstreamError),

    // -------------------------------------------------------------------------
    // Output Errors
    // -------------------------------------------------------------------------
    #[error("Report error: {0}")]
    Report(String),
}

impl From<UpstreamError> for TicketError {
    fn from(err: UpstreamError) -> Self {
        TicketError::Upstream(err)
    }
}

impl TicketError {
    /// Create an upstream error with category and service context
    pub fn upstream(
        category: ErrorCategory,
        message: impl Into<String>,
        service: &str,
    ) -> Self {
        Self::Upstream(UpstreamError::new(category, message).service(service))
    }

    /// Check if this error can be absorbed by falling back to the
    /// deterministic pattern detector
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}

pub type Result<T> = std::result::Result<T, TicketError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::Transient.to_string(), "TRANSIENT");
    }

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::RateLimit.is_retryable());
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Transient.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::BadRequest.is_retryable());
        assert!(!ErrorCategory::Unavailable.is_retryable());
    }

    #[test]
    fn test_from_http_status() {
        let rate_limit = UpstreamError::from_http_status(429, "Rate limited", "servicenow");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);
        assert!(rate_limit.is_retryable());

        let auth = UpstreamError::from_http_status(401, "Unauthorized", "jira");
        assert_eq!(auth.category, ErrorCategory::Auth);
        assert!(!auth.is_retryable());

        let server = UpstreamError::from_http_status(503, "Service unavailable", "openai");
        assert_eq!(server.category, ErrorCategory::Transient);
        assert!(server.is_retryable());
    }

    #[test]
    fn test_from_transport() {
        let timeout = UpstreamError::from_transport("request timed out after 30s", "jira");
        assert_eq!(timeout.category, ErrorCategory::Network);

        let connect = UpstreamError::from_transport("failed to connect to host", "ollama");
        assert_eq!(connect.category, ErrorCategory::Network);

        let unknown = UpstreamError::from_transport("something odd happened", "openai");
        assert_eq!(unknown.category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_upstream_error_display() {
        let err = UpstreamError::new(ErrorCategory::RateLimit, "Too many requests")
            .service("servicenow");
        assert_eq!(err.to_string(), "[servicenow:RATE_LIMIT] Too many requests");

        let bare = UpstreamError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(bare.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_recommended_delay() {
        let rate_limit = UpstreamError::new(ErrorCategory::RateLimit, "test");
        assert!(rate_limit.recommended_delay() >= Duration::from_secs(30));

        let custom = UpstreamError::new(ErrorCategory::Unknown, "test")
            .retry_after(Duration::from_secs(100));
        assert_eq!(custom.recommended_delay(), Duration::from_secs(100));
    }

    #[test]
    fn test_recoverable_errors() {
        let upstream: TicketError =
            UpstreamError::new(ErrorCategory::Unavailable, "down").into();
        assert!(upstream.is_recoverable());

        let config = TicketError::Config("missing instance URL".to_string());
        assert!(!config.is_recoverable());

        let missing = TicketError::FileNotFound(PathBuf::from("/tmp/nope.csv"));
        assert!(!missing.is_recoverable());
    }
}
