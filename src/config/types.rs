//! Configuration Types
//!
//! All configuration structures with sensible defaults. The configuration
//! is assembled once at the process boundary and passed down as plain
//! parameters; the analysis core never reads environment state directly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::ProviderConfig;
use crate::constants::{detector::DEFAULT_MIN_OCCURRENCES, import::DEFAULT_MONTHS_BACK};
use crate::source::jira::JiraConfig;
use crate::source::servicenow::ServiceNowConfig;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Ticket source settings
    pub source: SourceConfig,

    /// Analysis tuning
    pub analysis: AnalysisConfig,

    /// Completion provider settings
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            source: SourceConfig::default(),
            analysis: AnalysisConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `TicketError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.analysis.months_back == 0 {
            return Err(crate::types::TicketError::Config(
                "analysis.months_back must be greater than 0".to_string(),
            ));
        }

        if self.analysis.min_occurrences == 0 {
            return Err(crate::types::TicketError::Config(
                "analysis.min_occurrences must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::TicketError::Config(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(crate::types::TicketError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Source Configuration
// =============================================================================

/// Which backend supplies tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    ServiceNow,
    Jira,
    #[default]
    Export,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceNow => write!(f, "servicenow"),
            Self::Jira => write!(f, "jira"),
            Self::Export => write!(f, "export"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "servicenow" => Ok(Self::ServiceNow),
            "jira" => Ok(Self::Jira),
            "export" | "file" => Ok(Self::Export),
            _ => Err(format!(
                "Unknown backend: {}. Valid values: servicenow, jira, export",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub backend: BackendKind,
    pub servicenow: ServiceNowConfig,
    pub jira: JiraConfig,
    /// Export file path for the `export` backend
    pub export_path: Option<PathBuf>,
    /// HTTP timeout for backend requests
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            servicenow: ServiceNowConfig::default(),
            jira: JiraConfig::default(),
            export_path: None,
            request_timeout_secs: 30,
        }
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Age cutoff: tickets opened more than this many months ago are
    /// excluded (inclusive boundary; unparseable dates are never excluded)
    pub months_back: u32,
    /// Minimum group size for an emitted pattern
    pub min_occurrences: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            months_back: DEFAULT_MONTHS_BACK,
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// Provider settings plus the AI-skip switch
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// When true, skip AI entirely and use the basic detector
    pub skip_ai: bool,

    #[serde(flatten)]
    pub provider: ProviderConfig,
}

// Convenience accessors used by validation
impl std::ops::Deref for LlmConfig {
    type Target = ProviderConfig;

    fn deref(&self) -> &Self::Target {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_months() {
        let mut config = Config::default();
        config.analysis.months_back = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_temperature() {
        let mut config = Config::default();
        config.llm.provider.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("servicenow".parse::<BackendKind>().unwrap(), BackendKind::ServiceNow);
        assert_eq!("JIRA".parse::<BackendKind>().unwrap(), BackendKind::Jira);
        assert_eq!("file".parse::<BackendKind>().unwrap(), BackendKind::Export);
        assert!("asana".parse::<BackendKind>().is_err());
    }
}
