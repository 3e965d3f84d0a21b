//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/ticketlens/config.toml)
//! 3. Project config (./ticketlens.toml)
//! 4. Environment variables (TICKETLENS_* prefix, `__` separating levels)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, TicketError};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // TICKETLENS_LLM__API_KEY -> llm.api_key; double underscore keeps
        // snake_case keys like months_back intact
        figment = figment.merge(Env::prefixed("TICKETLENS_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| TicketError::Config(format!("Configuration error: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| TicketError::Config(format!("Configuration error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to the global config directory
    pub fn global_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ticketlens")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to the project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("ticketlens.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "present" } else { "absent" };
            println!("  Global:  {} ({})", global.display(), exists);
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "present" } else { "absent" };
        println!("  Project: {} ({})", project.display(), exists);
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config)
                    .map_err(|e| TicketError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a default project config, refusing to clobber without `force`
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let path = Self::project_config_path();
        if path.exists() && !force {
            return Err(TicketError::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        fs::write(&path, Self::default_project_config())?;
        info!("Created project config: {}", path.display());
        Ok(path)
    }

    /// Generate default project config content (TOML)
    fn default_project_config() -> String {
        r#"# ticketlens Project Configuration
# Settings here override global defaults; TICKETLENS_* env vars override both.

version = "1.0"

[source]
# servicenow | jira | export
backend = "export"
# export_path = "tickets.csv"

[source.servicenow]
# instance_url = "https://corp.service-now.com"
# username = "svc-reporting"
# api_token set via TICKETLENS_SOURCE__SERVICENOW__API_TOKEN

[source.jira]
# base_url = "https://corp.atlassian.net"
# email = "svc-reporting@corp.example"
# project = "OPS"

[analysis]
months_back = 6
min_occurrences = 3

[llm]
skip_ai = false
provider = "openai"
# model = "gpt-4o-mini"
# api_key set via TICKETLENS_LLM__API_KEY
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let config = ConfigLoader::load_from_file(Path::new("/nonexistent/ticketlens.toml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.analysis.months_back, 6);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketlens.toml");
        std::fs::write(
            &path,
            "[analysis]\nmonths_back = 12\nmin_occurrences = 5\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.analysis.months_back, 12);
        assert_eq!(config.analysis.min_occurrences, 5);
    }

    #[test]
    fn test_load_from_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketlens.toml");
        std::fs::write(&path, "[analysis]\nmonths_back = 0\n").unwrap();

        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_default_project_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketlens.toml");
        std::fs::write(&path, ConfigLoader::default_project_config()).unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.analysis.min_occurrences, 3);
        assert!(!config.llm.skip_ai);
    }
}
