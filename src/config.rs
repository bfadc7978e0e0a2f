//! Configuration management module.
//!
//! Configuration is loaded from layered sources, later ones overriding
//! earlier ones:
//! - Global config file (`~/.config/modelhub/modelhub.json`)
//! - Project config file (`./modelhub.json` or `./modelhub.jsonc`)
//! - Environment variables (`MODELHUB_API_URL`, `MODELHUB_THEME`)
//!
//! Config files may contain comments and trailing commas (JSONC).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::api::types::ModelParameters;

/// Default gateway address when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// JSON schema reference
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Base URL of the gateway REST API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Theme name ("dark" or "light")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Operator name shown in the header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Log level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Default chat parameters applied when no preset is selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ModelParameters>,
}

impl Config {
    /// Load configuration from all sources
    pub async fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(global_path) = Self::global_config_path() {
            if let Some(global_config) = Self::load_file(&global_path).await? {
                config = config.merge(global_config);
            }
        }

        if let Some(project_path) = Self::find_project_config() {
            if let Some(project_config) = Self::load_file(&project_path).await? {
                config = config.merge(project_config);
            }
        }

        Ok(config.apply_env_overrides())
    }

    /// Get the global config directory path
    pub fn global_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("modelhub"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|p| p.join("modelhub.json"))
    }

    /// Find a project config file in the current directory
    fn find_project_config() -> Option<PathBuf> {
        for filename in &["modelhub.jsonc", "modelhub.json"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Load a single config file, tolerating comments and trailing commas
    async fn load_file(path: &Path) -> Result<Option<Config>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Some(Config::default()));
        }

        let value = jsonc_parser::parse_to_serde_value(&content, &Default::default())
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        let Some(value) = value else {
            return Ok(Some(Config::default()));
        };

        let config: Config = serde_json::from_value(value)
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(Some(config))
    }

    /// Merge another config into this one; `other` wins where set
    pub fn merge(mut self, other: Config) -> Self {
        if other.schema.is_some() {
            self.schema = other.schema;
        }
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.theme.is_some() {
            self.theme = other.theme;
        }
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.parameters.is_some() {
            self.parameters = other.parameters;
        }
        self
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("MODELHUB_API_URL") {
            self.api_url = Some(url);
        }
        if let Ok(theme) = std::env::var("MODELHUB_THEME") {
            self.theme = Some(theme);
        }
        if let Ok(log_level) = std::env::var("MODELHUB_LOG_LEVEL") {
            self.log_level = Some(log_level);
        }
        self
    }

    /// The effective gateway base URL
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Get the effective username
    pub fn get_username(&self) -> String {
        self.username
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "operator".to_string())
    }

    /// Create a default config file if it doesn't exist
    pub async fn init() -> Result<PathBuf> {
        let config_dir = Self::global_config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        fs::create_dir_all(&config_dir)
            .await
            .context("Failed to create config directory")?;

        let config_path = config_dir.join("modelhub.json");

        if !config_path.exists() {
            let default_config = Config {
                api_url: Some(DEFAULT_API_URL.to_string()),
                theme: Some("dark".to_string()),
                log_level: Some("info".to_string()),
                ..Default::default()
            };
            let json = serde_json::to_string_pretty(&default_config)?;
            fs::write(&config_path, json)
                .await
                .context("Failed to write default config")?;
        }

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_configs() {
        let base = Config {
            api_url: Some("http://localhost:8000".to_string()),
            theme: Some("dark".to_string()),
            ..Default::default()
        };
        let project = Config {
            theme: Some("light".to_string()),
            username: Some("ops".to_string()),
            ..Default::default()
        };

        let merged = base.merge(project);
        assert_eq!(merged.api_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(merged.theme.as_deref(), Some("light"));
        assert_eq!(merged.username.as_deref(), Some("ops"));
    }

    #[test]
    fn test_default_api_url() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }
}
