//! Community Graph
//!
//! Imports StackExchange activity into a Neo4j graph:
//! - pages through the `/search` endpoint for a tag set and date range
//! - merges Questions, Answers, Accounts and Tags by key, so re-runs are safe
//! - honors the API's quota and backoff signals between requests

pub mod importer;
pub mod neo4j;
pub mod stackexchange;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::Result;
use importer::{ImporterSettings, PacingPolicy};
use neo4j::SiteLabel;
use serde::Deserialize;
use stackexchange::ApiSettings;
use std::path::Path;
use std::time::Duration;

/// Response filter that includes answers, owners and vote counts on `/search`
pub const DEFAULT_FILTER: &str = "!5-i6Zw8Y)4W7vpy91PMYsKM-k9yzEsSC1_Uxlf";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub neo4j: Neo4jYamlConfig,
    pub stackexchange: StackExchangeYamlConfig,
    pub import: ImportYamlConfig,
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "neo4j".into(),
        }
    }
}

/// StackExchange API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackExchangeYamlConfig {
    pub api_url: String,
    pub site: String,
    pub key: String,
    pub filter: String,
    pub page_size: u32,
}

impl Default for StackExchangeYamlConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.stackexchange.com/2.2".into(),
            site: "stackoverflow".into(),
            key: String::new(),
            filter: DEFAULT_FILTER.into(),
            page_size: 100,
        }
    }
}

/// Import behavior section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportYamlConfig {
    /// Label added to every imported node
    pub site_label: String,
    pub quota_pause_secs: u64,
    pub backoff_padding_secs: u64,
    pub ensure_constraints: bool,
}

impl Default for ImportYamlConfig {
    fn default() -> Self {
        Self {
            site_label: "StackOverflow".into(),
            quota_pause_secs: 10,
            backoff_padding_secs: 5,
            ensure_constraints: true,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub api_url: String,
    pub site: String,
    pub api_key: String,
    pub filter: String,
    pub page_size: u32,
    pub site_label: String,
    pub quota_pause_secs: u64,
    pub backoff_padding_secs: u64,
    pub ensure_constraints: bool,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            api_url: std::env::var("STACKEXCHANGE_API_URL").unwrap_or(yaml.stackexchange.api_url),
            site: std::env::var("STACKEXCHANGE_SITE").unwrap_or(yaml.stackexchange.site),
            api_key: std::env::var("STACKEXCHANGE_KEY").unwrap_or(yaml.stackexchange.key),
            filter: yaml.stackexchange.filter,
            page_size: yaml.stackexchange.page_size,
            site_label: yaml.import.site_label,
            quota_pause_secs: yaml.import.quota_pause_secs,
            backoff_padding_secs: yaml.import.backoff_padding_secs,
            ensure_constraints: yaml.import.ensure_constraints,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            api_url: self.api_url.clone(),
            site: self.site.clone(),
            key: self.api_key.clone(),
            filter: self.filter.clone(),
        }
    }

    /// Validated importer settings. Fails if the site label is not a usable
    /// graph label.
    pub fn importer_settings(&self) -> Result<ImporterSettings> {
        Ok(ImporterSettings {
            page_size: self.page_size.clamp(1, 100),
            site_label: SiteLabel::new(self.site_label.clone())?,
            pacing: PacingPolicy {
                quota_pause: Duration::from_secs(self.quota_pause_secs),
                backoff_padding: Duration::from_secs(self.backoff_padding_secs),
            },
            ensure_constraints: self.ensure_constraints,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
