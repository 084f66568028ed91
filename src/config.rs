use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::RiskLevel;

/// Root configuration structure, deserialized from `.risk-radar/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and how to reach the analysis service.
    pub service: ServiceConfig,
    /// Report truncation limits.
    pub display: DisplayConfig,
    /// Exit-code policy.
    pub policy: PolicyConfig,
}

/// Connection settings handed to [`crate::client::AnalysisClient`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Scheme, host and port of the service, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Path of the text analysis endpoint.
    pub text_endpoint: String,
    /// Path of the URL analysis endpoint.
    pub url_endpoint: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            text_endpoint: "/api/analyze-text".to_string(),
            url_endpoint: "/api/analyze-url".to_string(),
        }
    }
}

/// How much of each section the terminal report shows. `--verbose` lifts all limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Example sentences shown per risk item.
    pub max_instances: usize,
    /// Entries shown per entity list.
    pub max_entities: usize,
    /// Network links listed.
    pub max_links: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_instances: 3,
            max_entities: 10,
            max_links: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Exit with code 1 when the overall level is at or above this.
    pub fail_on: Option<RiskLevel>,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.risk-radar/config.toml`
/// 3. `~/.config/risk-radar/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".risk-radar").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("risk-radar").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}
