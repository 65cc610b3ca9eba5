//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use harvest_extractor::ExtractorConfig;
use harvest_gatekeeper::ValidationConfig;
use harvest_llm::OllamaProvider;
use harvest_sdk::{AcquisitionConfig, HarvesterConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model settings
    pub llm: LlmSettings,

    /// Extraction engine settings
    pub extractor: ExtractorConfig,

    /// Page acquisition settings
    pub fetch: AcquisitionConfig,

    /// Record validation rules
    pub validation: ValidationConfig,
}

/// Ollama connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per request
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            timeout_secs: 120,
            max_retries: 3,
        }
    }
}

impl Config {
    /// Default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| CliError::Config("Could not find config directory".into()))?;
        Ok(dir.join("harvest").join("config.toml"))
    }

    /// Load configuration from `path`, or defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Configuration as TOML text.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<()> {
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("llm.model must not be empty".into()));
        }
        Ok(())
    }

    /// Ollama provider for the configured model.
    pub fn provider(&self) -> OllamaProvider {
        OllamaProvider::new(self.llm.endpoint.as_str(), self.llm.model.as_str())
            .with_timeout(Duration::from_secs(self.llm.timeout_secs))
            .with_max_retries(self.llm.max_retries)
    }

    /// Settings for the harvester.
    pub fn harvester(&self) -> HarvesterConfig {
        HarvesterConfig {
            acquisition: self.fetch.clone(),
            extractor: self.extractor.clone(),
            validation: self.validation.clone(),
        }
    }
}
