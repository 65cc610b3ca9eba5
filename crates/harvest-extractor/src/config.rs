//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Documents longer than this (chars) take the chunked path; also the chunk size
    pub max_chunk_chars: usize,

    /// Chars shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Minimum relevance score a chunk needs to be attempted
    pub relevance_floor: f64,

    /// Sampling temperature for extraction calls
    pub temperature: f32,

    /// Token budget for extraction calls
    pub max_tokens: u32,

    /// Split oversized documents instead of truncating them
    pub smart_chunking: bool,

    /// Sampling temperature for free-form analysis
    pub analysis_temperature: f32,

    /// Token budget for free-form analysis
    pub analysis_max_tokens: u32,
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_chunk_chars: 15_000,
            chunk_overlap: 1_000,
            relevance_floor: 0.4,
            temperature: 0.2,
            max_tokens: 4096,
            smart_chunking: true,
            analysis_temperature: 0.7,
            analysis_max_tokens: 2048,
        }
    }
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_chunk_chars == 0 {
            return Err(ExtractorError::Config("max_chunk_chars must be greater than 0".to_string()));
        }
        if self.chunk_overlap >= self.max_chunk_chars {
            return Err(ExtractorError::InvalidChunking {
                size: self.max_chunk_chars,
                overlap: self.chunk_overlap,
            });
        }
        if !(0.0..=1.0).contains(&self.relevance_floor) {
            return Err(ExtractorError::Config("relevance_floor must be within [0, 1]".to_string()));
        }
        if self.temperature < 0.0 || self.analysis_temperature < 0.0 {
            return Err(ExtractorError::Config("temperature cannot be negative".to_string()));
        }
        if self.max_tokens == 0 || self.analysis_max_tokens == 0 {
            return Err(ExtractorError::Config("max_tokens must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Fast preset: smaller windows, fewer tokens, stricter floor
    pub fn fast() -> Self {
        Self {
            max_chunk_chars: 8_000,
            chunk_overlap: 500,
            relevance_floor: 0.5,
            max_tokens: 2048,
            ..Self::default()
        }
    }

    /// Thorough preset: larger windows, more overlap, lower floor
    pub fn thorough() -> Self {
        Self {
            max_chunk_chars: 24_000,
            chunk_overlap: 2_000,
            relevance_floor: 0.25,
            temperature: 0.1,
            max_tokens: 8192,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
        assert!(ExtractorConfig::fast().validate().is_ok());
        assert!(ExtractorConfig::thorough().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let config = ExtractorConfig {
            chunk_overlap: 15_000,
            ..ExtractorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ExtractorError::InvalidChunking { size: 15_000, overlap: 15_000 })
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ExtractorConfig::default();
        config.max_chunk_chars = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.relevance_floor = 1.5;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.temperature = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::thorough();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("max_chunk_chars = 5000\nchunk_overlap = 200\n").unwrap();
        assert_eq!(parsed.max_chunk_chars, 5000);
        assert_eq!(parsed.relevance_floor, 0.4);
        assert!(parsed.smart_chunking);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(ExtractorConfig::from_toml("chunk_overlap = 20000").is_err());
    }
}
