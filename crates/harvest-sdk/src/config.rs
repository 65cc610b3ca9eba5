//! Harvester configuration

use harvest_extractor::ExtractorConfig;
use harvest_fetch::{BrowserSettings, PhantomConfig};
use harvest_gatekeeper::ValidationConfig;
use serde::{Deserialize, Serialize};

/// How pages are acquired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Draw user agents from the desktop set instead of the mobile one
    pub prefer_desktop: bool,
    /// Keep one user agent until it is rotated explicitly
    pub sticky_agent: bool,
    /// HTTP client settings
    pub phantom: PhantomConfig,
    /// Browser launch settings
    pub browser: BrowserSettings,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            prefer_desktop: true,
            sticky_agent: false,
            phantom: PhantomConfig::default(),
            browser: BrowserSettings::default(),
        }
    }
}

/// Everything a [`Harvester`](crate::Harvester) needs besides the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    /// Page acquisition
    pub acquisition: AcquisitionConfig,
    /// Extraction engine
    pub extractor: ExtractorConfig,
    /// Record validation
    pub validation: ValidationConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarvesterConfig::default();
        assert!(config.acquisition.prefer_desktop);
        assert!(!config.acquisition.sticky_agent);
        assert!(config.acquisition.browser.headless);
        assert_eq!(config.extractor, ExtractorConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config: HarvesterConfig = toml::from_str(
            r#"
            [acquisition]
            sticky_agent = true

            [acquisition.phantom]
            verify_ssl = false

            [extractor]
            relevance_floor = 0.25
            "#,
        )
        .unwrap();

        assert!(config.acquisition.sticky_agent);
        assert!(config.acquisition.prefer_desktop);
        assert!(!config.acquisition.phantom.verify_ssl);
        assert_eq!(config.extractor.relevance_floor, 0.25);
        assert_eq!(config.extractor.max_chunk_chars, 15_000);
    }
}
