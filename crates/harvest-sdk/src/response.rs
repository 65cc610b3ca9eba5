//! Scrape options and results

use harvest_domain::ExtractionResult;
use harvest_fetch::FetchOptions;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fmt;
use std::path::PathBuf;

/// Which fetcher produced the HTML behind a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionStrategy {
    /// Plain HTTP
    Phantom,
    /// Headless browser
    Browser,
}

impl fmt::Display for AcquisitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionStrategy::Phantom => write!(f, "phantom"),
            AcquisitionStrategy::Browser => write!(f, "browser"),
        }
    }
}

/// Options for [`Harvester::scrape`](crate::Harvester::scrape)
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Free-text guidance for the model
    pub instructions: Option<String>,
    /// Skip HTTP and render with the browser
    pub use_browser: bool,
    /// Fall back to the browser when HTTP output looks unrendered
    pub auto_fallback: bool,
    /// Write the HTML that was extracted from to this path
    pub save_html: Option<PathBuf>,
    /// Per-request acquisition options
    pub fetch: FetchOptions,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            instructions: None,
            use_browser: false,
            auto_fallback: true,
            save_html: None,
            fetch: FetchOptions::default(),
        }
    }
}

impl ScrapeOptions {
    /// Set free-text instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Always use the browser
    pub fn with_browser(mut self) -> Self {
        self.use_browser = true;
        self
    }

    /// Never fall back to the browser
    pub fn without_fallback(mut self) -> Self {
        self.auto_fallback = false;
        self
    }

    /// Save the HTML to `path`
    pub fn with_save_html(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_html = Some(path.into());
        self
    }

    /// Use `fetch` for acquisition
    pub fn with_fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }
}

/// A validated record and how its page was acquired
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeResponse {
    record: ExtractionResult,
    strategy: AcquisitionStrategy,
}

impl ScrapeResponse {
    pub(crate) fn new(record: ExtractionResult, strategy: AcquisitionStrategy) -> Self {
        Self { record, strategy }
    }

    /// The extracted record
    pub fn record(&self) -> &ExtractionResult {
        &self.record
    }

    /// Take the record
    pub fn into_record(self) -> ExtractionResult {
        self.record
    }

    /// Fetcher that produced the HTML
    pub fn strategy(&self) -> AcquisitionStrategy {
        self.strategy
    }

    /// Record as JSON indented by `indent` spaces
    pub fn to_json(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(pad.as_bytes()));

        match self.record.serialize(&mut serializer) {
            Ok(()) => String::from_utf8(out).unwrap_or_default(),
            Err(_) => String::new(),
        }
    }
}

impl fmt::Display for ScrapeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn response() -> ScrapeResponse {
        let Value::Object(map) = json!({"title": "Rust", "points": 42}) else {
            unreachable!()
        };
        ScrapeResponse::new(ExtractionResult::from_validated(map), AcquisitionStrategy::Phantom)
    }

    #[test]
    fn test_to_json_indent() {
        let text = response().to_json(4);
        assert_eq!(text, "{\n    \"title\": \"Rust\",\n    \"points\": 42\n}");
    }

    #[test]
    fn test_display_is_pretty_json() {
        let text = response().to_string();
        assert!(text.starts_with("{\n  \"title\""));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["points"], 42);
    }

    #[test]
    fn test_default_options() {
        let options = ScrapeOptions::default();
        assert!(options.auto_fallback);
        assert!(!options.use_browser);
        assert!(options.save_html.is_none());
    }
}
