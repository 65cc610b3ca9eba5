//! Harvester implementation.

use crate::config::HarvesterConfig;
use crate::error::SdkError;
use crate::response::{AcquisitionStrategy, ScrapeOptions, ScrapeResponse};
use harvest_domain::text::char_len;
use harvest_domain::{ExtractionResult, LlmProvider, Schema};
use harvest_extractor::{is_empty, ExtractionRequest, Extractor};
use harvest_fetch::{
    BrowserFetcher, FetchOptions, Fetcher, InteractiveFetcher, Interaction, PhantomFetcher, UserAgentPool,
};
use harvest_gatekeeper::Gatekeeper;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// HTTP responses shorter than this are assumed to need rendering
pub const MIN_RENDERED_HTML_CHARS: usize = 500;

/// Fetches pages and extracts schema-shaped records from them
///
/// Pages are fetched over plain HTTP first and re-fetched in a headless
/// browser when the HTTP result looks like an unrendered JavaScript shell.
pub struct Harvester<L>
where
    L: LlmProvider,
{
    extractor: Extractor<L>,
    phantom: Arc<dyn Fetcher>,
    browser: Arc<dyn InteractiveFetcher>,
    agents: Arc<UserAgentPool>,
}

impl<L> Harvester<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a harvester backed by `llm_provider`
    ///
    /// # Errors
    ///
    /// Fails when the extractor settings are inconsistent or the HTTP client
    /// cannot be built.
    pub fn new(llm_provider: L, config: HarvesterConfig) -> Result<Self, SdkError> {
        config.extractor.validate()?;

        let acquisition = config.acquisition;
        let agents = Arc::new(UserAgentPool::new(acquisition.prefer_desktop, acquisition.sticky_agent));
        let phantom = PhantomFetcher::new(Arc::clone(&agents), &acquisition.phantom)?;
        let browser = BrowserFetcher::new(Arc::clone(&agents), acquisition.browser);
        let extractor = Extractor::new(llm_provider, Gatekeeper::new(config.validation), config.extractor);

        Ok(Self::with_fetchers(extractor, Arc::new(phantom), Arc::new(browser), agents))
    }

    /// Assemble a harvester from existing parts
    pub fn with_fetchers(
        extractor: Extractor<L>,
        phantom: Arc<dyn Fetcher>,
        browser: Arc<dyn InteractiveFetcher>,
        agents: Arc<UserAgentPool>,
    ) -> Self {
        Self {
            extractor,
            phantom,
            browser,
            agents,
        }
    }

    /// The extraction engine
    pub fn extractor(&self) -> &Extractor<L> {
        &self.extractor
    }

    /// Fetch `url` and extract a record, falling back to the browser as needed
    ///
    /// With `auto_fallback`, the browser is used when the HTTP fetch fails,
    /// returns fewer than [`MIN_RENDERED_HTML_CHARS`] chars or has no
    /// `<body`, and again when an HTTP-sourced extraction comes back empty.
    pub async fn scrape(&self, url: &str, schema: &Schema, options: &ScrapeOptions) -> Result<ScrapeResponse, SdkError> {
        let (html, strategy) = self.acquire(url, options).await?;
        save_html(options.save_html.as_deref(), &html).await?;

        let instructions = options.instructions.as_deref();
        let record = self.extract_from_html(&html, schema, instructions).await?;

        if options.auto_fallback && strategy == AcquisitionStrategy::Phantom && is_empty(&record) {
            warn!(url = %url, "Extraction came back empty, refetching with the browser");
            let html = self.browser.fetch(url, &options.fetch).await?;
            save_html(options.save_html.as_deref(), &html).await?;

            let record = self.extract_from_html(&html, schema, instructions).await?;
            return Ok(ScrapeResponse::new(record, AcquisitionStrategy::Browser));
        }

        Ok(ScrapeResponse::new(record, strategy))
    }

    /// Fetch over HTTP only and extract
    pub async fn scrape_with_phantom(
        &self,
        url: &str,
        schema: &Schema,
        instructions: Option<&str>,
        fetch: &FetchOptions,
    ) -> Result<ExtractionResult, SdkError> {
        let html = self.phantom.fetch(url, fetch).await?;
        self.extract_from_html(&html, schema, instructions).await
    }

    /// Render in the browser and extract
    pub async fn scrape_with_browser(
        &self,
        url: &str,
        schema: &Schema,
        instructions: Option<&str>,
        fetch: &FetchOptions,
    ) -> Result<ExtractionResult, SdkError> {
        let html = self.browser.fetch(url, fetch).await?;
        self.extract_from_html(&html, schema, instructions).await
    }

    /// Drive the page through `interactions` in the browser, then extract
    pub async fn scrape_with_interaction(
        &self,
        url: &str,
        schema: &Schema,
        interactions: &[Interaction],
        instructions: Option<&str>,
    ) -> Result<ExtractionResult, SdkError> {
        let html = self
            .browser
            .fetch_with_interaction(url, interactions, &FetchOptions::default())
            .await?;
        self.extract_from_html(&html, schema, instructions).await
    }

    /// Scrape each URL in turn; failures are logged and yield `None`
    pub async fn scrape_many<S>(&self, urls: &[S], schema: &Schema, options: &ScrapeOptions) -> Vec<Option<ScrapeResponse>>
    where
        S: AsRef<str>,
    {
        let mut results = Vec::with_capacity(urls.len());

        for (idx, url) in urls.iter().enumerate() {
            let url = url.as_ref();
            info!(url = %url, "Scraping {}/{}", idx + 1, urls.len());

            match self.scrape(url, schema, options).await {
                Ok(response) => results.push(Some(response)),
                Err(e) => {
                    error!(url = %url, error = %e, "Scrape failed");
                    results.push(None);
                }
            }
        }

        results
    }

    /// Raw HTML without extraction
    pub async fn fetch_html(&self, url: &str, use_browser: bool, fetch: &FetchOptions) -> Result<String, SdkError> {
        let html = if use_browser {
            self.browser.fetch(url, fetch).await?
        } else {
            self.phantom.fetch(url, fetch).await?
        };
        Ok(html)
    }

    /// Extract from HTML fetched elsewhere
    pub async fn extract_from_html(
        &self,
        html: &str,
        schema: &Schema,
        instructions: Option<&str>,
    ) -> Result<ExtractionResult, SdkError> {
        let mut request = ExtractionRequest::new(html);
        request.instructions = instructions.map(str::to_string);
        Ok(self.extractor.extract(schema, &request).await?)
    }

    /// Free-form question about `html`; returns the model's raw answer
    pub async fn analyze_html(&self, html: &str, prompt: &str, temperature: Option<f32>) -> Result<String, SdkError> {
        Ok(self.extractor.analyze(html, prompt, temperature, None).await?)
    }

    /// Switch to the next user agent and return it
    pub fn rotate_agent(&self) -> String {
        self.agents.rotate()
    }

    /// User agent currently selected
    pub fn current_agent(&self) -> String {
        self.agents.current()
    }

    async fn acquire(&self, url: &str, options: &ScrapeOptions) -> Result<(String, AcquisitionStrategy), SdkError> {
        if options.use_browser {
            let html = self.browser.fetch(url, &options.fetch).await?;
            return Ok((html, AcquisitionStrategy::Browser));
        }

        if !options.auto_fallback {
            let html = self.phantom.fetch(url, &options.fetch).await?;
            return Ok((html, AcquisitionStrategy::Phantom));
        }

        match self.phantom.fetch(url, &options.fetch).await {
            Ok(html) if looks_rendered(&html) => return Ok((html, AcquisitionStrategy::Phantom)),
            Ok(html) => warn!(
                url = %url,
                chars = char_len(&html),
                "HTTP response looks unrendered, refetching with the browser"
            ),
            Err(e) => warn!(url = %url, error = %e, "HTTP fetch failed, refetching with the browser"),
        }

        let html = self.browser.fetch(url, &options.fetch).await?;
        Ok((html, AcquisitionStrategy::Browser))
    }
}

fn looks_rendered(html: &str) -> bool {
    char_len(html) >= MIN_RENDERED_HTML_CHARS && html.to_lowercase().contains("<body")
}

async fn save_html(path: Option<&Path>, html: &str) -> Result<(), SdkError> {
    let Some(path) = path else {
        return Ok(());
    };

    tokio::fs::write(path, html).await.map_err(|source| SdkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), chars = char_len(html), "Saved HTML");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_rendered() {
        let filler = "x".repeat(MIN_RENDERED_HTML_CHARS);
        assert!(looks_rendered(&format!("<html><BODY>{}</BODY></html>", filler)));
        assert!(!looks_rendered("<html><body>short</body></html>"));
        assert!(!looks_rendered(&format!("<html><div>{}</div></html>", filler)));
    }

    #[test]
    fn test_threshold_counts_chars() {
        let html = format!("<body>{}", "é".repeat(MIN_RENDERED_HTML_CHARS - 6));
        assert_eq!(char_len(&html), MIN_RENDERED_HTML_CHARS);
        assert!(looks_rendered(&html));
    }
}
