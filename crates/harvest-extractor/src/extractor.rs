//! Core Extractor implementation

use crate::chunking::{Chunk, ChunkSplitter};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::keywords::KeywordSet;
use crate::parser::parse_response;
use crate::prompt::{analysis_prompt, PromptBuilder};
use crate::scoring::{data_density, score};
use harvest_domain::text::{char_len, truncate_chars};
use harvest_domain::{ExtractionResult, GenerationOptions, LlmProvider, Prompt, Schema};
use harvest_gatekeeper::Gatekeeper;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Chars of HTML sent along with a free-form analysis prompt
pub const ANALYSIS_MAX_HTML_CHARS: usize = 15_000;

/// One document to extract from, with optional per-call overrides
///
/// Unset overrides fall back to the extractor's [`ExtractorConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    /// Raw HTML
    pub html: String,
    /// Free-text guidance passed to the model verbatim
    pub instructions: Option<String>,
    /// Override for [`ExtractorConfig::max_chunk_chars`]
    pub max_chunk_chars: Option<usize>,
    /// Override for [`ExtractorConfig::temperature`]
    pub temperature: Option<f32>,
    /// Override for [`ExtractorConfig::max_tokens`]
    pub max_tokens: Option<u32>,
    /// Override for [`ExtractorConfig::smart_chunking`]
    pub smart_chunking: Option<bool>,
}

impl ExtractionRequest {
    /// Request extraction from `html` with configured defaults
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    /// Set free-text instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Override the chunk size
    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = Some(max_chunk_chars);
        self
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Override the token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Enable or disable chunked extraction
    pub fn with_smart_chunking(mut self, smart_chunking: bool) -> Self {
        self.smart_chunking = Some(smart_chunking);
        self
    }
}

/// Resolved parameters for one extraction call
#[derive(Debug, Clone, Copy)]
struct Settings {
    max_chunk_chars: usize,
    chunk_overlap: usize,
    relevance_floor: f64,
    smart_chunking: bool,
    generation: GenerationOptions,
}

/// The Extractor turns HTML into schema-validated records using an LLM
///
/// Small documents take one model call. Oversized documents are split into
/// overlapping windows, ranked by keyword relevance, and every window above
/// the relevance floor is tried; the most populated valid record wins.
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    gatekeeper: Gatekeeper,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, gatekeeper: Gatekeeper, config: ExtractorConfig) -> Self {
        Self::from_shared(Arc::new(llm_provider), gatekeeper, config)
    }

    /// Create an Extractor over a provider shared with other components
    pub fn from_shared(llm_provider: Arc<L>, gatekeeper: Gatekeeper, config: ExtractorConfig) -> Self {
        Self {
            llm_provider,
            gatekeeper,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The underlying provider
    pub fn provider(&self) -> &Arc<L> {
        &self.llm_provider
    }

    /// Extract a record matching `schema` from the request's HTML
    ///
    /// # Errors
    ///
    /// - `Format` / `Validation` / `Llm` from the single call, or from the
    ///   final fallback call of the chunked path
    /// - `InvalidChunking` / `Config` when the effective settings are unusable
    pub async fn extract(
        &self,
        schema: &Schema,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractorError> {
        let settings = self.settings(request)?;
        let prompts = PromptBuilder::new(schema).with_instructions(request.instructions.as_deref());
        let html = request.html.as_str();
        let html_chars = char_len(html);

        if html_chars <= settings.max_chunk_chars || !settings.smart_chunking {
            info!(
                schema = schema.name(),
                html_chars,
                "Extracting from document in a single call"
            );
            let html = truncate_chars(html, settings.max_chunk_chars);
            return self.extract_single(html, schema, &prompts, settings.generation).await;
        }

        info!(
            schema = schema.name(),
            html_chars,
            max_chunk_chars = settings.max_chunk_chars,
            "Document exceeds chunk size, extracting by relevant chunks"
        );
        self.extract_chunked(html, schema, &prompts, &settings).await
    }

    /// Extract from several documents in order, stopping at the first failure
    pub async fn extract_batch<S>(
        &self,
        schema: &Schema,
        documents: &[S],
        instructions: Option<&str>,
    ) -> Result<Vec<ExtractionResult>, ExtractorError>
    where
        S: AsRef<str>,
    {
        let mut results = Vec::with_capacity(documents.len());

        for (idx, html) in documents.iter().enumerate() {
            debug!("Processing document {}/{}", idx + 1, documents.len());

            let mut request = ExtractionRequest::new(html.as_ref());
            request.instructions = instructions.map(str::to_string);
            results.push(self.extract(schema, &request).await?);
        }

        Ok(results)
    }

    /// Ask the model a free-form question about `html`; returns raw text
    ///
    /// The HTML is cut to [`ANALYSIS_MAX_HTML_CHARS`]; unset sampling
    /// parameters use the analysis defaults of the configuration.
    pub async fn analyze(
        &self,
        html: &str,
        request: &str,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<String, ExtractorError> {
        let options = GenerationOptions {
            temperature: temperature.unwrap_or(self.config.analysis_temperature),
            max_tokens: max_tokens.unwrap_or(self.config.analysis_max_tokens),
        };
        if options.temperature < 0.0 || options.max_tokens == 0 {
            return Err(ExtractorError::Config(
                "analysis needs a non-negative temperature and a positive token budget".to_string(),
            ));
        }

        let prompt = analysis_prompt(html, request, ANALYSIS_MAX_HTML_CHARS);
        info!(prompt_chars = prompt.len(), "Running analysis prompt");
        self.call_llm(prompt, options).await
    }

    fn settings(&self, request: &ExtractionRequest) -> Result<Settings, ExtractorError> {
        let settings = Settings {
            max_chunk_chars: request.max_chunk_chars.unwrap_or(self.config.max_chunk_chars),
            chunk_overlap: self.config.chunk_overlap,
            relevance_floor: self.config.relevance_floor,
            smart_chunking: request.smart_chunking.unwrap_or(self.config.smart_chunking),
            generation: GenerationOptions {
                temperature: request.temperature.unwrap_or(self.config.temperature),
                max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            },
        };

        // Overlap is checked by the splitter, only when a document is split
        if settings.max_chunk_chars == 0 {
            return Err(ExtractorError::Config("max_chunk_chars must be greater than 0".to_string()));
        }
        if settings.generation.temperature < 0.0 {
            return Err(ExtractorError::Config("temperature cannot be negative".to_string()));
        }
        if settings.generation.max_tokens == 0 {
            return Err(ExtractorError::Config("max_tokens must be greater than 0".to_string()));
        }

        Ok(settings)
    }

    /// One prompt, one model call, parse, validate
    async fn extract_single(
        &self,
        html: &str,
        schema: &Schema,
        prompts: &PromptBuilder,
        generation: GenerationOptions,
    ) -> Result<ExtractionResult, ExtractorError> {
        let prompt = prompts.build(html);
        debug!("Prompt length: {} chars", prompt.len());

        let response = self.call_llm(prompt, generation).await?;
        debug!("LLM response length: {} chars", response.len());

        let value = parse_response(&response)?;
        Ok(self.gatekeeper.validate(&value, schema)?)
    }

    async fn extract_chunked(
        &self,
        html: &str,
        schema: &Schema,
        prompts: &PromptBuilder,
        settings: &Settings,
    ) -> Result<ExtractionResult, ExtractorError> {
        let keywords = KeywordSet::from_schema(schema);
        let splitter = ChunkSplitter::new(settings.max_chunk_chars, settings.chunk_overlap)?;

        let mut ranked: Vec<(f64, Chunk<'_>)> = splitter
            .split(html)
            .into_iter()
            .map(|chunk| (score(chunk.text, &keywords), chunk))
            .collect();
        // Stable: equal scores keep document order.
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        info!(
            "Split document into {} chunks ({} keywords)",
            ranked.len(),
            keywords.len()
        );

        let mut best: Option<(usize, ExtractionResult)> = None;

        for (relevance, chunk) in &ranked {
            if *relevance < settings.relevance_floor {
                debug!(
                    chunk = chunk.index,
                    relevance,
                    "Remaining chunks fall below the relevance floor"
                );
                break;
            }

            debug!(chunk = chunk.index, start = chunk.start, relevance, "Extracting from chunk");

            match self.extract_single(chunk.text, schema, prompts, settings.generation).await {
                Ok(result) => {
                    let density = data_density(&result);
                    debug!(chunk = chunk.index, density, "Chunk produced a valid record");
                    if best.as_ref().is_none_or(|(best_density, _)| density > *best_density) {
                        best = Some((density, result));
                    }
                }
                Err(e) if e.is_chunk_local() => {
                    warn!(chunk = chunk.index, error = %e, "Chunk extraction failed, continuing");
                }
                Err(e) => return Err(e),
            }
        }

        if let Some((density, result)) = best {
            if density > 0 {
                info!(density, "Chunked extraction complete");
                return Ok(result);
            }
        }

        let top = ranked.first().map_or(html, |(_, chunk)| chunk.text);
        warn!("No chunk produced populated data, retrying on the top-ranked chunk");
        self.extract_single(top, schema, prompts, settings.generation).await
    }

    /// Call the LLM provider
    async fn call_llm(&self, prompt: Prompt, options: GenerationOptions) -> Result<String, ExtractorError> {
        let llm = Arc::clone(&self.llm_provider);

        // Call in a blocking context since LlmProvider is not async
        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt, &options)
                .map_err(|e| ExtractorError::Llm(e.to_string()))
        })
        .await
        .map_err(|e| ExtractorError::Llm(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_domain::{Field, FieldType};
    use harvest_gatekeeper::ValidationConfig;
    use harvest_llm::MockProvider;

    fn schema() -> Schema {
        Schema::builder("Page")
            .field(Field::required("title", FieldType::String))
            .build()
            .unwrap()
    }

    fn create_test_extractor(llm: MockProvider) -> Extractor<MockProvider> {
        Extractor::new(llm, Gatekeeper::new(ValidationConfig::default()), ExtractorConfig::default())
    }

    #[tokio::test]
    async fn test_single_call_for_small_document() {
        let llm = MockProvider::new("<json>{\"title\": \"Hello\"}</json>");
        let extractor = create_test_extractor(llm.clone());

        let result = extractor
            .extract(&schema(), &ExtractionRequest::new("<h1>Hello</h1>"))
            .await
            .unwrap();

        assert_eq!(result.get("title").unwrap(), "Hello");
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_chunking_truncates() {
        let llm = MockProvider::new("<json>{\"title\": \"t\"}</json>");
        let extractor = create_test_extractor(llm.clone());

        let request = ExtractionRequest::new(format!("{}{}", "a".repeat(2000), "TAIL"))
            .with_max_chunk_chars(2000)
            .with_smart_chunking(false);
        extractor.extract(&schema(), &request).await.unwrap();

        assert_eq!(llm.call_count(), 1);
        assert!(!llm.prompts()[0].user.contains("TAIL"));
    }

    #[tokio::test]
    async fn test_small_chunk_size_on_single_path() {
        let llm = MockProvider::new("<json>{\"title\": \"t\"}</json>");
        let extractor = create_test_extractor(llm.clone());

        // Default overlap is 1000 chars, larger than the window
        let request = ExtractionRequest::new("x").with_max_chunk_chars(500).with_smart_chunking(false);
        assert!(extractor.extract(&schema(), &request).await.is_ok());

        let request = ExtractionRequest::new("<p>short</p>").with_max_chunk_chars(500);
        assert!(extractor.extract(&schema(), &request).await.is_ok());

        let request = ExtractionRequest::new("a".repeat(2000)).with_max_chunk_chars(500).with_smart_chunking(false);
        assert!(extractor.extract(&schema(), &request).await.is_ok());

        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_invalid_overlap_fails_when_splitting() {
        let llm = MockProvider::new("<json>{\"title\": \"t\"}</json>");
        let extractor = create_test_extractor(llm.clone());

        let request = ExtractionRequest::new("a".repeat(2000)).with_max_chunk_chars(500);
        let result = extractor.extract(&schema(), &request).await;

        assert!(matches!(result, Err(ExtractorError::InvalidChunking { size: 500, overlap: 1000 })));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_rejected() {
        let llm = MockProvider::new("<json>{\"title\": \"t\"}</json>");
        let extractor = create_test_extractor(llm.clone());

        let request = ExtractionRequest::new("x").with_max_chunk_chars(0).with_smart_chunking(false);
        let result = extractor.extract(&schema(), &request).await;

        assert!(matches!(result, Err(ExtractorError::Config(_))));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_llm_failure_propagates_on_single_path() {
        let mut llm = MockProvider::default();
        llm.add_error("HTML CONTENT");
        let extractor = create_test_extractor(llm);

        let result = extractor.extract(&schema(), &ExtractionRequest::new("<p>x</p>")).await;
        assert!(matches!(result, Err(ExtractorError::Llm(_))));
    }

    #[tokio::test]
    async fn test_analyze_returns_raw_text() {
        let mut llm = MockProvider::default();
        llm.add_response("What is this page?", "A product listing.");
        let extractor = create_test_extractor(llm.clone());

        let answer = extractor
            .analyze("<html></html>", "What is this page?", None, None)
            .await
            .unwrap();

        assert_eq!(answer, "A product listing.");
        assert!(llm.prompts()[0].user.ends_with("<html></html>"));
    }
}
