//! Harvest Extractor
//!
//! Converts raw HTML into schema-validated records using an LLM.
//!
//! # Architecture
//!
//! ```text
//!                 ┌─ small ─→ PromptBuilder → LLM → parse → Gatekeeper
//! HTML → Extractor┤
//!                 └─ large ─→ ChunkSplitter → score → best-of(PromptBuilder → LLM → parse → Gatekeeper)
//! ```
//!
//! Large documents are split into overlapping windows. Each window is scored
//! by how many schema keywords it contains; windows at or above the relevance
//! floor are tried in rank order and the most populated valid record is kept.
//! Per-window failures are logged and skipped. When nothing useful comes
//! back, the top-ranked window gets one last attempt whose failure is
//! returned to the caller.
//!
//! # Example Usage
//!
//! ```no_run
//! use harvest_domain::{Field, FieldType, Schema};
//! use harvest_extractor::{is_empty, ExtractionRequest, Extractor, ExtractorConfig};
//! use harvest_gatekeeper::Gatekeeper;
//! use harvest_llm::OllamaProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::builder("Story")
//!     .field(Field::required("title", FieldType::String).with_description("Headline"))
//!     .field(Field::optional("points", FieldType::Integer))
//!     .build()?;
//!
//! let llm = OllamaProvider::default_endpoint("llama3.1");
//! let extractor = Extractor::new(llm, Gatekeeper::default_config(), ExtractorConfig::default());
//!
//! let html = std::fs::read_to_string("page.html")?;
//! let request = ExtractionRequest::new(html).with_instructions("Front page story only");
//! let record = extractor.extract(&schema, &request).await?;
//!
//! if is_empty(&record) {
//!     println!("Page probably needs a browser");
//! }
//! println!("{}", record.to_json_pretty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod emptiness;
mod error;
mod extractor;
mod keywords;
mod parser;
mod prompt;
mod scoring;


pub use chunking::{Chunk, ChunkSplitter};
pub use config::ExtractorConfig;
pub use emptiness::{is_empty, EMPTY_FIELD_RATIO};
pub use error::ExtractorError;
pub use extractor::{ExtractionRequest, Extractor, ANALYSIS_MAX_HTML_CHARS};
pub use keywords::KeywordSet;
pub use parser::parse_response;
pub use prompt::{analysis_prompt, PromptBuilder};
pub use scoring::{data_density, score};
