//! Error types for the Extractor

use harvest_gatekeeper::GatekeeperError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Model output could not be recovered as JSON
    #[error("Invalid model output: {message}\nResponse: {excerpt}")]
    Format {
        /// What went wrong (no candidate, or the decode error)
        message: String,
        /// Bounded excerpt of the raw output or candidate
        excerpt: String,
    },

    /// JSON parsed but does not conform to the schema
    #[error(transparent)]
    Validation(#[from] GatekeeperError),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Chunk overlap must be smaller than the chunk size
    #[error("Invalid chunking: overlap {overlap} must be smaller than chunk size {size}")]
    InvalidChunking {
        /// Requested chunk size in chars
        size: usize,
        /// Requested overlap in chars
        overlap: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether a chunked extraction may skip past this failure
    ///
    /// Format, validation and model failures concern one chunk only;
    /// misconfiguration would fail every chunk the same way.
    pub fn is_chunk_local(&self) -> bool {
        matches!(
            self,
            ExtractorError::Format { .. } | ExtractorError::Validation(_) | ExtractorError::Llm(_)
        )
    }
}
