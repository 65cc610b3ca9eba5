//! Error types for the Harvest SDK.

use harvest_extractor::ExtractorError;
use harvest_fetch::FetchError;
use std::path::PathBuf;
use thiserror::Error;

/// SDK operation errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// Page could not be acquired
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Model call, parsing or validation failed
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractorError),

    /// Saving fetched HTML failed
    #[error("Failed to write HTML to {}: {source}", path.display())]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl SdkError {
    /// Whether the failure happened while acquiring the page
    pub fn is_fetch(&self) -> bool {
        matches!(self, SdkError::Fetch(_))
    }
}
