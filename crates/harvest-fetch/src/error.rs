//! Error types for page acquisition

use thiserror::Error;

/// Errors raised while acquiring a page
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure (DNS, TLS, connect, timeout)
    #[error("Request to {url} failed: {source}")]
    Http {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Browser could not be started
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Navigation, scripting or page inspection failed
    #[error("Browser failed for {url}: {message}")]
    Browser {
        /// Requested URL
        url: String,
        /// What went wrong
        message: String,
    },

    /// A bounded wait elapsed
    #[error("Timed out after {waited_ms}ms waiting for {what}")]
    Timeout {
        /// What was awaited
        what: String,
        /// How long we waited
        waited_ms: u64,
    },

    /// Options that cannot be honored (bad method, proxy URL, ...)
    #[error("Invalid fetch option: {0}")]
    InvalidOption(String),
}

impl FetchError {
    pub(crate) fn browser(url: &str, message: impl std::fmt::Display) -> Self {
        FetchError::Browser {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}
