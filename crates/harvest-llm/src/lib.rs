//! Harvest LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `harvest-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama chat API integration
//!
//! # Examples
//!
//! ```
//! use harvest_llm::MockProvider;
//! use harvest_domain::{GenerationOptions, LlmProvider, Prompt};
//!
//! let provider = MockProvider::new("<json>{}</json>");
//! let prompt = Prompt::new("system", "user");
//! let result = provider.generate(&prompt, &GenerationOptions::default()).unwrap();
//! assert_eq!(result, "<json>{}</json>");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use harvest_domain::{GenerationOptions, LlmProvider, Prompt};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

#[derive(Debug, Clone)]
struct MockRule {
    needle: String,
    reply: MockReply,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without any network calls. Rules match
/// when the user prompt contains their needle; the first matching rule wins,
/// otherwise the default response is returned.
///
/// # Examples
///
/// ```
/// use harvest_llm::MockProvider;
/// use harvest_domain::{GenerationOptions, LlmProvider, Prompt};
///
/// let mut provider = MockProvider::new("fallback");
/// provider.add_response("SECTION-A", "answer A");
/// provider.add_error("SECTION-B");
///
/// let options = GenerationOptions::default();
/// let a = provider.generate(&Prompt::new("", "...SECTION-A..."), &options).unwrap();
/// assert_eq!(a, "answer A");
/// assert!(provider.generate(&Prompt::new("", "SECTION-B"), &options).is_err());
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    model_name: String,
    rules: Arc<Mutex<Vec<MockRule>>>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            model_name: "mock".to_string(),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer prompts whose user part contains `needle` with `response`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.rules).push(MockRule {
            needle: needle.into(),
            reply: MockReply::Text(response.into()),
        });
    }

    /// Fail prompts whose user part contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        lock(&self.rules).push(MockRule {
            needle: needle.into(),
            reply: MockReply::Error,
        });
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<Prompt> {
        lock(&self.prompts).clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        lock(&self.prompts).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &Prompt, _options: &GenerationOptions) -> Result<String, Self::Error> {
        lock(&self.prompts).push(prompt.clone());

        let rules = lock(&self.rules);
        match rules.iter().find(|r| prompt.user.contains(&r.needle)) {
            Some(MockRule { reply: MockReply::Text(text), .. }) => Ok(text.clone()),
            Some(MockRule { reply: MockReply::Error, needle }) => {
                Err(LlmError::Other(format!("Mock error for '{}'", needle)))
            }
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

// A panicking test thread must not cascade into every later call.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(provider: &MockProvider, user: &str) -> Result<String, LlmError> {
        provider.generate(&Prompt::new("system", user), &GenerationOptions::default())
    }

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        assert_eq!(ask(&provider, "any prompt").unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(ask(&provider, "say hello").unwrap(), "world");
        assert_eq!(ask(&provider, "foo?").unwrap(), "bar");
        assert_eq!(ask(&provider, "unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut provider = MockProvider::default();
        provider.add_response("alpha", "first");
        provider.add_response("beta", "second");

        assert_eq!(ask(&provider, "beta alpha").unwrap(), "first");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        ask(&provider, "prompt1").unwrap();
        ask(&provider, "prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts()[1].user, "prompt2");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = ask(&provider, "a bad prompt");
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        ask(&provider1, "test").unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
