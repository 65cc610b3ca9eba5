//! Ollama Provider Implementation
//!
//! Talks to a local Ollama instance through its chat endpoint, sending the
//! system and user halves of a [`Prompt`] as separate messages.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama chat API
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use harvest_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.1")
//!     .with_max_retries(2);
//! ```

use crate::LlmError;
use harvest_domain::{GenerationOptions, LlmProvider, Prompt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts per generation
pub const DEFAULT_MAX_RETRIES: u32 = 3;

const TOP_P: f32 = 0.9;

/// Ollama API provider for local LLM inference
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
    top_p: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a provider against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Endpoint this provider talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one chat completion
    ///
    /// # Errors
    ///
    /// - `ModelNotAvailable` when Ollama answers 404 for the model
    /// - `InvalidResponse` when the body is not a chat response
    /// - `Communication` when every attempt failed at the transport or HTTP level
    pub async fn chat(&self, prompt: &Prompt, options: &GenerationOptions) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let request_body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
                top_p: TOP_P,
            },
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            debug!(model = %self.model, attempt = attempts + 1, prompt_len = prompt.len(), "Sending chat request");

            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<ChatResponse>()
                            .await
                            .map(|body| body.message.content)
                            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)));
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // 1s, 2s, 4s, ...
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(model = %self.model, attempt = attempts, ?delay, "Chat request failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    /// Blocking wrapper around [`OllamaProvider::chat`]
    ///
    /// Builds a throwaway current-thread runtime, so it must be called from a
    /// blocking context (e.g. `tokio::task::spawn_blocking`), never directly
    /// on an async worker.
    fn generate(&self, prompt: &Prompt, options: &GenerationOptions) -> Result<String, Self::Error> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?
            .block_on(self.chat(prompt, options))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3.1");
        assert_eq!(provider.endpoint(), "http://localhost:11434");
        assert_eq!(provider.model_name(), "llama3.1");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral");
        assert_eq!(provider.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_ollama_provider_with_max_retries() {
        let provider = OllamaProvider::default_endpoint("llama3.1").with_max_retries(5);
        assert_eq!(provider.max_retries, 5);

        let provider = provider.with_max_retries(0);
        assert_eq!(provider.max_retries, 1);
    }

    #[test]
    fn test_chat_request_shape() {
        let body = ChatRequest {
            model: "m",
            messages: [
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "usr" },
            ],
            stream: false,
            options: ChatOptions {
                temperature: 0.5,
                num_predict: 128,
                top_p: TOP_P,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 128);
    }

    #[test]
    fn test_sync_generate_reports_communication_error() {
        // Nothing listens on port 9
        let provider = OllamaProvider::new("http://127.0.0.1:9", "llama3.1")
            .with_max_retries(1)
            .with_timeout(Duration::from_secs(2));

        let result = provider.generate(&Prompt::new("s", "u"), &GenerationOptions::default());
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_chat_integration() {
        let provider = OllamaProvider::default_endpoint("llama3.1");
        let prompt = Prompt::new("Answer tersely.", "Say 'hello' and nothing else");
        let result = provider.chat(&prompt, &GenerationOptions::default()).await;

        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
