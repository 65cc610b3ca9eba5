//! Trait definitions for external interactions
//!
//! The generative model is an infrastructure concern; implementations live
//! in harvest-llm.

/// A system/user instruction pair for one model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Persona and output contract
    pub system: String,

    /// Task payload (schema, instructions, document text)
    pub user: String,
}

impl Prompt {
    /// Create a prompt from its two parts
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Combined length of both parts in bytes
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    /// Whether both parts are empty
    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// Sampling parameters for one generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature; 0 means greedy decoding
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 4096,
        }
    }
}

/// Trait for LLM provider operations
///
/// A provider is a black box from prompt text to response text. It is
/// assumed non-reentrant: callers issue one generation at a time per instance.
///
/// Implemented by the infrastructure layer (harvest-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for the prompt
    fn generate(&self, prompt: &Prompt, options: &GenerationOptions) -> Result<String, Self::Error>;

    /// Name of the model behind this provider, for logging
    fn model_name(&self) -> &str {
        "llm"
    }
}
