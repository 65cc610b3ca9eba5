//! Prompt construction for extraction and analysis calls

use crate::parser::JSON_TAG;
use harvest_domain::text::truncate_chars;
use harvest_domain::{Prompt, Schema};

const EXTRACTION_PERSONA: &str = "You are an expert web scraping assistant. Your task is to extract structured data \
from HTML content with precision and accuracy. Follow the schema exactly.";

const ANALYSIS_PERSONA: &str = "You are an expert web scraping and analysis assistant.";

/// Builds extraction prompts for one schema
///
/// The schema is serialized once; [`PromptBuilder::build`] can then be
/// called for every chunk of a document.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    schema_json: String,
    instructions: Option<String>,
}

impl PromptBuilder {
    /// Create a builder for `schema`
    pub fn new(schema: &Schema) -> Self {
        let schema_json = serde_json::to_string_pretty(&schema.to_json_schema())
            .unwrap_or_else(|_| schema.to_json_schema().to_string());
        Self {
            schema_json,
            instructions: None,
        }
    }

    /// Add free-text instructions, embedded verbatim
    pub fn with_instructions(mut self, instructions: Option<&str>) -> Self {
        self.instructions = instructions
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    /// The serialized schema embedded in every prompt
    pub fn schema_json(&self) -> &str {
        &self.schema_json
    }

    /// Build the prompt for one document or chunk
    pub fn build(&self, html: &str) -> Prompt {
        let system = format!(
            "{persona} Return ONLY valid JSON wrapped in <{tag}></{tag}> tags. Be thorough but concise. \
             If a field is not found, use null for optional fields or your best inference for required fields.",
            persona = EXTRACTION_PERSONA,
            tag = JSON_TAG,
        );

        let mut user = String::with_capacity(html.len() + self.schema_json.len() + 256);
        user.push_str("Extract structured data from the HTML below according to this schema.\n\n");
        user.push_str("SCHEMA:\n");
        user.push_str(&self.schema_json);
        user.push_str("\n\n");

        if let Some(instructions) = &self.instructions {
            user.push_str("INSTRUCTIONS: ");
            user.push_str(instructions);
            user.push_str("\n\n");
        }

        user.push_str("HTML CONTENT:\n");
        user.push_str(html);
        user.push_str(&format!(
            "\n\nExtract the data and return it as valid JSON wrapped in <{0}></{0}> tags.",
            JSON_TAG
        ));

        Prompt::new(system, user)
    }
}

/// Build a free-form analysis prompt; the HTML is cut to `max_html_chars`
pub fn analysis_prompt(html: &str, request: &str, max_html_chars: usize) -> Prompt {
    let user = format!(
        "{}\n\nHTML CONTENT:\n{}",
        request,
        truncate_chars(html, max_html_chars)
    );
    Prompt::new(ANALYSIS_PERSONA, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_domain::{Field, FieldType};

    fn schema() -> Schema {
        Schema::builder("Story")
            .field(Field::required("title", FieldType::String).with_description("Headline"))
            .field(Field::optional("points", FieldType::Integer))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new(&schema());
        assert_eq!(builder.build("<p>x</p>"), builder.build("<p>x</p>"));
    }

    #[test]
    fn test_system_prompt_fixes_output_contract() {
        let prompt = PromptBuilder::new(&schema()).build("");
        assert!(prompt.system.contains("<json></json>"));
        assert!(prompt.system.contains("null for optional fields"));
    }

    #[test]
    fn test_user_prompt_embeds_schema_instructions_and_html() {
        let prompt = PromptBuilder::new(&schema())
            .with_instructions(Some("Only the front page"))
            .build("<h1>Hello</h1>");

        assert!(prompt.user.contains("\"title\""));
        assert!(prompt.user.contains("Headline"));
        assert!(prompt.user.contains("INSTRUCTIONS: Only the front page"));
        assert!(prompt.user.contains("HTML CONTENT:\n<h1>Hello</h1>"));

        let schema_at = prompt.user.find("SCHEMA:").unwrap();
        let html_at = prompt.user.find("HTML CONTENT:").unwrap();
        assert!(schema_at < html_at);
    }

    #[test]
    fn test_blank_instructions_are_omitted() {
        let prompt = PromptBuilder::new(&schema())
            .with_instructions(Some("   "))
            .build("x");
        assert!(!prompt.user.contains("INSTRUCTIONS"));
    }

    #[test]
    fn test_analysis_prompt_truncates_html() {
        let html = "é".repeat(20);
        let prompt = analysis_prompt(&html, "Summarize", 5);
        assert!(prompt.user.starts_with("Summarize\n\nHTML CONTENT:\n"));
        assert!(prompt.user.ends_with(&"é".repeat(5)));
        assert!(!prompt.user.contains(&"é".repeat(6)));
    }
}
