//! Recover a JSON payload from free-form model output

use crate::error::ExtractorError;
use harvest_domain::text::excerpt;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

/// Tag the prompt asks the model to wrap its answer in
pub const JSON_TAG: &str = "json";

static TAGGED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<json>(.*?)</json>").expect("static regex"));

static BRACED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

/// Parse the JSON payload of a model response
///
/// The first `<json>...</json>` region (any case, may span lines) wins. Without
/// one, the span from the first `{` to the last `}` is tried instead.
///
/// # Examples
///
/// ```
/// use harvest_extractor::parse_response;
///
/// let value = parse_response("Sure!\n<JSON>\n{\"a\": 1}\n</JSON>").unwrap();
/// assert_eq!(value["a"], 1);
///
/// let value = parse_response("```json\n{\"a\": 2}\n```").unwrap();
/// assert_eq!(value["a"], 2);
///
/// assert!(parse_response("I cannot find any data.").is_err());
/// ```
pub fn parse_response(response: &str) -> Result<Value, ExtractorError> {
    let candidate = if let Some(captures) = TAGGED.captures(response) {
        captures.get(1).map_or("", |m| m.as_str()).trim()
    } else if let Some(m) = BRACED.find(response) {
        debug!("No <json> tags in response, falling back to brace span");
        m.as_str()
    } else {
        return Err(ExtractorError::Format {
            message: "No <json> tags or JSON object found in model response".to_string(),
            excerpt: excerpt(response),
        });
    };

    serde_json::from_str(candidate).map_err(|e| ExtractorError::Format {
        message: format!("Invalid JSON in model response: {}", e),
        excerpt: excerpt(candidate),
    })
}
