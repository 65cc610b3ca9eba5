//! Chunk relevance and result density

use crate::keywords::KeywordSet;
use harvest_domain::ExtractionResult;
use serde_json::Value;

/// Share of `keywords` that occur somewhere in `text`, case-insensitively
///
/// Containment is substring-based, not whole-word. An empty keyword set
/// scores 0.
pub fn score(text: &str, keywords: &KeywordSet) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }

    let haystack = text.to_lowercase();
    let hits = keywords.iter().filter(|k| haystack.contains(k)).count();
    hits as f64 / keywords.len() as f64
}

/// Number of populated top-level values in a result
///
/// A scalar counts once unless it is null or an empty string; `0` and
/// `false` count. A list counts its populated elements.
pub fn data_density(result: &ExtractionResult) -> usize {
    result
        .fields()
        .map(|(_, value)| match value {
            Value::Array(items) => items.iter().filter(|item| is_populated(item)).count(),
            other => usize::from(is_populated(other)),
        })
        .sum()
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
