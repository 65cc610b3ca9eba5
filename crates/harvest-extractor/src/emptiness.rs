//! Heuristic for results that look like a failed acquisition

use harvest_domain::ExtractionResult;
use serde_json::Value;

/// Share of empty top-level fields at which a result counts as empty
pub const EMPTY_FIELD_RATIO: f64 = 0.8;

/// Whether `result` is suspiciously sparse
///
/// True when the result has no fields, or when at least 80% of its top-level
/// values are null, `""`, `[]` or `{}`. Nested values are not inspected. A
/// caller typically reacts by acquiring the page another way (e.g. with a
/// real browser) and extracting again.
pub fn is_empty(result: &ExtractionResult) -> bool {
    let total = result.field_count();
    if total == 0 {
        return true;
    }

    let empty = result.fields().filter(|(_, value)| is_blank(value)).count();
    empty as f64 >= total as f64 * EMPTY_FIELD_RATIO
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn record(value: Value) -> ExtractionResult {
        match value {
            Value::Object(map) => ExtractionResult::from_validated(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_no_fields_is_empty() {
        assert!(is_empty(&ExtractionResult::from_validated(Map::new())));
    }

    #[test]
    fn test_four_of_five_empty() {
        let result = record(json!({"a": "x", "b": null, "c": "", "d": [], "e": {}}));
        assert!(is_empty(&result));
    }

    #[test]
    fn test_three_of_five_empty() {
        let result = record(json!({"a": "x", "b": 1, "c": "", "d": [], "e": null}));
        assert!(!is_empty(&result));
    }

    #[test]
    fn test_nested_values_are_not_inspected() {
        let result = record(json!({"a": {"inner": null}}));
        assert!(!is_empty(&result));
    }

    #[test]
    fn test_is_pure() {
        let result = record(json!({"a": null, "b": "y"}));
        assert_eq!(is_empty(&result), is_empty(&result));
    }
}
