//! Validated extraction records

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A record that conforms to a [`Schema`](crate::Schema)
///
/// Every schema field is present exactly once, in schema order; optional
/// fields the model did not fill are present as `null`. Records are produced
/// by the validator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    values: Map<String, Value>,
}

impl ExtractionResult {
    /// Wrap an already-validated map
    ///
    /// Only the schema validator should call this; the map must contain every
    /// schema field with a value of the declared type.
    pub fn from_validated(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Value of a top-level field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Top-level fields in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level fields
    pub fn field_count(&self) -> usize {
        self.values.len()
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Convert into a JSON object value
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> String {
        // Serializing a Map<String, Value> cannot fail.
        serde_json::to_string_pretty(&self.values).unwrap_or_default()
    }

    /// Deserialize into a caller-defined type
    ///
    /// # Examples
    ///
    /// ```
    /// use harvest_domain::ExtractionResult;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Story { title: String, points: Option<i64> }
    ///
    /// let mut map = serde_json::Map::new();
    /// map.insert("title".into(), "Show HN".into());
    /// map.insert("points".into(), serde_json::Value::Null);
    ///
    /// let story: Story = ExtractionResult::from_validated(map).deserialize_into().unwrap();
    /// assert_eq!(story.title, "Show HN");
    /// assert!(story.points.is_none());
    /// ```
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.values.clone()))
    }
}
