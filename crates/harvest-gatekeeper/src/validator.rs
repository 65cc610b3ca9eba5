//! Record validation logic

use crate::{GatekeeperError, ValidationConfig};
use harvest_domain::text::excerpt;
use harvest_domain::{ExtractionResult, FieldType, Schema};
use serde_json::{Map, Number, Value};
use std::fmt;
use tracing::debug;

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// The value at this path should have been a JSON object
    NotAnObject {
        /// JSON path of the value
        path: String,
    },

    /// A required field is absent
    MissingField {
        /// JSON path of the field
        path: String,
    },

    /// A required field is explicitly null
    NullField {
        /// JSON path of the field
        path: String,
    },

    /// A value has the wrong type
    TypeMismatch {
        /// JSON path of the value
        path: String,
        /// Declared type
        expected: &'static str,
        /// JSON type that was found
        found: &'static str,
    },

    /// A key the schema does not declare (strict mode only)
    UnknownField {
        /// JSON path of the key
        path: String,
    },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NotAnObject { path } => write!(f, "{}: expected an object", path),
            RejectionReason::MissingField { path } => write!(f, "{}: field required", path),
            RejectionReason::NullField { path } => write!(f, "{}: must not be null", path),
            RejectionReason::TypeMismatch { path, expected, found } => {
                write!(f, "{}: expected {}, found {}", path, expected, found)
            }
            RejectionReason::UnknownField { path } => write!(f, "{}: unknown field", path),
        }
    }
}

/// The Gatekeeper validates model output against a schema
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Validate a parsed JSON value against the schema
    ///
    /// # Returns
    ///
    /// A normalized record: fields in schema order, missing optional fields
    /// set to `null`, coerced scalars replaced by their typed form.
    ///
    /// # Errors
    ///
    /// [`GatekeeperError::Rejected`] listing every violation found.
    pub fn validate(&self, value: &Value, schema: &Schema) -> Result<ExtractionResult, GatekeeperError> {
        let mut reasons = Vec::new();
        let normalized = self.check_object(value, schema, "$", &mut reasons);

        match normalized {
            Some(values) if reasons.is_empty() => Ok(ExtractionResult::from_validated(values)),
            _ => {
                debug!(
                    schema = schema.name(),
                    violations = reasons.len(),
                    "Record rejected"
                );
                Err(GatekeeperError::Rejected {
                    schema: schema.name().to_string(),
                    reasons,
                    excerpt: excerpt(&value.to_string()),
                })
            }
        }
    }

    fn check_object(
        &self,
        value: &Value,
        schema: &Schema,
        path: &str,
        reasons: &mut Vec<RejectionReason>,
    ) -> Option<Map<String, Value>> {
        let Some(obj) = value.as_object() else {
            reasons.push(RejectionReason::NotAnObject {
                path: path.to_string(),
            });
            return None;
        };

        let mut normalized = Map::new();
        for field in schema.fields() {
            let field_path = format!("{}.{}", path, field.name);
            match obj.get(&field.name) {
                None if field.required => {
                    reasons.push(RejectionReason::MissingField { path: field_path });
                }
                Some(Value::Null) if field.required => {
                    reasons.push(RejectionReason::NullField { path: field_path });
                }
                None | Some(Value::Null) => {
                    normalized.insert(field.name.clone(), Value::Null);
                }
                Some(present) => {
                    if let Some(checked) = self.check_value(present, &field.field_type, &field_path, reasons) {
                        normalized.insert(field.name.clone(), checked);
                    }
                }
            }
        }

        if !self.config.allow_unknown_fields {
            for key in obj.keys() {
                if schema.field(key).is_none() {
                    reasons.push(RejectionReason::UnknownField {
                        path: format!("{}.{}", path, key),
                    });
                }
            }
        }

        Some(normalized)
    }

    fn check_value(
        &self,
        value: &Value,
        field_type: &FieldType,
        path: &str,
        reasons: &mut Vec<RejectionReason>,
    ) -> Option<Value> {
        let checked = match field_type {
            FieldType::Object(schema) => {
                return self.check_object(value, schema, path, reasons).map(Value::Object);
            }
            FieldType::List(item_type) => {
                let Some(items) = value.as_array() else {
                    reasons.push(mismatch(path, field_type, value));
                    return None;
                };
                let mut checked = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, idx);
                    if let Some(v) = self.check_value(item, item_type, &item_path, reasons) {
                        checked.push(v);
                    }
                }
                Some(Value::Array(checked))
            }
            FieldType::String => value.is_string().then(|| value.clone()),
            FieldType::Integer => self.integer(value),
            FieldType::Number => self.number(value),
            FieldType::Boolean => self.boolean(value),
        };

        if checked.is_none() {
            reasons.push(mismatch(path, field_type, value));
        }
        checked
    }

    fn integer(&self, value: &Value) -> Option<Value> {
        if value.is_i64() || value.is_u64() {
            return Some(value.clone());
        }
        if !self.config.coerce_scalars {
            return None;
        }
        match value {
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Value::from(f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        }
    }

    fn number(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Number(_) => Some(value.clone()),
            Value::String(s) if self.config.coerce_scalars => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            _ => None,
        }
    }

    fn boolean(&self, value: &Value) -> Option<Value> {
        if value.is_boolean() {
            return Some(value.clone());
        }
        if !self.config.coerce_scalars {
            return None;
        }
        let parsed = match value {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.map(Value::Bool)
    }
}

fn mismatch(path: &str, expected: &FieldType, found: &Value) -> RejectionReason {
    RejectionReason::TypeMismatch {
        path: path.to_string(),
        expected: expected.type_name(),
        found: json_type(found),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
