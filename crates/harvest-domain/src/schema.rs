//! Schema module - the shape of the record an extraction must produce
//!
//! A [`Schema`] is a named, ordered set of typed fields. It is rendered to a
//! JSON Schema document for the model prompt, and can be loaded back from a
//! JSON Schema document (including `$defs`/`$ref` and nullable `anyOf` forms).

use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building or loading a schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Two fields share a name
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// A field has an empty name
    #[error("Field names must not be empty")]
    EmptyFieldName,

    /// The JSON Schema document uses something we cannot represent
    #[error("Unsupported schema at '{path}': {reason}")]
    Unsupported {
        /// JSON path of the offending node
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// A `$ref` that does not point into the document
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// A `$ref` chain that loops back on itself
    #[error("Recursive reference: {0}")]
    RecursiveReference(String),
}

/// Semantic type of a schema field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Text
    String,
    /// Whole number
    Integer,
    /// Any JSON number
    Number,
    /// true / false
    Boolean,
    /// Homogeneous list
    List(Box<FieldType>),
    /// Nested record
    Object(Schema),
}

impl FieldType {
    /// Shorthand for `FieldType::List(Box::new(item))`
    pub fn list_of(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    /// JSON Schema type keyword for this type
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::List(_) => "array",
            FieldType::Object(_) => "object",
        }
    }

    fn to_json_schema(&self) -> Value {
        match self {
            FieldType::Object(schema) => schema.to_json_schema(),
            FieldType::List(item) => {
                let mut node = Map::new();
                node.insert("type".to_string(), Value::from("array"));
                node.insert("items".to_string(), item.to_json_schema());
                Value::Object(node)
            }
            scalar => {
                let mut node = Map::new();
                node.insert("type".to_string(), Value::from(scalar.type_name()));
                Value::Object(node)
            }
        }
    }
}

/// A single field of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name (unique within its schema)
    pub name: String,

    /// Declared type
    pub field_type: FieldType,

    /// Human-readable description, also used as a relevance vocabulary
    pub description: Option<String>,

    /// Whether the field must be present and non-null
    pub required: bool,
}

impl Field {
    /// A required field
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
            required: true,
        }
    }

    /// An optional field (absent or null is accepted)
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named, ordered set of uniquely named fields
///
/// # Examples
///
/// ```
/// use harvest_domain::{Field, FieldType, Schema};
///
/// let schema = Schema::builder("Product")
///     .field(Field::required("title", FieldType::String).with_description("Product title"))
///     .field(Field::optional("price", FieldType::String))
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.fields().len(), 2);
/// assert!(schema.field("title").unwrap().required);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    description: Option<String>,
    fields: Vec<Field>,
}

impl Schema {
    /// Create a schema, rejecting duplicate or empty field names
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        Ok(Self {
            name: name.into(),
            description: None,
            fields,
        })
    }

    /// Start building a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    /// Schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema-level description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render as a JSON Schema object (the form embedded in prompts)
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut node = field.field_type.to_json_schema();
            if let Value::Object(obj) = &mut node {
                if let Some(description) = &field.description {
                    obj.insert("description".to_string(), Value::from(description.as_str()));
                }
                if !field.required {
                    obj.insert("default".to_string(), Value::Null);
                }
            }
            properties.insert(field.name.clone(), node);
        }

        let required: Vec<Value> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| Value::from(f.name.as_str()))
            .collect();

        let mut schema = Map::new();
        schema.insert("title".to_string(), Value::from(self.name.as_str()));
        if let Some(description) = &self.description {
            schema.insert("description".to_string(), Value::from(description.as_str()));
        }
        schema.insert("type".to_string(), Value::from("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        Value::Object(schema)
    }

    /// Load a schema from a JSON Schema document
    ///
    /// Understands `properties`, `required`, `description`, `title`, scalar and
    /// `array`/`object` types, nullable forms (`"type": ["string", "null"]` or
    /// `anyOf` with a `null` branch) and local `$ref`s into `$defs`/`definitions`.
    pub fn from_json_schema(document: &Value) -> Result<Self, SchemaError> {
        let mut resolver = Resolver {
            root: document,
            stack: Vec::new(),
        };
        resolver.object(document, "Schema", "$")
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    description: Option<String>,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Set the schema-level description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Finish, validating field-name uniqueness
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut schema = Schema::new(self.name, self.fields)?;
        schema.description = self.description;
        Ok(schema)
    }
}

/// Walks a JSON Schema document, following local references
struct Resolver<'a> {
    root: &'a Value,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn object(&mut self, node: &'a Value, fallback_name: &str, path: &str) -> Result<Schema, SchemaError> {
        let obj = node.as_object().ok_or_else(|| unsupported(path, "expected an object schema"))?;

        let name = obj
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(fallback_name);

        let required: HashSet<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut fields = Vec::new();
        if let Some(properties) = obj.get("properties") {
            let properties = properties
                .as_object()
                .ok_or_else(|| unsupported(path, "'properties' must be an object"))?;

            for (field_name, field_node) in properties {
                let field_path = format!("{}.{}", path, field_name);
                let field_type = self.field_type(field_node, field_name, &field_path)?;
                fields.push(Field {
                    name: field_name.clone(),
                    field_type,
                    description: field_node
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    required: required.contains(field_name.as_str()),
                });
            }
        }

        let mut schema = Schema::new(name, fields)?;
        schema.description = obj
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(schema)
    }

    fn field_type(&mut self, node: &'a Value, name: &str, path: &str) -> Result<FieldType, SchemaError> {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            if self.stack.iter().any(|r| r == reference) {
                return Err(SchemaError::RecursiveReference(reference.to_string()));
            }
            let target = self.resolve(reference)?;
            self.stack.push(reference.to_string());
            let resolved = self.field_type(target, name, path);
            self.stack.pop();
            return resolved;
        }

        for combinator in ["anyOf", "oneOf"] {
            if let Some(variants) = node.get(combinator).and_then(Value::as_array) {
                let concrete: Vec<&Value> = variants.iter().filter(|v| !is_null_type(v)).collect();
                return match concrete.as_slice() {
                    [only] => self.field_type(only, name, path),
                    _ => Err(unsupported(path, "union types are not supported")),
                };
            }
        }

        let type_name = match node.get("type") {
            Some(Value::String(t)) => Some(t.as_str()),
            Some(Value::Array(types)) => {
                let concrete: Vec<&str> = types
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|t| *t != "null")
                    .collect();
                match concrete.as_slice() {
                    [only] => Some(*only),
                    _ => return Err(unsupported(path, "union types are not supported")),
                }
            }
            Some(_) => return Err(unsupported(path, "'type' must be a string or array")),
            None => None,
        };

        match type_name {
            Some("string") => Ok(FieldType::String),
            Some("integer") => Ok(FieldType::Integer),
            Some("number") => Ok(FieldType::Number),
            Some("boolean") => Ok(FieldType::Boolean),
            Some("array") => {
                let items = node
                    .get("items")
                    .filter(|items| items.as_object().is_some_and(|o| !o.is_empty()))
                    .ok_or_else(|| unsupported(path, "array without an item type"))?;
                let item = self.field_type(items, name, &format!("{}[]", path))?;
                Ok(FieldType::list_of(item))
            }
            Some("object") => Ok(FieldType::Object(self.object(node, name, path)?)),
            Some(other) => Err(unsupported(path, &format!("unknown type '{}'", other))),
            None if node.get("properties").is_some() => {
                Ok(FieldType::Object(self.object(node, name, path)?))
            }
            None if node.get("enum").is_some() => Ok(FieldType::String),
            None => Err(unsupported(path, "missing 'type'")),
        }
    }

    fn resolve(&self, reference: &str) -> Result<&'a Value, SchemaError> {
        reference
            .strip_prefix('#')
            .and_then(|pointer| self.root.pointer(pointer))
            .ok_or_else(|| SchemaError::UnresolvedReference(reference.to_string()))
    }
}

fn is_null_type(node: &Value) -> bool {
    node.get("type").and_then(Value::as_str) == Some("null")
}

fn unsupported(path: &str, reason: &str) -> SchemaError {
    SchemaError::Unsupported {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product() -> Schema {
        Schema::builder("Product")
            .description("A product listing")
            .field(Field::required("title", FieldType::String).with_description("Product title"))
            .field(Field::optional("price", FieldType::Number))
            .field(Field::optional("tags", FieldType::list_of(FieldType::String)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = Schema::builder("Dup")
            .field(Field::required("a", FieldType::String))
            .field(Field::optional("a", FieldType::Integer))
            .build();
        assert_eq!(result, Err(SchemaError::DuplicateField("a".to_string())));
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let result = Schema::new("Empty", vec![Field::required("", FieldType::String)]);
        assert_eq!(result, Err(SchemaError::EmptyFieldName));
    }

    #[test]
    fn test_to_json_schema() {
        let rendered = product().to_json_schema();
        assert_eq!(rendered["title"], "Product");
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["title"]));
        assert_eq!(rendered["properties"]["title"]["description"], "Product title");
        assert_eq!(rendered["properties"]["price"]["default"], Value::Null);
        assert_eq!(rendered["properties"]["tags"]["items"]["type"], "string");
    }

    #[test]
    fn test_json_schema_round_trip() {
        let schema = product();
        let loaded = Schema::from_json_schema(&schema.to_json_schema()).unwrap();
        assert_eq!(loaded, schema);
    }

    #[test]
    fn test_field_order_is_preserved() {
        let doc = json!({
            "type": "object",
            "properties": {
                "zeta": {"type": "string"},
                "alpha": {"type": "string"},
                "mid": {"type": "string"}
            }
        });
        let schema = Schema::from_json_schema(&doc).unwrap();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_nullable_forms() {
        let doc = json!({
            "title": "Story",
            "properties": {
                "title": {"type": "string"},
                "points": {"anyOf": [{"type": "integer"}, {"type": "null"}]},
                "url": {"type": ["string", "null"]}
            },
            "required": ["title"]
        });
        let schema = Schema::from_json_schema(&doc).unwrap();
        assert_eq!(schema.field("points").unwrap().field_type, FieldType::Integer);
        assert_eq!(schema.field("url").unwrap().field_type, FieldType::String);
        assert!(!schema.field("url").unwrap().required);
    }

    #[test]
    fn test_defs_reference() {
        let doc = json!({
            "title": "Listing",
            "$defs": {
                "Seller": {
                    "title": "Seller",
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }
            },
            "properties": {
                "sellers": {"type": "array", "items": {"$ref": "#/$defs/Seller"}},
                "owner": {"$ref": "#/$defs/Seller", "description": "Account owner"}
            }
        });
        let schema = Schema::from_json_schema(&doc).unwrap();
        match &schema.field("sellers").unwrap().field_type {
            FieldType::List(item) => match item.as_ref() {
                FieldType::Object(seller) => assert_eq!(seller.name(), "Seller"),
                other => panic!("unexpected item type {:?}", other),
            },
            other => panic!("unexpected type {:?}", other),
        }
        assert_eq!(
            schema.field("owner").unwrap().description.as_deref(),
            Some("Account owner")
        );
    }

    #[test]
    fn test_recursive_reference_rejected() {
        let doc = json!({
            "$defs": {
                "Node": {
                    "type": "object",
                    "properties": {"child": {"$ref": "#/$defs/Node"}}
                }
            },
            "properties": {"root": {"$ref": "#/$defs/Node"}}
        });
        let result = Schema::from_json_schema(&doc);
        assert!(matches!(result, Err(SchemaError::RecursiveReference(_))));
    }

    #[test]
    fn test_unresolved_reference() {
        let doc = json!({"properties": {"x": {"$ref": "#/$defs/Missing"}}});
        assert!(matches!(
            Schema::from_json_schema(&doc),
            Err(SchemaError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn test_union_rejected() {
        let doc = json!({"properties": {"x": {"type": ["string", "integer"]}}});
        assert!(matches!(
            Schema::from_json_schema(&doc),
            Err(SchemaError::Unsupported { .. })
        ));
    }
}
