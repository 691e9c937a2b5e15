//! Input schemas for tool arguments
//!
//! An [`InputSchema`] lists the fields a tool accepts together with their
//! primitive type and optionality. The same value is used twice: rendered as
//! JSON Schema for the model, and as the validator the dispatcher runs before
//! any executor sees the arguments.

use serde_json::{Map, Value, json};

/// Expected type of a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    /// Nested object with its own field list
    Object(Box<InputSchema>),
}

impl FieldType {
    fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object(_) => "object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object(_) => value.is_object(),
        }
    }
}

/// One named field of an input schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    kind: FieldType,
    description: String,
    required: bool,
    allowed: Vec<String>,
}

impl Field {
    fn new(name: impl Into<String>, kind: FieldType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            allowed: Vec::new(),
        }
    }

    /// Required string field
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, FieldType::String, description)
    }

    /// Required number field
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number, description)
    }

    /// Required integer field
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer, description)
    }

    /// Required boolean field
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean, description)
    }

    /// Required nested object field
    pub fn object(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: InputSchema,
    ) -> Self {
        Self::new(name, FieldType::Object(Box::new(schema)), description)
    }

    /// Mark the field optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Restrict a string field to a fixed set of values
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldType {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = match &self.kind {
            FieldType::Object(nested) => nested.to_json_schema(),
            other => json!({ "type": other.json_type() }),
        };
        if let Value::Object(map) = &mut schema {
            map.insert("description".to_string(), json!(self.description));
            if !self.allowed.is_empty() {
                map.insert("enum".to_string(), json!(self.allowed));
            }
        }
        schema
    }
}

/// Field name → expected type/optionality, for an object-shaped argument
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    fields: Vec<Field>,
}

impl InputSchema {
    /// Schema with no fields (tool takes no arguments)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a field
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Declared fields, in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Render as JSON Schema for the model
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `args` against the schema
    ///
    /// `null` is accepted as an empty object so argument-less tools can be
    /// called without `{}`. Fields not named in the schema are ignored.
    /// The error string names the offending field path.
    pub fn validate(&self, args: &Value) -> Result<(), String> {
        match args {
            Value::Null => self.validate_object(&Map::new(), ""),
            Value::Object(map) => self.validate_object(map, ""),
            other => Err(format!(
                "expected an object of arguments, got {}",
                json_kind(other)
            )),
        }
    }

    fn validate_object(&self, map: &Map<String, Value>, prefix: &str) -> Result<(), String> {
        for field in &self.fields {
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{prefix}.{}", field.name)
            };

            let value = match map.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(format!("missing required field `{path}`"));
                    }
                    continue;
                }
                Some(v) => v,
            };

            if !field.kind.matches(value) {
                return Err(format!(
                    "field `{path}` must be {}, got {}",
                    field.kind.json_type(),
                    json_kind(value)
                ));
            }

            if !field.allowed.is_empty() {
                let ok = value
                    .as_str()
                    .is_some_and(|s| field.allowed.iter().any(|a| a == s));
                if !ok {
                    return Err(format!(
                        "field `{path}` must be one of [{}]",
                        field.allowed.join(", ")
                    ));
                }
            }

            if let (FieldType::Object(nested), Value::Object(inner)) = (&field.kind, value) {
                nested.validate_object(inner, &path)?;
            }
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_schema() -> InputSchema {
        InputSchema::empty()
            .field(Field::string("query", "The search query"))
            .field(Field::integer("limit", "Maximum results").optional())
    }

    #[test]
    fn test_valid_arguments() {
        let schema = search_schema();
        assert!(schema.validate(&json!({"query": "mission"})).is_ok());
        assert!(schema.validate(&json!({"query": "mission", "limit": 3})).is_ok());
        // unknown fields pass through
        assert!(schema.validate(&json!({"query": "q", "extra": true})).is_ok());
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let schema = search_schema();

        let err = schema.validate(&json!({})).unwrap_err();
        assert!(err.contains("`query`"));

        let err = schema.validate(&json!({"query": 42})).unwrap_err();
        assert_eq!(err, "field `query` must be string, got number");

        let err = schema.validate(&json!({"query": "q", "limit": 2.5})).unwrap_err();
        assert!(err.contains("`limit` must be integer"));

        assert!(schema.validate(&json!("just a string")).is_err());
    }

    #[test]
    fn test_null_args_for_empty_schema() {
        assert!(InputSchema::empty().validate(&Value::Null).is_ok());
        assert!(search_schema().validate(&Value::Null).is_err());
    }

    #[test]
    fn test_nested_object_and_enum() {
        let schema = InputSchema::empty().field(Field::object(
            "when",
            "When to run",
            InputSchema::empty()
                .field(Field::string("type", "Schedule kind").one_of(["cron", "delayed"]))
                .field(Field::number("delayInSeconds", "Delay").optional()),
        ));

        assert!(schema.validate(&json!({"when": {"type": "cron"}})).is_ok());

        let err = schema
            .validate(&json!({"when": {"type": "hourly"}}))
            .unwrap_err();
        assert_eq!(err, "field `when.type` must be one of [cron, delayed]");

        let err = schema
            .validate(&json!({"when": {"type": "delayed", "delayInSeconds": "ten"}}))
            .unwrap_err();
        assert!(err.starts_with("field `when.delayInSeconds`"));
    }

    #[test]
    fn test_json_schema_rendering() {
        let rendered = search_schema().to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["query"]["type"], "string");
        assert_eq!(rendered["properties"]["limit"]["description"], "Maximum results");
        assert_eq!(rendered["required"], json!(["query"]));
    }
}
