//! Tool contract types.
//!
//! Defines the inputs, output and JSON schemas of an operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Input and output contract of a tool operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Declared inputs, in prompt order.
    pub inputs: Vec<ToolInput>,

    /// Shape of a successful result.
    pub output: OutputSpec,
}

impl ToolSpec {
    /// Create a spec with no inputs and an empty object output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare another input.
    pub fn with_input(mut self, input: ToolInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Set the output contract.
    pub fn with_output(mut self, output: OutputSpec) -> Self {
        self.output = output;
        self
    }

    /// JSON Schema for the input object (function calling format).
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for input in &self.inputs {
            properties.insert(input.name.clone(), input.to_schema());
            if input.required {
                required.push(Value::String(input.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// JSON Schema for a successful result.
    pub fn output_schema(&self) -> Value {
        self.output.to_schema()
    }

    /// Check an input object against the declared inputs.
    pub fn validate_inputs(&self, values: &Value) -> Result<(), String> {
        let obj = values
            .as_object()
            .ok_or_else(|| "input must be a JSON object".to_string())?;

        for input in &self.inputs {
            match obj.get(&input.name) {
                None | Some(Value::Null) if input.required => {
                    return Err(format!("missing required input {}", input.name));
                }
                None | Some(Value::Null) => {}
                Some(value) => input.validate(value)?,
            }
        }

        Ok(())
    }

    /// Fill declared defaults for inputs the caller left out.
    pub fn apply_defaults(&self, values: Value) -> Value {
        let Value::Object(mut obj) = values else {
            return values;
        };

        for input in &self.inputs {
            let Some(default) = &input.default else {
                continue;
            };
            let missing = obj.get(&input.name).is_none_or(Value::is_null);
            if missing {
                obj.insert(input.name.clone(), default.clone());
            }
        }

        Value::Object(obj)
    }
}

/// One named input of an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    /// Parameter name.
    pub name: String,

    /// Data type.
    pub data_type: DataType,

    /// Shown to the assistant runtime.
    pub description: String,

    /// Must be present and non-null.
    pub required: bool,

    /// Filled in when the caller leaves the input out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Range, length, pattern or enum limits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<InputConstraints>,
}

impl ToolInput {
    /// An input the caller must supply.
    pub fn required(
        name: impl Into<String>,
        data_type: DataType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: description.into(),
            required: true,
            default: None,
            constraints: None,
        }
    }

    /// An input the caller may leave out.
    pub fn optional(
        name: impl Into<String>,
        data_type: DataType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: description.into(),
            required: false,
            default: None,
            constraints: None,
        }
    }

    /// Set a default value. Inputs with a default are optional.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.required = false;
        self
    }

    /// Add constraints.
    pub fn with_constraints(mut self, constraints: InputConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// JSON Schema of this input.
    pub fn to_schema(&self) -> Value {
        let mut schema = json!({
            "type": self.data_type.to_json_type(),
            "description": self.description
        });

        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }

        if let Some(constraints) = &self.constraints {
            constraints.apply_to_schema(&mut schema);
        }

        schema
    }

    /// Validate a value against this input's type and constraints.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        if !self.data_type.matches(value) {
            return Err(format!(
                "Invalid type for {}: expected {}",
                self.name,
                self.data_type.to_json_type()
            ));
        }

        if let Some(constraints) = &self.constraints {
            constraints.validate(value, &self.name)?;
        }

        Ok(())
    }
}

/// A field of a tool's successful result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Field name.
    pub name: String,

    /// Data type.
    pub data_type: DataType,

    /// Description of the field.
    pub description: String,

    /// Whether `null` is an allowed value.
    #[serde(default)]
    pub nullable: bool,

    /// Whether the field may be omitted.
    #[serde(default)]
    pub optional: bool,
}

impl ToolOutput {
    /// Create a new required, non-null output field.
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: description.into(),
            nullable: false,
            optional: false,
        }
    }

    /// Allow `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Allow the field to be absent.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn to_schema(&self) -> Value {
        let ty = if self.nullable {
            json!([self.data_type.to_json_type(), "null"])
        } else {
            json!(self.data_type.to_json_type())
        };
        json!({ "type": ty, "description": self.description })
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        match value {
            None if self.optional => Ok(()),
            None => Err(format!("missing field {}", self.name)),
            Some(Value::Null) if self.nullable || self.optional => Ok(()),
            Some(v) if self.data_type.matches(v) => Ok(()),
            Some(_) => Err(format!(
                "field {}: expected {}",
                self.name,
                self.data_type.to_json_type()
            )),
        }
    }
}

/// Whether a result is a single record or a list of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    #[default]
    Object,
    List,
}

/// Structured output contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSpec {
    pub shape: OutputShape,
    pub fields: Vec<ToolOutput>,
}

impl OutputSpec {
    /// A single record with the given fields.
    pub fn object(fields: Vec<ToolOutput>) -> Self {
        Self {
            shape: OutputShape::Object,
            fields,
        }
    }

    /// A list of records with the given fields.
    pub fn list(fields: Vec<ToolOutput>) -> Self {
        Self {
            shape: OutputShape::List,
            fields,
        }
    }

    /// JSON Schema of a result.
    pub fn to_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            properties.insert(field.name.clone(), field.to_schema());
            if !field.optional {
                required.push(Value::String(field.name.clone()));
            }
        }

        let record = json!({
            "type": "object",
            "properties": properties,
            "required": required
        });

        match self.shape {
            OutputShape::Object => record,
            OutputShape::List => json!({ "type": "array", "items": record }),
        }
    }

    /// Check that `value` is structurally valid against this contract.
    pub fn conforms(&self, value: &Value) -> Result<(), String> {
        match (self.shape, value) {
            (OutputShape::Object, Value::Object(_)) => self.conforms_record(value),
            (OutputShape::List, Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    self.conforms_record(item)
                        .map_err(|e| format!("item {index}: {e}"))?;
                }
                Ok(())
            }
            (OutputShape::Object, _) => Err("expected an object".to_string()),
            (OutputShape::List, _) => Err("expected an array".to_string()),
        }
    }

    fn conforms_record(&self, value: &Value) -> Result<(), String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "expected an object".to_string())?;
        for field in &self.fields {
            field.validate(obj.get(&field.name))?;
        }
        Ok(())
    }
}

/// JSON types an input or output field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl DataType {
    /// The JSON Schema `type` keyword.
    pub fn to_json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether `value` has this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Limits on an input value beyond its type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConstraints {
    /// Inclusive lower bound for numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Inclusive upper bound for numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Fewest chars for strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Most chars for strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Regex the whole string must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// JSON Schema format hint (for example `email`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// The only values accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

/// Loose address check: something, an `@`, a dotted domain.
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

impl InputConstraints {
    /// Numbers between `min` and `max`.
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Default::default()
        }
    }

    /// Strings of `min` to `max` chars.
    pub fn length(min: usize, max: usize) -> Self {
        Self {
            min_length: Some(min),
            max_length: Some(max),
            ..Default::default()
        }
    }

    /// One of `values`.
    pub fn enum_of(values: Vec<Value>) -> Self {
        Self {
            enum_values: Some(values),
            ..Default::default()
        }
    }

    /// Require an email address.
    pub fn email() -> Self {
        Self {
            pattern: Some(EMAIL_PATTERN.to_string()),
            format: Some("email".to_string()),
            ..Default::default()
        }
    }

    /// Write these limits into an input's JSON Schema.
    pub fn apply_to_schema(&self, schema: &mut Value) {
        if let Some(min) = self.min {
            schema["minimum"] = json!(min);
        }
        if let Some(max) = self.max {
            schema["maximum"] = json!(max);
        }
        if let Some(min) = self.min_length {
            schema["minLength"] = json!(min);
        }
        if let Some(max) = self.max_length {
            schema["maxLength"] = json!(max);
        }
        if let Some(format) = &self.format {
            schema["format"] = json!(format);
        } else if let Some(pattern) = &self.pattern {
            schema["pattern"] = json!(pattern);
        }
        if let Some(allowed) = &self.enum_values {
            schema["enum"] = json!(allowed);
        }
    }

    /// Check `value` (the input called `name`) against these limits.
    pub fn validate(&self, value: &Value, name: &str) -> Result<(), String> {
        if let Some(number) = value.as_f64() {
            if let Some(min) = self.min.filter(|min| number < *min) {
                return Err(format!("{name}: {number} is below the minimum of {min}"));
            }
            if let Some(max) = self.max.filter(|max| number > *max) {
                return Err(format!("{name}: {number} is above the maximum of {max}"));
            }
        }

        if let Some(text) = value.as_str() {
            let len = text.chars().count();
            if let Some(min) = self.min_length.filter(|min| len < *min) {
                return Err(format!("{name}: string length {len} is less than {min}"));
            }
            if let Some(max) = self.max_length.filter(|max| len > *max) {
                return Err(format!("{name}: string length {len} is greater than {max}"));
            }
            if let Some(pattern) = &self.pattern {
                let regex = regex_lite::Regex::new(pattern)
                    .map_err(|e| format!("{name}: invalid pattern {pattern}: {e}"))?;
                if !regex.is_match(text) {
                    return Err(format!("{name}: {text:?} does not match {pattern}"));
                }
            }
        }

        if let Some(allowed) = self.enum_values.as_ref().filter(|allowed| !allowed.contains(value)) {
            return Err(format!("{name}: {value} is not one of {}", Value::Array(allowed.clone())));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_schema_generation() {
        let spec = ToolSpec::new()
            .with_input(ToolInput::required("owner", DataType::String, "Repository owner"))
            .with_input(
                ToolInput::optional("state", DataType::String, "Issue state")
                    .with_default(json!("open")),
            );

        let schema = spec.input_schema();
        assert!(schema["properties"]["owner"].is_object());
        assert_eq!(schema["properties"]["state"]["default"], json!("open"));
        assert_eq!(schema["required"], json!(["owner"]));
    }

    #[test]
    fn test_range_and_type_checks() {
        let input = ToolInput::required("limit", DataType::Integer, "Limit")
            .with_constraints(InputConstraints::range(1.0, 100.0));

        assert!(input.validate(&json!(50)).is_ok());
        assert!(input.validate(&json!(150)).is_err());
        assert!(input.validate(&json!("ten")).is_err());
    }

    #[test]
    fn test_length_constraint() {
        let input = ToolInput::required("title", DataType::String, "Title")
            .with_constraints(InputConstraints::length(1, 5));

        assert!(input.validate(&json!("Fix")).is_ok());
        assert_eq!(
            input.validate(&json!("")).unwrap_err(),
            "title: string length 0 is less than 1"
        );
        assert!(input.validate(&json!("Broken login")).is_err());
        assert_eq!(input.to_schema()["maxLength"], json!(5));
    }

    #[test]
    fn test_email_constraint() {
        let input = ToolInput::required("email", DataType::String, "Email")
            .with_constraints(InputConstraints::email());

        assert!(input.validate(&json!("alex@startup.io")).is_ok());
        assert!(input.validate(&json!("not-an-email")).is_err());
        assert_eq!(input.to_schema()["format"], json!("email"));
    }

    #[test]
    fn test_missing_required_input() {
        let spec = ToolSpec::new()
            .with_input(ToolInput::required("repo", DataType::String, "Repository"));

        assert!(spec.validate_inputs(&json!({})).is_err());
        assert!(spec.validate_inputs(&json!({"repo": null})).is_err());
        assert!(spec.validate_inputs(&json!({"repo": "web"})).is_ok());
        assert!(spec.validate_inputs(&json!("web")).is_err());
    }

    #[test]
    fn test_apply_defaults_keeps_explicit_values() {
        let spec = ToolSpec::new()
            .with_input(
                ToolInput::optional("table", DataType::String, "Table").with_default(json!("users")),
            )
            .with_input(
                ToolInput::optional("limit", DataType::Integer, "Limit").with_default(json!(10)),
            );

        let filled = spec.apply_defaults(json!({"limit": 3}));
        assert_eq!(filled, json!({"limit": 3, "table": "users"}));
    }

    #[test]
    fn test_output_conformance() {
        let output = OutputSpec::list(vec![
            ToolOutput::new("id", DataType::String, "ID"),
            ToolOutput::new("name", DataType::String, "Name").nullable(),
            ToolOutput::new("note", DataType::String, "Note").optional(),
        ]);

        assert!(output.conforms(&json!([{"id": "a", "name": null}])).is_ok());
        assert!(output.conforms(&json!([{"name": "x"}])).is_err());
        assert!(output.conforms(&json!({"id": "a", "name": "x"})).is_err());
        assert_eq!(output.to_schema()["type"], json!("array"));
    }
}
