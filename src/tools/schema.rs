//! Declared parameter schemas for function tools.
//!
//! Schemas are advertised to the remote service only; arguments are checked
//! locally by decoding them into each tool's typed input.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON type of a single parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    /// A string restricted to the listed values.
    Enum(Vec<String>),
}

/// One named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
}

/// Ordered set of named parameters for a tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    params: Vec<Parameter>,
}

impl ParameterSchema {
    /// A tool that takes no arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn required(mut self, name: &str, kind: ParamType, description: &str) -> Self {
        self.params.push(Parameter {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        });
        self
    }

    /// Add an optional parameter.
    pub fn optional(mut self, name: &str, kind: ParamType, description: &str) -> Self {
        self.params.push(Parameter {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
        });
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Render as a JSON Schema object in the function-calling format.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for p in &self.params {
            let mut prop = match &p.kind {
                ParamType::String => json!({ "type": "string" }),
                ParamType::Number => json!({ "type": "number" }),
                ParamType::Integer => json!({ "type": "integer" }),
                ParamType::Boolean => json!({ "type": "boolean" }),
                ParamType::Enum(values) => json!({ "type": "string", "enum": values }),
            };
            if !p.description.is_empty() {
                prop["description"] = Value::String(p.description.clone());
            }
            properties.insert(p.name.clone(), prop);
            if p.required {
                required.push(Value::String(p.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_schema() {
        let v = ParameterSchema::empty().to_json_schema();
        assert_eq!(v["type"], "object");
        assert!(v["properties"].as_object().unwrap().is_empty());
        assert!(v["required"].as_array().unwrap().is_empty());
        assert_eq!(v["additionalProperties"], false);
    }

    #[test]
    fn test_required_and_enum() {
        let schema = ParameterSchema::empty()
            .required("location", ParamType::String, "The city and state")
            .optional(
                "unit",
                ParamType::Enum(vec!["Celsius".into(), "Fahrenheit".into()]),
                "",
            );
        let v = schema.to_json_schema();

        assert_eq!(v["properties"]["location"]["type"], "string");
        assert_eq!(v["properties"]["location"]["description"], "The city and state");
        assert_eq!(v["properties"]["unit"]["enum"][1], "Fahrenheit");
        assert!(v["properties"]["unit"].get("description").is_none());
        assert_eq!(v["required"], json!(["location"]));
    }
}
