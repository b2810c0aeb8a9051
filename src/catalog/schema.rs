//! Tool schema descriptors in the OpenAI-compatible `{type, function}` shape.

use crate::error::{Result, ToolCallError};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;

/// One entry of the tool catalog as offered to the model.
///
/// The entry is kept exactly as it was submitted, including keys this crate
/// does not interpret (`strict`, vendor extensions), so the model sees what
/// the operator wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolSchema(Value);

impl ToolSchema {
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self(json!({
            "type": "function",
            "function": {
                "name": name,
                "description": description,
                "parameters": parameters,
            }
        }))
    }

    pub fn name(&self) -> &str {
        self.0["function"]["name"].as_str().unwrap_or_default()
    }

    pub fn description(&self) -> Option<&str> {
        self.0["function"]["description"].as_str()
    }

    /// JSON-schema object describing the arguments, if one was given.
    pub fn parameters(&self) -> Option<&Value> {
        self.0["function"].get("parameters")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Validate a replacement payload, rejecting the whole batch on the first
/// structural problem.
///
/// Each element must be an object with `type` and `function` keys. `function`
/// must be an object with a string `name`, and optionally a string
/// `description` and an object `parameters`. Names must be unique. The
/// parameter schema itself is not checked, and accepted elements are stored
/// unchanged.
pub fn parse_catalog(elements: &[Value]) -> Result<Vec<ToolSchema>> {
    let mut seen = HashSet::new();
    let mut tools = Vec::with_capacity(elements.len());

    for (index, element) in elements.iter().enumerate() {
        let invalid = |reason: String| ToolCallError::InvalidSchema { index, reason };

        let obj = element
            .as_object()
            .ok_or_else(|| invalid("expected an object".into()))?;
        for key in ["type", "function"] {
            if !obj.contains_key(key) {
                return Err(invalid(format!("missing key '{}'", key)));
            }
        }

        let function = obj["function"]
            .as_object()
            .ok_or_else(|| invalid("'function' must be an object".into()))?;
        let name = match function.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name,
            Some(Value::String(_)) => return Err(invalid("'function.name' is empty".into())),
            Some(_) => return Err(invalid("'function.name' must be a string".into())),
            None => return Err(invalid("missing key 'function.name'".into())),
        };
        if function.get("description").is_some_and(|d| !d.is_string()) {
            return Err(invalid("'function.description' must be a string".into()));
        }
        if function.get("parameters").is_some_and(|p| !p.is_object()) {
            return Err(invalid("'function.parameters' must be an object".into()));
        }

        if !seen.insert(name.as_str()) {
            return Err(invalid(format!("duplicate tool name '{}'", name)));
        }
        tools.push(ToolSchema(element.clone()));
    }

    Ok(tools)
}

/// The catalog every new serving context starts from.
pub fn default_catalog() -> Vec<ToolSchema> {
    vec![
        ToolSchema::function(
            "get_current_temperature",
            "Get the current temperature for a specific location",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The city and state, e.g., San Francisco, CA"
                    },
                    "unit": {
                        "type": "string",
                        "enum": ["Celsius", "Fahrenheit"],
                        "description": "The temperature unit to use"
                    }
                },
                "required": ["location", "unit"]
            }),
        ),
        ToolSchema::function(
            "get_rain_probability",
            "Get the probability of rain for a specific location",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The city and state, e.g., San Francisco, CA"
                    }
                },
                "required": ["location"]
            }),
        ),
    ]
}
