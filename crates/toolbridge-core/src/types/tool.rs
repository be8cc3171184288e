//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Content;

/// An operation advertised by a tool provider, tagged with its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name (unique key within the registry)
    pub name: String,
    /// Description of what the tool does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// Name of the provider that advertised this tool
    pub provider: String,
}

impl ToolDescriptor {
    /// Create a descriptor with no description or schema
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
            provider: provider.into(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Function declaration handed to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    /// Function name
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: Value,
}

/// Tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier for this tool call (may be empty for backends without ids)
    #[serde(default)]
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }

    /// Get an argument as a string
    pub fn get_arg_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Outcome of dispatching a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "lowercase")]
pub enum ToolExecutionResult {
    /// Provider result, unchanged
    Success(Content),
    /// Descriptive error text
    Error(String),
}

impl ToolExecutionResult {
    /// Create a successful result
    pub fn success(content: impl Into<Content>) -> Self {
        ToolExecutionResult::Success(content.into())
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        ToolExecutionResult::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolExecutionResult::Error(_))
    }

    /// The result as message content (errors become text)
    pub fn to_content(&self) -> Content {
        match self {
            ToolExecutionResult::Success(content) => content.clone(),
            ToolExecutionResult::Error(message) => Content::Text(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_creation() {
        let tool = ToolDescriptor::new("get_weather", "weather")
            .with_description("Get the current weather")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string" }
                },
                "required": ["location"]
            }));

        assert_eq!(tool.name, "get_weather");
        assert_eq!(tool.provider, "weather");
        assert!(tool.input_schema.is_some());
    }

    #[test]
    fn test_tool_call_args() {
        let call = ToolCall::new(
            "call_123",
            "drive_share",
            json!({
                "fileId": "abc",
                "role": "reader"
            }),
        );

        assert_eq!(call.get_arg_str("fileId"), Some("abc"));
        assert_eq!(call.get_arg_str("role"), Some("reader"));
        assert_eq!(call.get_arg_str("nonexistent"), None);
    }

    #[test]
    fn test_execution_result() {
        let success = ToolExecutionResult::success("72F, sunny");
        assert!(!success.is_error());
        assert_eq!(success.to_content(), Content::text("72F, sunny"));

        let error = ToolExecutionResult::error("Location not found");
        assert!(error.is_error());
        assert_eq!(error.to_content(), Content::text("Location not found"));
    }
}
