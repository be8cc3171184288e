//! Conversation message types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    ToolResult,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::ToolResult => write!(f, "tool_result"),
        }
    }
}

/// A single entry in a conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: MessageRole,
    /// The content of the message (text or structured payload)
    pub content: Content,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Content::Text(text.into()),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<Content>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a tool result message
    pub fn tool_result(content: impl Into<Content>) -> Self {
        Self {
            role: MessageRole::ToolResult,
            content: content.into(),
        }
    }

    /// Get the text content if this is a plain text message
    pub fn text(&self) -> Option<&str> {
        self.content.as_text()
    }
}

/// Structured message content.
///
/// A closed recursive tree: text leaves, tool-result wrappers, ordered
/// sequences, records of named fields and scalar leaves. Untyped JSON coming
/// from providers or model backends is lifted into this shape with
/// `Content::from(Value)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Plain text (also the lifted form of a `{"text": ...}` singleton)
    Text(String),
    /// Wrapper around the output of a tool invocation
    ToolResult {
        tool_use_id: Option<String>,
        content: Box<Content>,
    },
    /// Ordered sequence of nodes
    Sequence(Vec<Content>),
    /// Generic node with named fields, in insertion order
    Record(Vec<(String, Content)>),
    /// Opaque leaf (number, bool, null, or a payload kept whole as JSON)
    Scalar(Value),
}

impl Content {
    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }

    /// Wrap content as a tool result
    pub fn tool_result(tool_use_id: Option<String>, content: impl Into<Content>) -> Self {
        Content::ToolResult {
            tool_use_id,
            content: Box::new(content.into()),
        }
    }

    /// Get the text if this is a text node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert back into untyped JSON
    pub fn to_value(&self) -> Value {
        match self {
            Content::Text(s) => Value::String(s.clone()),
            Content::ToolResult {
                tool_use_id,
                content,
            } => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), Value::String("tool_result".to_string()));
                if let Some(id) = tool_use_id {
                    obj.insert("tool_use_id".to_string(), Value::String(id.clone()));
                }
                obj.insert("content".to_string(), content.to_value());
                Value::Object(obj)
            }
            Content::Sequence(items) => Value::Array(items.iter().map(Content::to_value).collect()),
            Content::Record(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Content::Scalar(v) => v.clone(),
        }
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Content::Text(s),
            Value::Array(items) => {
                // A list made only of tool results unwraps every element,
                // even one that carries no content.
                let all_results = items.iter().all(is_tool_result_node);
                Content::Sequence(
                    items
                        .into_iter()
                        .map(|item| {
                            if all_results {
                                lift_tool_result(item)
                            } else {
                                Content::from(item)
                            }
                        })
                        .collect(),
                )
            }
            Value::Object(mut obj) => {
                if obj.len() == 1 && obj.contains_key("text") {
                    let text = obj.remove("text").unwrap_or(Value::Null);
                    return Content::Text(scalar_text(&text));
                }
                if obj.get("type").and_then(Value::as_str) == Some("tool_result") {
                    if let Some(inner) = obj.remove("content") {
                        let tool_use_id = obj
                            .get("tool_use_id")
                            .and_then(Value::as_str)
                            .map(str::to_string);
                        return Content::ToolResult {
                            tool_use_id,
                            content: Box::new(Content::from(inner)),
                        };
                    }
                }
                Content::Record(obj.into_iter().map(|(k, v)| (k, Content::from(v))).collect())
            }
            other => Content::Scalar(other),
        }
    }
}

fn is_tool_result_node(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("tool_result")
}

fn lift_tool_result(value: Value) -> Content {
    match value {
        Value::Object(mut obj) => {
            let content = obj
                .remove("content")
                .map(Content::from)
                .unwrap_or_else(|| Content::text(""));
            Content::ToolResult {
                tool_use_id: obj
                    .get("tool_use_id")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                content: Box::new(content),
            }
        }
        other => Content::from(other),
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<Vec<Content>> for Content {
    fn from(items: Vec<Content>) -> Self {
        Content::Sequence(items)
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Content::from)
    }
}

/// Plain-text rendering of a JSON leaf: strings unquoted, everything else in
/// its JSON form.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
