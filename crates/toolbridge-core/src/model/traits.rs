//! Model client trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::Turn;
use crate::types::{Content, FunctionSchema, Message, ToolCall, ToolExecutionResult};

use super::error::ModelResult;

/// One piece of a backend reply, in the order the backend produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyPart {
    Text { text: String },
    ToolCall(ToolCall),
}

/// Backend reply before interpretation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReply {
    pub parts: Vec<ReplyPart>,
}

impl RawReply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text part
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ReplyPart::Text { text: text.into() });
        self
    }

    /// Append a tool call part
    pub fn tool_call(mut self, id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        self.parts.push(ReplyPart::ToolCall(ToolCall::new(id, name, arguments)));
        self
    }
}

/// Interpreted reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReply {
    /// Structured content to append to history (absent for an empty reply)
    pub content: Option<Content>,
    /// Text segments, in order
    pub text_segments: Vec<String>,
    /// Requested tool calls, in order
    pub tool_calls: Vec<ToolCall>,
}

/// Model backend used by the orchestration loop
///
/// The loop only sees flattened turns and function declarations; everything
/// backend specific lives behind this trait.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Client name for logging (e.g., "genai", "scripted")
    fn name(&self) -> &str;

    /// Send the flattened history and available functions to the backend
    async fn create_message(
        &self,
        turns: &[Turn],
        functions: &[FunctionSchema],
    ) -> ModelResult<RawReply>;

    /// Split a raw reply into history content, text segments and tool calls
    fn parse_response(&self, raw: RawReply) -> ModelResult<ParsedReply> {
        Ok(parse_parts(raw))
    }

    /// Turn an execution result into the history message the backend expects
    fn parse_tool_result(&self, call: &ToolCall, result: &ToolExecutionResult) -> Message {
        Message::tool_result(Content::tool_result(
            Some(call.id.clone()),
            result.to_content(),
        ))
    }
}

/// Default reply interpretation
///
/// Text parts become text segments; tool calls are kept in order. The history
/// content is the sequence of all parts, with each tool call recorded as its
/// name and arguments so the model can see what it asked for.
pub fn parse_parts(raw: RawReply) -> ParsedReply {
    let mut parsed = ParsedReply::default();
    let mut content = Vec::with_capacity(raw.parts.len());

    for part in raw.parts {
        match part {
            ReplyPart::Text { text } => {
                content.push(Content::Text(text.clone()));
                parsed.text_segments.push(text);
            }
            ReplyPart::ToolCall(call) => {
                content.push(Content::Record(vec![
                    ("tool_call".to_string(), Content::Text(call.name.clone())),
                    ("arguments".to_string(), Content::Scalar(call.arguments.clone())),
                ]));
                parsed.tool_calls.push(call);
            }
        }
    }

    parsed.content = match content.len() {
        0 => None,
        1 => content.pop(),
        _ => Some(Content::Sequence(content)),
    };
    parsed
}
