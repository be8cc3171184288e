//! Message normalization
//!
//! Flattens structured message content into the plain text turns a model
//! client consumes. The flattening is a total recursive match over
//! [`Content`]:
//!
//! 1. `Text` yields the text itself.
//! 2. `ToolResult` yields the flattening of its embedded content.
//! 3. `Sequence` yields its elements' flattenings joined by newlines.
//! 4. `Record` yields its field values' flattenings joined by newlines
//!    (field names are dropped).
//! 5. `Scalar` yields the leaf's plain-text form.

use serde::{Deserialize, Serialize};

use crate::types::{scalar_text, Content, Message, MessageRole};

/// One flattened history entry as handed to the model client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    pub text: String,
}

impl Turn {
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Flatten content into a single string
pub fn flatten(content: &Content) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::ToolResult { content, .. } => flatten(content),
        Content::Sequence(items) => join_lines(items.iter()),
        Content::Record(fields) => join_lines(fields.iter().map(|(_, v)| v)),
        Content::Scalar(value) => scalar_text(value),
    }
}

fn join_lines<'a>(items: impl Iterator<Item = &'a Content>) -> String {
    items.map(flatten).collect::<Vec<_>>().join("\n")
}

/// Flatten a single message, keeping its role
pub fn flatten_message(message: &Message) -> Turn {
    Turn {
        role: message.role,
        text: flatten(&message.content),
    }
}

/// Flatten a full conversation history
pub fn flatten_history(messages: &[Message]) -> Vec<Turn> {
    messages.iter().map(flatten_message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_flat_text_is_unchanged() {
        let text = "already flat\nwith two lines";
        assert_eq!(flatten(&Content::text(text)), text);
        assert_eq!(flatten(&Content::text("")), "");
    }

    #[test]
    fn test_flattening_is_idempotent_on_its_output() {
        let content = Content::from(json!([{"text": "a"}, {"x": 1, "y": "b"}]));
        let once = flatten(&content);
        assert_eq!(flatten(&Content::text(once.clone())), once);
    }

    #[test]
    fn test_text_singleton_wrapper() {
        assert_eq!(flatten(&Content::from(json!({"text": "hello"}))), "hello");
    }

    #[test]
    fn test_tool_result_wrapper_unwraps() {
        let content = Content::from(json!({
            "type": "tool_result",
            "tool_use_id": "call_1",
            "content": {"text": "file saved"}
        }));
        assert_eq!(flatten(&content), "file saved");
    }

    #[test]
    fn test_sequence_of_tool_results() {
        let content = Content::from(json!([
            {"type": "tool_result", "content": "first"},
            {"type": "tool_result", "content": [{"text": "second"}, {"text": "third"}]}
        ]));
        assert_eq!(flatten(&content), "first\nsecond\nthird");
    }

    #[test]
    fn test_tool_result_list_with_missing_content() {
        let content = Content::from(json!([
            {"type": "tool_result", "tool_use_id": "a"},
            {"type": "tool_result", "content": "x"}
        ]));
        assert_eq!(flatten(&content), "\nx");
    }

    #[test]
    fn test_mixed_sequence() {
        let content = Content::Sequence(vec![
            Content::text("a"),
            Content::Scalar(json!(2)),
            Content::tool_result(None, "b"),
        ]);
        assert_eq!(flatten(&content), "a\n2\nb");
    }

    #[test]
    fn test_record_drops_field_names() {
        let content = Content::Record(vec![
            ("name".to_string(), Content::text("report.pdf")),
            ("size".to_string(), Content::Scalar(json!(1024))),
        ]);
        assert_eq!(flatten(&content), "report.pdf\n1024");
    }

    #[test]
    fn test_parsed_object_flattens_in_provider_order() {
        let value: Value =
            serde_json::from_str(r#"{"name":"report.pdf","id":"1AbC","size":10}"#).unwrap();
        assert_eq!(flatten(&Content::from(value)), "report.pdf\n1AbC\n10");
    }

    #[test]
    fn test_scalar_leaves() {
        assert_eq!(flatten(&Content::Scalar(json!(true))), "true");
        assert_eq!(flatten(&Content::Scalar(json!(1.5))), "1.5");
        assert_eq!(flatten(&Content::Scalar(Value::Null)), "null");
        assert_eq!(flatten(&Content::Scalar(json!("quoted?"))), "quoted?");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(flatten(&Content::Sequence(vec![])), "");
        assert_eq!(flatten(&Content::Record(vec![])), "");
    }

    #[test]
    fn test_flatten_history_keeps_roles() {
        let history = vec![
            Message::user("find my report"),
            Message::assistant(Content::from(json!([{"text": "searching"}]))),
            Message::tool_result(Content::tool_result(Some("c1".into()), "report.pdf")),
        ];

        let turns = flatten_history(&history);
        assert_eq!(
            turns,
            vec![
                Turn::new(MessageRole::User, "find my report"),
                Turn::new(MessageRole::Assistant, "searching"),
                Turn::new(MessageRole::ToolResult, "report.pdf"),
            ]
        );
    }
}
