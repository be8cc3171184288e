//! Turn request and response bodies

use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Incoming user query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub text: String,
    /// Existing conversation to continue; a new one is started when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl QueryRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conversation_id: None,
        }
    }

    pub fn in_conversation(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }
}

/// Result of a completed turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub conversation_id: String,
    /// Text for the user, in the order it was produced
    pub responses: Vec<String>,
    /// Full conversation history after the turn
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let request: QueryRequest = serde_json::from_value(json!({"text": "hi"})).unwrap();
        assert_eq!(request, QueryRequest::new("hi"));

        let continued = QueryRequest::new("again").in_conversation("c-1");
        assert_eq!(
            serde_json::to_value(&continued).unwrap(),
            json!({"text": "again", "conversation_id": "c-1"})
        );
    }

    #[test]
    fn test_response_wire_format() {
        let response = QueryResponse {
            conversation_id: "c-1".into(),
            responses: vec!["Hello".into()],
            messages: vec![Message::user("hi")],
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "conversation_id": "c-1",
                "responses": ["Hello"],
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }
}
