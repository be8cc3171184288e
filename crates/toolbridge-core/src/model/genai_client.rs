//! Model client backed by the genai crate
//!
//! genai speaks to every major backend (Gemini, OpenAI, Anthropic, Ollama,
//! ...) and picks the adapter from the model name. API keys come from the
//! backend's usual environment variable (`GEMINI_API_KEY`, `OPENAI_API_KEY`,
//! ...).

use std::sync::Arc;

use async_trait::async_trait;
use genai::chat::{ChatMessage as GenaiMessage, ChatRequest, Tool as GenaiTool};
use genai::Client;

use crate::config::EngineSettings;
use crate::logging::Logger;
use crate::normalize::Turn;
use crate::types::{FunctionSchema, MessageRole, ToolCall};
use crate::{log_debug, log_info};

use super::error::{ModelError, ModelResult};
use super::traits::{ModelClient, RawReply, ReplyPart};

const CLIENT_NAME: &str = "genai";

/// Model client for any genai-supported backend
pub struct GenaiModelClient {
    client: Client,
    model: String,
    system_prompt: Option<String>,
    logger: Arc<dyn Logger>,
}

impl GenaiModelClient {
    /// Create a client for `model` (e.g., "gemini-2.0-flash", "gpt-4o-mini")
    pub fn new(model: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
            system_prompt: None,
            logger,
        }
    }

    /// Create a client from engine settings
    pub fn from_settings(settings: &EngineSettings, logger: Arc<dyn Logger>) -> Self {
        let mut client = Self::new(settings.model.clone(), logger);
        client.system_prompt = settings.system_prompt.clone();
        client
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, turns: &[Turn], functions: &[FunctionSchema]) -> ChatRequest {
        let mut request = ChatRequest::new(to_genai_messages(turns));
        if let Some(prompt) = &self.system_prompt {
            request = request.with_system(prompt.clone());
        }
        if !functions.is_empty() {
            request = request.with_tools(to_genai_tools(functions));
        }
        request
    }
}

/// Map flattened turns onto genai messages
///
/// Tool results go back as user text; the history already carries them as
/// plain text after normalization.
pub fn to_genai_messages(turns: &[Turn]) -> Vec<GenaiMessage> {
    turns
        .iter()
        .map(|turn| match turn.role {
            MessageRole::Assistant => GenaiMessage::assistant(turn.text.clone()),
            MessageRole::User | MessageRole::ToolResult => GenaiMessage::user(turn.text.clone()),
        })
        .collect()
}

/// Map function declarations onto genai tools
pub fn to_genai_tools(functions: &[FunctionSchema]) -> Vec<GenaiTool> {
    functions
        .iter()
        .map(|f| {
            GenaiTool::new(f.name.clone())
                .with_description(f.description.clone())
                .with_schema(f.parameters.clone())
        })
        .collect()
}

#[async_trait]
impl ModelClient for GenaiModelClient {
    fn name(&self) -> &str {
        CLIENT_NAME
    }

    async fn create_message(
        &self,
        turns: &[Turn],
        functions: &[FunctionSchema],
    ) -> ModelResult<RawReply> {
        log_info!(
            self.logger,
            "[GenaiModelClient] Requesting {} with {} turns, {} functions",
            self.model,
            turns.len(),
            functions.len()
        );

        let request = self.build_request(turns, functions);
        let response = self
            .client
            .exec_chat(self.model.as_str(), request, None)
            .await
            .map_err(|e| {
                self.logger
                    .error(&format!("[GenaiModelClient] Request failed: {}", e));
                ModelError::request(CLIENT_NAME, e.to_string())
            })?;

        let mut parts: Vec<ReplyPart> = response
            .texts()
            .into_iter()
            .map(|text| ReplyPart::Text {
                text: text.to_string(),
            })
            .collect();
        parts.extend(response.into_tool_calls().into_iter().map(|tc| {
            ReplyPart::ToolCall(ToolCall::new(tc.call_id, tc.fn_name, tc.fn_arguments))
        }));

        log_debug!(
            self.logger,
            "[GenaiModelClient] Reply has {} parts",
            parts.len()
        );
        Ok(RawReply { parts })
    }
}
