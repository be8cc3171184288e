//! The bounded conversation loop
//!
//! One call to [`Orchestrator::run_turn`] handles one user query:
//!
//! ```text
//!   AwaitModel ──► Interpret ──► Done
//!       ▲              │
//!       └── DispatchTools ◄┘   (at most `max_steps` model queries)
//! ```
//!
//! The turn works on a copy of the conversation while holding that
//! conversation's lock, and writes the copy back only when the turn
//! completes. A failed or panicking turn leaves the stored history as it was.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use uuid::Uuid;

use crate::config::DEFAULT_MAX_STEPS;
use crate::logging::Logger;
use crate::model::{ModelClient, ParsedReply};
use crate::normalize::{flatten, flatten_history};
use crate::session::SessionManager;
use crate::store::ConversationStore;
use crate::tools::ToolRegistry;
use crate::types::{FunctionSchema, Message, ToolCall, ToolExecutionResult};
use crate::{log_debug, log_info, log_warn};

use super::error::{ErrorPayload, OrchestratorError, OrchestratorResult};
use super::links::{rewrite_share_link, CallHook, DriveShareLink};
use super::request::{QueryRequest, QueryResponse};

enum LoopState {
    AwaitModel,
    Interpret(ParsedReply),
    DispatchTools(Vec<ToolCall>),
    Done,
}

/// Drives conversation turns against the model and the live providers
pub struct Orchestrator {
    sessions: Arc<SessionManager>,
    registry: Arc<ToolRegistry>,
    model: Arc<dyn ModelClient>,
    store: Arc<ConversationStore>,
    hooks: Vec<Arc<dyn CallHook>>,
    max_steps: usize,
    logger: Arc<dyn Logger>,
}

impl Orchestrator {
    /// Create an orchestrator with a fresh store and the default hooks
    pub fn new(
        sessions: Arc<SessionManager>,
        registry: Arc<ToolRegistry>,
        model: Arc<dyn ModelClient>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            sessions,
            registry,
            model,
            store: Arc::new(ConversationStore::new()),
            hooks: vec![Arc::new(DriveShareLink)],
            max_steps: DEFAULT_MAX_STEPS,
            logger,
        }
    }

    /// Share a conversation store
    pub fn with_store(mut self, store: Arc<ConversationStore>) -> Self {
        self.store = store;
        self
    }

    /// Replace the call hooks
    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn CallHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bound on model queries per turn (at least one)
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps.max(1);
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Run a turn, turning every failure into an error payload
    ///
    /// Panics inside the turn are caught here and reported as internal
    /// errors.
    pub async fn handle(&self, request: QueryRequest) -> Result<QueryResponse, ErrorPayload> {
        match AssertUnwindSafe(self.run_turn(request)).catch_unwind().await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => {
                self.logger
                    .error(&format!("[Orchestrator] Turn failed: {}", err));
                Err(err.into())
            }
            Err(panic) => {
                let err = OrchestratorError::internal(panic_message(panic.as_ref()));
                self.logger
                    .error(&format!("[Orchestrator] Turn panicked: {}", err));
                Err(err.into())
            }
        }
    }

    /// Run one conversation turn
    pub async fn run_turn(&self, request: QueryRequest) -> OrchestratorResult<QueryResponse> {
        let conversation_id = request
            .conversation_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut stored = self.store.lock(&conversation_id).await;
        let mut messages = stored.clone();
        messages.push(Message::user(request.text));

        let functions = self.registry.function_schemas();
        let mut responses = Vec::new();
        let mut steps = 0;
        let mut state = LoopState::AwaitModel;

        loop {
            state = match state {
                LoopState::AwaitModel => {
                    steps += 1;
                    let reply = self.query_model(&messages, &functions).await?;
                    LoopState::Interpret(reply)
                }
                LoopState::Interpret(reply) => {
                    if let Some(content) = reply.content {
                        messages.push(Message::assistant(content));
                    }
                    responses.extend(reply.text_segments.iter().map(|t| rewrite_share_link(t)));

                    if reply.tool_calls.is_empty() {
                        LoopState::Done
                    } else {
                        LoopState::DispatchTools(reply.tool_calls)
                    }
                }
                LoopState::DispatchTools(calls) => {
                    for call in &calls {
                        self.run_call(call, &mut responses, &mut messages).await;
                    }
                    if steps < self.max_steps {
                        LoopState::AwaitModel
                    } else {
                        log_info!(
                            self.logger,
                            "[Orchestrator] Step bound {} reached for {}",
                            self.max_steps, conversation_id
                        );
                        LoopState::Done
                    }
                }
                LoopState::Done => break,
            };
        }

        log_info!(
            self.logger,
            "[Orchestrator] Turn on {} finished after {} steps ({} responses)",
            conversation_id,
            steps,
            responses.len()
        );

        *stored = messages.clone();
        Ok(QueryResponse {
            conversation_id,
            responses,
            messages,
        })
    }

    async fn query_model(
        &self,
        messages: &[Message],
        functions: &[FunctionSchema],
    ) -> OrchestratorResult<ParsedReply> {
        let turns = flatten_history(messages);
        let raw = self.model.create_message(&turns, functions).await?;
        Ok(self.model.parse_response(raw)?)
    }

    async fn run_call(
        &self,
        call: &ToolCall,
        responses: &mut Vec<String>,
        messages: &mut Vec<Message>,
    ) {
        let result = self.execute(call).await;

        responses.push(invocation_note(call));
        responses.push(flatten(&result.to_content()));

        for hook in &self.hooks {
            let output = hook.after_call(call, &result);
            if !output.is_empty() {
                log_debug!(
                    self.logger,
                    "[Orchestrator] Hook '{}' fired for {}",
                    hook.name(),
                    call.name
                );
            }
            responses.extend(output.responses);
            messages.extend(output.messages);
        }

        messages.push(self.model.parse_tool_result(call, &result));
    }

    async fn execute(&self, call: &ToolCall) -> ToolExecutionResult {
        let descriptor = match self.registry.resolve(&call.name) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                log_warn!(self.logger, "[Orchestrator] {}", err);
                return ToolExecutionResult::error(err.to_string());
            }
        };

        self.sessions
            .dispatch(&descriptor.provider, &call.name, call.arguments.clone())
            .await
    }
}

/// Human-readable note recorded for every tool invocation
pub fn invocation_note(call: &ToolCall) -> String {
    format!("[Calling tool {} with args {}]", call.name, call.arguments)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "turn panicked".to_string()
    }
}
