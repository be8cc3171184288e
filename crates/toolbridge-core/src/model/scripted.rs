//! Scripted model client for testing
//!
//! Plays back a fixed list of replies, one per `create_message` call, and
//! records every request it receives. No network access.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::log_debug;
use crate::logging::{Logger, NoOpLogger};
use crate::normalize::Turn;
use crate::types::FunctionSchema;

use super::error::{ModelError, ModelResult};
use super::traits::{ModelClient, RawReply};

const CLIENT_NAME: &str = "scripted";

/// One scripted step
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    /// Answer with this reply
    Reply(RawReply),
    /// Fail the request
    Fail(String),
    /// Panic inside the request
    Panic(String),
}

/// A request as the client saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub turns: Vec<Turn>,
    pub functions: Vec<String>,
}

/// Deterministic model client
pub struct ScriptedModelClient {
    steps: Mutex<VecDeque<ScriptedStep>>,
    fallback: Option<RawReply>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    logger: Arc<dyn Logger>,
}

impl Default for ScriptedModelClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedModelClient {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            fallback: None,
            requests: Arc::new(Mutex::new(Vec::new())),
            logger: Arc::new(NoOpLogger),
        }
    }

    /// Queue a reply
    pub fn reply(self, reply: RawReply) -> Self {
        self.steps.lock().push_back(ScriptedStep::Reply(reply));
        self
    }

    /// Queue a failing request
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.steps.lock().push_back(ScriptedStep::Fail(message.into()));
        self
    }

    /// Queue a panicking request
    pub fn panic(self, message: impl Into<String>) -> Self {
        self.steps.lock().push_back(ScriptedStep::Panic(message.into()));
        self
    }

    /// Reply used whenever the queue is empty
    pub fn repeat(mut self, reply: RawReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of `create_message` calls so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    fn name(&self) -> &str {
        CLIENT_NAME
    }

    async fn create_message(
        &self,
        turns: &[Turn],
        functions: &[FunctionSchema],
    ) -> ModelResult<RawReply> {
        self.requests.lock().push(RecordedRequest {
            turns: turns.to_vec(),
            functions: functions.iter().map(|f| f.name.clone()).collect(),
        });

        let step = self.steps.lock().pop_front();
        log_debug!(
            self.logger,
            "[ScriptedModelClient] Step {:?}",
            step.as_ref().map(|s| match s {
                ScriptedStep::Reply(_) => "reply",
                ScriptedStep::Fail(_) => "fail",
                ScriptedStep::Panic(_) => "panic",
            })
        );

        match step {
            Some(ScriptedStep::Reply(reply)) => Ok(reply),
            Some(ScriptedStep::Fail(message)) => Err(ModelError::request(CLIENT_NAME, message)),
            Some(ScriptedStep::Panic(message)) => panic!("{}", message),
            None => self.fallback.clone().ok_or(ModelError::Exhausted {
                client: CLIENT_NAME.to_string(),
            }),
        }
    }
}
