//! Mock tool providers for testing
//!
//! Deterministic, in-process stand-ins for provider processes. A
//! `MockConnector` hands out registered `MockToolProvider`s by name and fails
//! for every other name, which is enough to exercise partial-failure startup,
//! dispatch and shutdown without spawning anything.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::types::Content;

use super::traits::{
    AdvertisedTool, McpError, McpResult, ProviderConnector, ToolOutput, ToolProvider,
};

/// Canned reply for one tool
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful result
    Ok(Content),
    /// Result flagged `isError` by the provider
    ToolError(String),
    /// Transport/protocol failure
    Fail(String),
}

/// Shared view of what a mock provider has seen
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
    closed: Arc<AtomicBool>,
    closed_mid_call: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockProbe {
    /// Calls received, in order
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Whether `close` ever ran while a call was still executing
    pub fn closed_mid_call(&self) -> bool {
        self.closed_mid_call.load(Ordering::SeqCst)
    }

    /// Highest number of calls ever observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Mock tool provider
pub struct MockToolProvider {
    name: String,
    tools: Vec<AdvertisedTool>,
    replies: HashMap<String, MockReply>,
    fail_listing: bool,
    fail_close: bool,
    delay: Option<Duration>,
    probe: MockProbe,
}

impl MockToolProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: Vec::new(),
            replies: HashMap::new(),
            fail_listing: false,
            fail_close: false,
            delay: None,
            probe: MockProbe::default(),
        }
    }

    /// Advertise a tool with a description and an empty object schema
    pub fn with_tool(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.tools.push(
            AdvertisedTool::new(name)
                .with_description(description)
                .with_schema(serde_json::json!({ "type": "object", "properties": {} })),
        );
        self
    }

    /// Advertise an arbitrary tool definition
    pub fn with_advertised(mut self, tool: AdvertisedTool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set the reply for a tool
    pub fn with_reply(mut self, tool: impl Into<String>, reply: MockReply) -> Self {
        self.replies.insert(tool.into(), reply);
        self
    }

    /// Make `tools/list` fail
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make `close` fail (the channel is still released)
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Sleep inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Observer that stays valid after the provider is moved into a session
    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

#[async_trait]
impl ToolProvider for MockToolProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_alive(&self) -> bool {
        !self.probe.is_closed()
    }

    async fn list_tools(&self) -> McpResult<Vec<AdvertisedTool>> {
        if self.fail_listing {
            return Err(McpError::Protocol(format!("{}: tools/list failed", self.name)));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        let now = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.probe.calls.lock().push((name.to_string(), arguments.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = match self.replies.get(name) {
            Some(MockReply::Ok(content)) => Ok(ToolOutput::ok(content.clone())),
            Some(MockReply::ToolError(message)) => Ok(ToolOutput::failed(message.as_str())),
            Some(MockReply::Fail(message)) => Err(McpError::ToolCallFailed(message.clone())),
            None => Ok(ToolOutput::ok(format!("{} -> {}", name, arguments))),
        };

        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }

    async fn close(&mut self) -> McpResult<()> {
        if self.probe.in_flight.load(Ordering::SeqCst) > 0 {
            self.probe.closed_mid_call.store(true, Ordering::SeqCst);
        }
        self.probe.closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err(McpError::Protocol(format!("{}: close failed", self.name)));
        }
        Ok(())
    }
}

/// Connector that hands out registered mock providers
#[derive(Default)]
pub struct MockConnector {
    providers: Mutex<HashMap<String, MockToolProvider>>,
    unavailable: HashSet<String>,
    attempts: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider that connects successfully
    pub fn with_provider(self, provider: MockToolProvider) -> Self {
        self.providers.lock().insert(provider.name.clone(), provider);
        self
    }

    /// Register a provider name whose launch fails
    pub fn with_unavailable(mut self, name: impl Into<String>) -> Self {
        self.unavailable.insert(name.into());
        self
    }

    /// Number of connect attempts made so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderConnector for MockConnector {
    async fn connect(&self, config: &ProviderConfig) -> McpResult<Box<dyn ToolProvider>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.contains(&config.name) {
            return Err(McpError::ConnectionFailed(format!(
                "{}: failed to launch {}",
                config.name,
                config.target()
            )));
        }

        match self.providers.lock().remove(&config.name) {
            Some(provider) => Ok(Box::new(provider)),
            None => Err(McpError::InitializationFailed(format!(
                "{}: no mock registered",
                config.name
            ))),
        }
    }
}
