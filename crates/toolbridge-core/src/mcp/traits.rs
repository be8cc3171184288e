//! Tool provider abstractions
//!
//! `ToolProvider` is one live channel to a provider process; the session
//! manager only ever talks to providers through this trait, and creates them
//! through a `ProviderConnector`.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::types::Content;

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("Connection closed: {0}")]
    Closed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// An operation as advertised by a provider, before it is tagged with its owner
#[derive(Debug, Clone, PartialEq)]
pub struct AdvertisedTool {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

impl AdvertisedTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Result payload of a `tools/call`
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Result content
    pub content: Content,
    /// Whether the provider flagged the result as an error
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(content: impl Into<Content>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn failed(content: impl Into<Content>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// A live, initialized connection to one tool provider
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Whether the underlying channel is still open
    fn is_alive(&self) -> bool;

    /// List the operations this provider exposes
    async fn list_tools(&self) -> McpResult<Vec<AdvertisedTool>>;

    /// Invoke an operation by name
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput>;

    /// Release the channel. Calling it again is a no-op.
    async fn close(&mut self) -> McpResult<()>;
}

/// Establishes provider connections (launch + handshake)
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    async fn connect(&self, config: &ProviderConfig) -> McpResult<Box<dyn ToolProvider>>;
}
