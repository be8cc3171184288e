//! MCP (Model Context Protocol) provider connections
//!
//! Uses the official rmcp SDK to talk to tool provider processes.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolbridge_core::mcp::{McpClient, ToolProvider};
//! use toolbridge_core::config::ProviderConfig;
//!
//! let config = ProviderConfig::stdio("files", "files-mcp", ["--root", "/tmp"]);
//! let mut client = McpClient::connect(&config, logger).await?;
//!
//! let tools = client.list_tools().await?;
//! let output = client.call_tool("read_file", json!({ "path": "/tmp/a.txt" })).await?;
//! client.close().await?;
//! ```

mod client;
mod mock;
mod traits;

pub use client::{McpClient, McpConnector};
pub use mock::{MockConnector, MockProbe, MockReply, MockToolProvider};
pub use traits::{
    AdvertisedTool, McpError, McpResult, ProviderConnector, ToolOutput, ToolProvider,
};
