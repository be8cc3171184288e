//! MCP Client using the official rmcp SDK
//!
//! Connects to tool providers over a spawned child process (stdio) or HTTP.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        RawContent, Tool,
    },
    service::RunningService,
    transport::TokioChildProcess,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::process::Command;

use crate::config::{ProviderConfig, ProviderTransport};
use crate::logging::Logger;
use crate::types::Content;
use crate::{log_debug, log_info};

use super::traits::{
    AdvertisedTool, McpError, McpResult, ProviderConnector, ToolOutput, ToolProvider,
};

/// MCP client for one tool provider
pub struct McpClient {
    /// Provider name from configuration
    name: String,
    /// The underlying rmcp running service; `None` once closed
    client: Option<RunningService<RoleClient, ClientInfo>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Connect using the transport named in the provider config
    pub async fn connect(config: &ProviderConfig, logger: Arc<dyn Logger>) -> McpResult<Self> {
        match &config.transport {
            ProviderTransport::Stdio { command, args, env } => {
                Self::connect_stdio(&config.name, command, args, env.as_ref(), logger).await
            }
            ProviderTransport::Http { url } => Self::connect_http(&config.name, url, logger).await,
        }
    }

    /// Spawn a provider process and speak MCP over its stdin/stdout
    ///
    /// `env` entries are applied on top of the inherited environment.
    pub async fn connect_stdio(
        name: &str,
        command: &str,
        args: &[String],
        env: Option<&BTreeMap<String, String>>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        log_info!(
            logger,
            "[McpClient] Launching provider '{}': {} {}",
            name,
            command,
            args.join(" ")
        );

        let mut cmd = Command::new(command);
        cmd.args(args);
        if let Some(env) = env {
            cmd.envs(env);
        }

        let transport = TokioChildProcess::new(cmd)
            .map_err(|e| McpError::ConnectionFailed(format!("{}: {}", command, e)))?;

        let client = Self::client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        log_info!(logger, "[McpClient] Provider '{}' initialized", name);

        Ok(Self {
            name: name.to_string(),
            client: Some(client),
            logger,
        })
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(name: &str, url: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        use rmcp::transport::StreamableHttpClientTransport;

        log_info!(logger, "[McpClient] Connecting provider '{}' over HTTP: {}", name, url);

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = Self::client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        log_info!(logger, "[McpClient] Provider '{}' initialized", name);

        Ok(Self {
            name: name.to_string(),
            client: Some(client),
            logger,
        })
    }

    fn client_info() -> ClientInfo {
        ClientInfo {
            meta: None,
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "toolbridge-core".to_string(),
                title: Some("Toolbridge".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
        }
    }

    fn service(&self) -> McpResult<&RunningService<RoleClient, ClientInfo>> {
        self.client
            .as_ref()
            .ok_or_else(|| McpError::Closed(self.name.clone()))
    }
}

#[async_trait]
impl ToolProvider for McpClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_alive(&self) -> bool {
        self.client.is_some()
    }

    async fn list_tools(&self) -> McpResult<Vec<AdvertisedTool>> {
        let result = self
            .service()?
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        log_debug!(
            self.logger,
            "[McpClient] '{}' listed {} tools",
            self.name,
            result.tools.len()
        );

        Ok(result.tools.into_iter().map(advertised_tool).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        self.logger
            .info(&format!("[McpClient] '{}' calling tool: {}", self.name, name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result = self
            .service()?
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))?;

        Ok(tool_output(result))
    }

    async fn close(&mut self) -> McpResult<()> {
        if let Some(client) = self.client.take() {
            self.logger
                .info(&format!("[McpClient] Closing provider '{}'", self.name));
            client
                .cancel()
                .await
                .map_err(|e| McpError::Protocol(e.to_string()))?;
        }
        Ok(())
    }
}

fn advertised_tool(tool: Tool) -> AdvertisedTool {
    AdvertisedTool {
        name: tool.name.to_string(),
        description: tool.description.map(|s| s.to_string()),
        input_schema: Some(Value::Object(tool.input_schema.as_ref().clone())),
    }
}

/// Lift an MCP call result into message content. Text parts become text
/// nodes; any other part keeps its JSON shape.
fn tool_output(result: CallToolResult) -> ToolOutput {
    let parts: Vec<Content> = result
        .content
        .iter()
        .map(|c| match &c.raw {
            RawContent::Text(t) => Content::Text(t.text.clone()),
            other => serde_json::to_value(other)
                .map(Content::from)
                .unwrap_or_else(|e| Content::Text(format!("<unreadable content: {}>", e))),
        })
        .collect();

    let content = match parts.len() {
        1 => parts.into_iter().next().unwrap_or(Content::Sequence(Vec::new())),
        _ => Content::Sequence(parts),
    };

    ToolOutput {
        content,
        is_error: result.is_error.unwrap_or(false),
    }
}

/// Default connector: real MCP providers through rmcp
pub struct McpConnector {
    logger: Arc<dyn Logger>,
}

impl McpConnector {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl ProviderConnector for McpConnector {
    async fn connect(&self, config: &ProviderConfig) -> McpResult<Box<dyn ToolProvider>> {
        let client = McpClient::connect(config, Arc::clone(&self.logger)).await?;
        Ok(Box::new(client))
    }
}
