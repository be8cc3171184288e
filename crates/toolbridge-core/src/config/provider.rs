//! Tool provider launch configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How to reach a tool provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum ProviderTransport {
    /// Spawn a child process and speak MCP over its stdin/stdout
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        env: Option<BTreeMap<String, String>>,
    },
    /// Connect to an already running provider over streamable HTTP
    Http { url: String },
}

/// Configuration for a single tool provider. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (key in the `mcpServers` table)
    pub name: String,
    #[serde(flatten)]
    pub transport: ProviderTransport,
}

impl ProviderConfig {
    /// A provider launched as a subprocess
    pub fn stdio(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            transport: ProviderTransport::Stdio {
                command: command.into(),
                args: args.into_iter().map(Into::into).collect(),
                env: None,
            },
        }
    }

    /// A provider reached over HTTP
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: ProviderTransport::Http { url: url.into() },
        }
    }

    /// Set environment overrides (stdio providers only)
    pub fn with_env(mut self, vars: BTreeMap<String, String>) -> Self {
        if let ProviderTransport::Stdio { ref mut env, .. } = self.transport {
            *env = Some(vars);
        }
        self
    }

    /// Short description of the launch target for logging
    pub fn target(&self) -> String {
        match &self.transport {
            ProviderTransport::Stdio { command, args, .. } if args.is_empty() => command.clone(),
            ProviderTransport::Stdio { command, args, .. } => {
                format!("{} {}", command, args.join(" "))
            }
            ProviderTransport::Http { url } => url.clone(),
        }
    }
}
