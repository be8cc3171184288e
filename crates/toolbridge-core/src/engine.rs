//! Engine bootstrap
//!
//! Wires configuration, provider sessions, the tool registry and the
//! orchestrator together. `start` brings every reachable provider up once;
//! `shutdown` releases them. Both are safe to call more than once.

use std::path::Path;
use std::sync::Arc;

use crate::config::{
    resolve_config_path, ConfigFile, ConfigResult, EngineSettings, EnvSecretSource, ProviderConfig,
};
use crate::log_info;
use crate::logging::Logger;
use crate::mcp::{McpConnector, ProviderConnector};
use crate::model::{GenaiModelClient, ModelClient};
use crate::orchestrator::{ErrorPayload, Orchestrator, QueryRequest, QueryResponse};
use crate::session::{InitReport, SessionManager, ShutdownReport};
use crate::tools::ToolRegistry;

/// A running tool-orchestration engine
pub struct Engine {
    sessions: Arc<SessionManager>,
    orchestrator: Orchestrator,
    init_report: InitReport,
    logger: Arc<dyn Logger>,
}

impl Engine {
    /// Start from a loaded config file with real MCP providers
    pub async fn start(
        config: &ConfigFile,
        model: Arc<dyn ModelClient>,
        logger: Arc<dyn Logger>,
    ) -> ConfigResult<Self> {
        let providers = config.providers()?;
        let connector = Arc::new(McpConnector::new(Arc::clone(&logger)));
        Ok(Self::start_with(connector, &providers, &config.engine, model, logger).await)
    }

    /// Resolve and load the config file, then start with a genai model client
    ///
    /// `model` overrides the model named in the file.
    pub async fn from_config_path(
        path: Option<&Path>,
        model: Option<&str>,
        logger: Arc<dyn Logger>,
    ) -> ConfigResult<Self> {
        let path = resolve_config_path(path)?;
        log_info!(logger, "[Engine] Loading configuration from {}", path.display());

        let mut config = ConfigFile::load(&path, &EnvSecretSource::new())?;
        if let Some(model) = model {
            config.engine.model = model.to_string();
        }

        let client = Arc::new(GenaiModelClient::from_settings(
            &config.engine,
            Arc::clone(&logger),
        ));
        Self::start(&config, client, logger).await
    }

    /// Start with an explicit connector and provider list
    pub async fn start_with(
        connector: Arc<dyn ProviderConnector>,
        providers: &[ProviderConfig],
        settings: &EngineSettings,
        model: Arc<dyn ModelClient>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let sessions = Arc::new(SessionManager::new(connector, Arc::clone(&logger)));
        let init_report = sessions.initialize(providers).await;

        let registry = Arc::new(ToolRegistry::build(
            sessions.list_operations().await,
            Arc::clone(&logger),
        ));

        log_info!(
            logger,
            "[Engine] Started with model client '{}' ({} tools, {} providers unavailable)",
            model.name(),
            registry.len(),
            init_report.failed.len()
        );

        let orchestrator = Orchestrator::new(
            Arc::clone(&sessions),
            registry,
            model,
            Arc::clone(&logger),
        )
        .with_max_steps(settings.max_steps);

        Self {
            sessions,
            orchestrator,
            init_report,
            logger,
        }
    }

    /// Handle one user query
    pub async fn handle(&self, request: QueryRequest) -> Result<QueryResponse, ErrorPayload> {
        self.orchestrator.handle(request).await
    }

    /// Providers that connected and failed at startup
    pub fn init_report(&self) -> &InitReport {
        &self.init_report
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.orchestrator.registry()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Release every provider connection
    pub async fn shutdown(&self) -> ShutdownReport {
        log_info!(self.logger, "[Engine] Shutting down");
        self.sessions.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, MemorySecretSource};
    use crate::logging::NoOpLogger;
    use crate::mcp::{MockConnector, MockToolProvider};
    use crate::model::{RawReply, ScriptedModelClient};
    use serde_json::json;

    fn providers() -> Vec<ProviderConfig> {
        vec![
            ProviderConfig::stdio("drive", "drive-mcp", Vec::<String>::new()),
            ProviderConfig::stdio("mail", "mail-mcp", Vec::<String>::new()),
        ]
    }

    #[tokio::test]
    async fn test_engine_survives_unavailable_provider() {
        let connector = MockConnector::new()
            .with_provider(MockToolProvider::new("drive").with_tool("drive_search", "Search"))
            .with_unavailable("mail");
        let model = ScriptedModelClient::new()
            .reply(RawReply::new().tool_call("c1", "drive_search", json!({"q": "x"})))
            .reply(RawReply::new().text("done"));

        let engine = Engine::start_with(
            Arc::new(connector),
            &providers(),
            &EngineSettings::default(),
            Arc::new(model),
            Arc::new(NoOpLogger),
        )
        .await;

        assert_eq!(engine.init_report().connected, vec!["drive"]);
        assert_eq!(engine.registry().providers(), vec!["drive"]);

        let response = engine.handle(QueryRequest::new("search")).await.unwrap();
        assert_eq!(response.responses.last().unwrap(), "done");

        let report = engine.shutdown().await;
        assert_eq!(report.closed, vec!["drive"]);
        assert_eq!(engine.shutdown().await, ShutdownReport::default());
    }

    #[tokio::test]
    async fn test_settings_bound_steps() {
        let model = Arc::new(
            ScriptedModelClient::new()
                .repeat(RawReply::new().tool_call("c", "drive_search", json!({}))),
        );
        let engine = Engine::start_with(
            Arc::new(MockConnector::new().with_provider(
                MockToolProvider::new("drive").with_tool("drive_search", "Search"),
            )),
            &providers()[..1],
            &EngineSettings::default().with_max_steps(3),
            model.clone(),
            Arc::new(NoOpLogger),
        )
        .await;

        engine.handle(QueryRequest::new("loop")).await.unwrap();
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_server_entry() {
        let config = ConfigFile::from_json_str(
            r#"{"mcpServers": {"broken": {"args": ["x"]}}}"#,
            &MemorySecretSource::new(),
        )
        .unwrap();

        let result = Engine::start(
            &config,
            Arc::new(ScriptedModelClient::new()),
            Arc::new(NoOpLogger),
        )
        .await;
        assert!(matches!(result, Err(ConfigError::InvalidServer { .. })));
    }

    #[tokio::test]
    async fn test_missing_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");

        let result = Engine::from_config_path(Some(&missing), None, Arc::new(NoOpLogger)).await;
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
