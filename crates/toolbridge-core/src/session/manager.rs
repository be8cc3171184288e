//! Session manager for tool provider connections
//!
//! Owns every provider connection for the lifetime of the engine. Startup
//! attempts each configured provider independently; a provider that fails to
//! launch or handshake is logged and left out, never aborting the others.
//! After startup each connection is a single shared channel, so dispatches to
//! the same provider are serialized behind a per-connection async mutex.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ProviderConfig;
use crate::logging::Logger;
use crate::mcp::{ProviderConnector, ToolProvider};
use crate::normalize::flatten;
use crate::types::{ToolDescriptor, ToolExecutionResult};
use crate::{log_debug, log_error, log_info, log_warn};

/// Lifecycle of a session manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// `initialize` has not run yet
    Idle,
    /// Connections established; dispatch accepted
    Live,
    /// `shutdown` has run; everything released
    ShutDown,
}

/// A provider that could not be brought up or torn down cleanly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

/// Outcome of `initialize`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Providers that completed the handshake, in config order
    pub connected: Vec<String>,
    /// Providers that never became live
    pub failed: Vec<ProviderFailure>,
}

/// Outcome of `shutdown`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    pub closed: Vec<String>,
    pub failed: Vec<ProviderFailure>,
}

/// One live provider: name plus its serialized channel
struct ProviderConnection {
    name: String,
    channel: Mutex<Box<dyn ToolProvider>>,
}

impl ProviderConnection {
    fn new(name: String, provider: Box<dyn ToolProvider>) -> Self {
        Self {
            name,
            channel: Mutex::new(provider),
        }
    }
}

/// Owns the set of provider connections
pub struct SessionManager {
    connector: Arc<dyn ProviderConnector>,
    connections: RwLock<Vec<Arc<ProviderConnection>>>,
    state: Mutex<SessionState>,
    accepting: AtomicBool,
    logger: Arc<dyn Logger>,
}

impl SessionManager {
    /// Create a manager that connects through `connector`
    pub fn new(connector: Arc<dyn ProviderConnector>, logger: Arc<dyn Logger>) -> Self {
        Self {
            connector,
            connections: RwLock::new(Vec::new()),
            state: Mutex::new(SessionState::Idle),
            accepting: AtomicBool::new(false),
            logger,
        }
    }

    /// Current lifecycle state
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Connect to every configured provider
    ///
    /// Attempts run concurrently and independently. Calling this again on a
    /// live or shut down manager does nothing and returns an empty report.
    pub async fn initialize(&self, configs: &[ProviderConfig]) -> InitReport {
        let mut state = self.state.lock().await;
        if *state != SessionState::Idle {
            log_warn!(
                self.logger,
                "[SessionManager] initialize called in state {:?}, ignoring",
                *state
            );
            return InitReport::default();
        }

        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(configs.len());
        for config in configs {
            if seen.insert(config.name.as_str()) {
                unique.push(config);
            } else {
                log_warn!(
                    self.logger,
                    "[SessionManager] Duplicate provider '{}' in configuration, skipping",
                    config.name
                );
            }
        }

        let connector = Arc::clone(&self.connector);
        let attempts = unique.into_iter().map(|config| {
            let connector = Arc::clone(&connector);
            async move {
                let outcome = AssertUnwindSafe(connector.connect(config))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        Err(crate::mcp::McpError::InitializationFailed(
                            "connector panicked".to_string(),
                        ))
                    });
                (config, outcome)
            }
        });
        let results = join_all(attempts).await;

        let mut report = InitReport::default();
        let mut live = Vec::new();
        for (config, outcome) in results {
            match outcome {
                Ok(provider) => {
                    log_info!(
                        self.logger,
                        "[SessionManager] Connected to provider '{}'",
                        config.name
                    );
                    live.push(Arc::new(ProviderConnection::new(config.name.clone(), provider)));
                    report.connected.push(config.name.clone());
                }
                Err(e) => {
                    log_error!(
                        self.logger,
                        "[SessionManager] Failed to connect to provider '{}' ({}): {}",
                        config.name,
                        config.target(),
                        e
                    );
                    report.failed.push(ProviderFailure {
                        provider: config.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        *self.connections.write() = live;
        self.accepting.store(true, Ordering::SeqCst);
        *state = SessionState::Live;

        log_info!(
            self.logger,
            "[SessionManager] {} of {} providers live",
            report.connected.len(),
            report.connected.len() + report.failed.len()
        );
        report
    }

    /// Names of the live providers, in config order
    pub fn live_providers(&self) -> Vec<String> {
        self.connections
            .read()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    fn connection(&self, provider: &str) -> Option<Arc<ProviderConnection>> {
        self.connections
            .read()
            .iter()
            .find(|c| c.name == provider)
            .cloned()
    }

    /// Query every live provider for its operations
    ///
    /// A failing provider is logged and contributes nothing; the rest of the
    /// catalog is still returned.
    pub async fn list_operations(&self) -> Vec<ToolDescriptor> {
        let connections = self.connections.read().clone();
        let mut descriptors = Vec::new();

        for connection in connections {
            let channel = connection.channel.lock().await;
            match channel.list_tools().await {
                Ok(tools) => {
                    log_info!(
                        self.logger,
                        "[SessionManager] Provider '{}' advertises {} tools",
                        connection.name,
                        tools.len()
                    );
                    descriptors.extend(tools.into_iter().map(|tool| ToolDescriptor {
                        name: tool.name,
                        description: tool.description,
                        input_schema: tool.input_schema,
                        provider: connection.name.clone(),
                    }));
                }
                Err(e) => {
                    log_error!(
                        self.logger,
                        "[SessionManager] Error getting tools from '{}': {}",
                        connection.name, e
                    );
                }
            }
        }

        descriptors
    }

    /// Forward a call to the named provider
    ///
    /// Never fails: every problem comes back as an error result.
    pub async fn dispatch(
        &self,
        provider: &str,
        operation: &str,
        arguments: Value,
    ) -> ToolExecutionResult {
        if !self.accepting.load(Ordering::SeqCst) {
            return ToolExecutionResult::error(
                "Error executing tool: provider sessions are not running",
            );
        }

        let Some(connection) = self.connection(provider) else {
            return ToolExecutionResult::error(format!(
                "Error executing tool: provider '{}' is not connected",
                provider
            ));
        };

        let channel = connection.channel.lock().await;
        if !channel.is_alive() {
            return ToolExecutionResult::error(format!(
                "Error executing tool: provider '{}' is closed",
                provider
            ));
        }

        log_debug!(
            self.logger,
            "[SessionManager] Dispatching '{}' to '{}'",
            operation, provider
        );

        let outcome = AssertUnwindSafe(channel.call_tool(operation, arguments))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(output)) if output.is_error => {
                let message = flatten(&output.content);
                log_warn!(
                    self.logger,
                    "[SessionManager] '{}' on '{}' reported an error: {}",
                    operation, provider, message
                );
                ToolExecutionResult::error(format!("Error executing tool: {}", message))
            }
            Ok(Ok(output)) => ToolExecutionResult::Success(output.content),
            Ok(Err(e)) => {
                log_error!(
                    self.logger,
                    "[SessionManager] '{}' on '{}' failed: {}",
                    operation, provider, e
                );
                ToolExecutionResult::error(format!("Error executing tool: {}", e))
            }
            Err(_) => {
                log_error!(
                    self.logger,
                    "[SessionManager] '{}' on '{}' panicked",
                    operation, provider
                );
                ToolExecutionResult::error("Error executing tool: provider call panicked")
            }
        }
    }

    /// Release every connection
    ///
    /// New dispatches are rejected first, then each channel is closed once
    /// any in-flight call on it finishes. A failed close is logged and does
    /// not stop the remaining closes. Idempotent.
    pub async fn shutdown(&self) -> ShutdownReport {
        let mut state = self.state.lock().await;
        if *state == SessionState::ShutDown {
            return ShutdownReport::default();
        }

        self.accepting.store(false, Ordering::SeqCst);
        let connections = std::mem::take(&mut *self.connections.write());

        let mut report = ShutdownReport::default();
        for connection in connections {
            let mut channel = connection.channel.lock().await;
            match channel.close().await {
                Ok(()) => report.closed.push(connection.name.clone()),
                Err(e) => {
                    log_error!(
                        self.logger,
                        "[SessionManager] Error closing provider '{}': {}",
                        connection.name, e
                    );
                    report.failed.push(ProviderFailure {
                        provider: connection.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        *state = SessionState::ShutDown;
        log_info!(
            self.logger,
            "[SessionManager] Shut down ({} closed, {} failed)",
            report.closed.len(),
            report.failed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{MemoryLogger, NoOpLogger};
    use crate::mcp::{MockConnector, MockReply, MockToolProvider};
    use crate::types::Content;
    use serde_json::json;
    use std::time::Duration;

    fn configs(names: &[&str]) -> Vec<ProviderConfig> {
        names
            .iter()
            .map(|n| ProviderConfig::stdio(*n, format!("{}-mcp", n), Vec::<String>::new()))
            .collect()
    }

    fn manager(connector: MockConnector) -> SessionManager {
        SessionManager::new(Arc::new(connector), Arc::new(NoOpLogger))
    }

    #[tokio::test]
    async fn test_failed_provider_does_not_block_others() {
        let connector = MockConnector::new()
            .with_provider(MockToolProvider::new("drive").with_tool("drive_search", "Search"))
            .with_unavailable("calendar")
            .with_provider(MockToolProvider::new("mail").with_tool("send_mail", "Send"));
        let sessions = manager(connector);

        let report = sessions
            .initialize(&configs(&["calendar", "drive", "mail"]))
            .await;

        assert_eq!(report.connected, vec!["drive", "mail"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].provider, "calendar");
        assert_eq!(sessions.live_providers(), vec!["drive", "mail"]);
        assert_eq!(sessions.state().await, SessionState::Live);
    }

    #[tokio::test]
    async fn test_list_operations_tags_owner() {
        let connector = MockConnector::new()
            .with_provider(
                MockToolProvider::new("drive")
                    .with_tool("drive_search", "Search files")
                    .with_tool("drive_share", "Share a file"),
            )
            .with_unavailable("calendar");
        let sessions = manager(connector);
        sessions.initialize(&configs(&["calendar", "drive"])).await;

        let ops = sessions.list_operations().await;
        let names: Vec<_> = ops.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["drive_search", "drive_share"]);
        assert!(ops.iter().all(|d| d.provider == "drive"));
    }

    #[tokio::test]
    async fn test_list_operations_isolates_failures() {
        let logger = Arc::new(MemoryLogger::new());
        let connector = MockConnector::new()
            .with_provider(MockToolProvider::new("broken").with_tool("x", "X").failing_listing())
            .with_provider(MockToolProvider::new("drive").with_tool("drive_search", "Search"));
        let sessions = SessionManager::new(Arc::new(connector), logger.clone());
        sessions.initialize(&configs(&["broken", "drive"])).await;

        let ops = sessions.list_operations().await;
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "drive_search");
        assert!(logger.contains("Error getting tools from 'broken'"));
    }

    #[tokio::test]
    async fn test_dispatch_success_returns_result_unchanged() {
        let payload = Content::from(json!([{"text": "found 2 files"}, {"id": "f1"}]));
        let connector = MockConnector::new().with_provider(
            MockToolProvider::new("drive")
                .with_tool("drive_search", "Search")
                .with_reply("drive_search", MockReply::Ok(payload.clone())),
        );
        let sessions = manager(connector);
        sessions.initialize(&configs(&["drive"])).await;

        let result = sessions
            .dispatch("drive", "drive_search", json!({"query": "report"}))
            .await;
        assert_eq!(result, ToolExecutionResult::Success(payload));
    }

    #[tokio::test]
    async fn test_dispatch_failures_become_error_text() {
        let connector = MockConnector::new().with_provider(
            MockToolProvider::new("drive")
                .with_reply("drive_share", MockReply::ToolError("permission denied".into()))
                .with_reply("drive_delete", MockReply::Fail("pipe closed".into())),
        );
        let sessions = manager(connector);
        sessions.initialize(&configs(&["drive"])).await;

        let reported = sessions.dispatch("drive", "drive_share", json!({})).await;
        assert_eq!(
            reported,
            ToolExecutionResult::error("Error executing tool: permission denied")
        );

        let raised = sessions.dispatch("drive", "drive_delete", json!({})).await;
        match raised {
            ToolExecutionResult::Error(msg) => {
                assert!(msg.starts_with("Error executing tool:"));
                assert!(msg.contains("pipe closed"));
            }
            other => panic!("expected error, got {:?}", other),
        }

        let unknown = sessions.dispatch("calendar", "create_event", json!({})).await;
        assert!(unknown.is_error());
    }

    #[tokio::test]
    async fn test_dispatch_is_serialized_per_provider() {
        let provider = MockToolProvider::new("drive").with_delay(Duration::from_millis(20));
        let probe = provider.probe();
        let sessions = Arc::new(manager(MockConnector::new().with_provider(provider)));
        sessions.initialize(&configs(&["drive"])).await;

        let calls = (0..4).map(|i| {
            let sessions = Arc::clone(&sessions);
            tokio::spawn(async move { sessions.dispatch("drive", "op", json!({ "i": i })).await })
        });
        for handle in join_all(calls).await {
            assert!(!handle.unwrap().is_error());
        }

        assert_eq!(probe.calls().len(), 4);
        assert_eq!(probe.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_in_flight_dispatch() {
        let provider = MockToolProvider::new("drive").with_delay(Duration::from_millis(100));
        let probe = provider.probe();
        let sessions = Arc::new(manager(MockConnector::new().with_provider(provider)));
        sessions.initialize(&configs(&["drive"])).await;

        let in_flight = {
            let sessions = Arc::clone(&sessions);
            tokio::spawn(async move { sessions.dispatch("drive", "op", json!({})).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(probe.calls().len(), 1);
        assert!(!probe.is_closed());

        let report = sessions.shutdown().await;
        assert_eq!(report.closed, vec!["drive"]);
        assert!(probe.is_closed());
        assert!(!probe.closed_mid_call());

        assert_eq!(
            in_flight.await.unwrap(),
            ToolExecutionResult::Success(Content::text("op -> {}"))
        );

        let late = sessions.dispatch("drive", "op", json!({})).await;
        assert!(late.is_error());
        assert_eq!(probe.calls().len(), 1);
        assert_eq!(sessions.state().await, SessionState::ShutDown);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let connector = Arc::new(
            MockConnector::new().with_provider(MockToolProvider::new("drive")),
        );
        let sessions = SessionManager::new(connector.clone(), Arc::new(NoOpLogger));

        let first = sessions.initialize(&configs(&["drive"])).await;
        let second = sessions.initialize(&configs(&["drive"])).await;

        assert_eq!(first.connected, vec!["drive"]);
        assert_eq!(second, InitReport::default());
        assert_eq!(connector.attempts(), 1);
        assert_eq!(sessions.live_providers(), vec!["drive"]);
    }

    #[tokio::test]
    async fn test_duplicate_config_names_connect_once() {
        let connector = Arc::new(
            MockConnector::new().with_provider(MockToolProvider::new("drive")),
        );
        let sessions = SessionManager::new(connector.clone(), Arc::new(NoOpLogger));

        let report = sessions.initialize(&configs(&["drive", "drive"])).await;
        assert_eq!(report.connected, vec!["drive"]);
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_everything_even_when_a_close_fails() {
        let bad = MockToolProvider::new("bad").failing_close();
        let good = MockToolProvider::new("good");
        let (bad_probe, good_probe) = (bad.probe(), good.probe());
        let sessions = manager(MockConnector::new().with_provider(bad).with_provider(good));
        sessions.initialize(&configs(&["bad", "good"])).await;

        let report = sessions.shutdown().await;
        assert_eq!(report.closed, vec!["good"]);
        assert_eq!(report.failed.len(), 1);
        assert!(bad_probe.is_closed());
        assert!(good_probe.is_closed());
        assert!(sessions.live_providers().is_empty());

        let again = sessions.shutdown().await;
        assert_eq!(again, ShutdownReport::default());

        let rejected = sessions.dispatch("good", "op", json!({})).await;
        assert!(rejected.is_error());
    }

    #[tokio::test]
    async fn test_shutdown_after_partial_initialize() {
        let sessions = manager(MockConnector::new().with_unavailable("only"));
        let report = sessions.initialize(&configs(&["only"])).await;
        assert!(report.connected.is_empty());

        let shutdown = sessions.shutdown().await;
        assert!(shutdown.closed.is_empty());
        assert!(shutdown.failed.is_empty());
        assert_eq!(sessions.state().await, SessionState::ShutDown);
    }

    #[tokio::test]
    async fn test_shutdown_before_initialize() {
        let sessions = manager(MockConnector::new().with_provider(MockToolProvider::new("drive")));
        sessions.shutdown().await;

        let report = sessions.initialize(&configs(&["drive"])).await;
        assert!(report.connected.is_empty());
        assert!(sessions.live_providers().is_empty());
    }
}
