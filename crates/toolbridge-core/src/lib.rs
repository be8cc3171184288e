//! Toolbridge Core
//!
//! Tool-orchestration engine: connects a language model to a set of MCP tool
//! providers and runs a bounded model/tool loop per user query.
//!
//! ## Components
//!
//! - `session`: one connection per provider, brought up and torn down as a unit
//! - `tools`: name-addressable catalog of every live provider's operations
//! - `normalize`: flattens structured message content into model text turns
//! - `orchestrator`: the bounded loop plus the request boundary
//! - `store`: per-conversation histories with per-id locking
//! - `model`: the model client seam (genai backed, or scripted for tests)
//!
//! ```rust,ignore
//! use toolbridge_core::{Engine, QueryRequest, TracingLogger};
//!
//! let logger = Arc::new(TracingLogger::new());
//! let engine = Engine::from_config_path(None, None, logger).await?;
//!
//! let reply = engine.handle(QueryRequest::new("find my quarterly report")).await;
//! engine.shutdown().await;
//! ```

pub mod config;
pub mod engine;
pub mod logging;
pub mod mcp;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use types::{
    Content, FunctionSchema, Message, MessageRole, ToolCall, ToolDescriptor, ToolExecutionResult,
};

pub use config::{
    ConfigError, ConfigFile, ConfigResult, EngineSettings, EnvSecretSource, ProviderConfig,
    SecretSource,
};

pub use logging::{init_tracing, Logger, MemoryLogger, NoOpLogger, TracingLogger};

pub use mcp::{McpClient, McpConnector, McpError, McpResult, ProviderConnector, ToolProvider};

pub use model::{GenaiModelClient, ModelClient, ModelError, ScriptedModelClient};

pub use normalize::{flatten, flatten_history, Turn};

pub use orchestrator::{
    CallHook, DriveShareLink, ErrorPayload, Orchestrator, OrchestratorError, QueryRequest,
    QueryResponse,
};

pub use session::{InitReport, SessionManager, ShutdownReport};

pub use store::ConversationStore;

pub use tools::{RegistryError, ToolRegistry};

pub use engine::Engine;
