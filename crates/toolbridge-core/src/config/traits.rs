//! Configuration errors and the secret lookup seam

use std::path::PathBuf;

/// Source of values for `<VAR>` placeholders in provider configuration
///
/// Implementations:
/// - `EnvSecretSource`: Reads the process environment
/// - `MemorySecretSource`: Fixed map for testing
pub trait SecretSource: Send + Sync {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Look up a value by key
    fn get(&self, key: &str) -> Option<String>;
}

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid server entry '{name}': {reason}")]
    InvalidServer { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Create an invalid server error
    pub fn invalid_server(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidServer {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
