//! Configuration loading
//!
//! - `ConfigFile`: the `mcpServers` provider table plus engine settings
//! - `SecretSource`: resolves `<VAR>` placeholders (environment by default)

mod traits;
mod file;
mod provider;
mod secrets;
mod settings;

pub use traits::{ConfigError, ConfigResult, SecretSource};
pub use file::{resolve_config_path, user_config_path, ConfigFile, ServerEntry, CONFIG_ENV_VAR, CONFIG_FILE_NAME};
pub use provider::{ProviderConfig, ProviderTransport};
pub use secrets::{substitute_placeholders, EnvSecretSource, MemorySecretSource};
pub use settings::{EngineSettings, DEFAULT_MAX_STEPS, DEFAULT_MODEL};
