//! Provider configuration file (JSON or YAML)
//!
//! The file format is the common `mcpServers` table:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "gdrive": { "command": "npx", "args": ["-y", "gdrive-mcp"], "env": { "TOKEN": "<GDRIVE_TOKEN>" } },
//!     "remote": { "url": "http://localhost:9000/mcp" }
//!   },
//!   "engine": { "model": "gemini-2.0-flash", "maxSteps": 4 }
//! }
//! ```
//!
//! Files ending in `.yaml`/`.yml` are read as YAML, everything else as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::{ProviderConfig, ProviderTransport};
use super::secrets::substitute_placeholders;
use super::settings::EngineSettings;
use super::traits::{ConfigError, ConfigResult, SecretSource};

/// Environment variable that points at the config file
pub const CONFIG_ENV_VAR: &str = "TOOLBRIDGE_CONFIG";

/// File name looked up in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "server_config.json";

/// One entry of the `mcpServers` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ServerEntry {
    /// Convert into a typed provider config
    pub fn into_provider(self, name: &str) -> ConfigResult<ProviderConfig> {
        let transport = match (self.command, self.url) {
            (Some(command), _) if !command.trim().is_empty() => ProviderTransport::Stdio {
                command,
                args: self.args,
                env: self.env,
            },
            (_, Some(url)) if !url.trim().is_empty() => ProviderTransport::Http { url },
            _ => {
                return Err(ConfigError::invalid_server(
                    name,
                    "either 'command' or 'url' is required",
                ))
            }
        };

        Ok(ProviderConfig {
            name: name.to_string(),
            transport,
        })
    }
}

/// Parsed configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Provider table, ordered by name
    #[serde(rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, ServerEntry>,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineSettings,
}

impl ConfigFile {
    /// Load and parse a config file, substituting placeholders first
    pub fn load(path: impl AsRef<Path>, secrets: &dyn SecretSource) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        if is_yaml(path) {
            Self::from_yaml_str(&content, secrets)
        } else {
            Self::from_json_str(&content, secrets)
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str, secrets: &dyn SecretSource) -> ConfigResult<Self> {
        let raw: Value = serde_json::from_str(content)?;
        Self::from_value(raw, secrets)
    }

    /// Parse a YAML document
    pub fn from_yaml_str(content: &str, secrets: &dyn SecretSource) -> ConfigResult<Self> {
        let raw: Value = serde_yaml::from_str(content)?;
        Self::from_value(raw, secrets)
    }

    fn from_value(raw: Value, secrets: &dyn SecretSource) -> ConfigResult<Self> {
        let resolved = substitute_placeholders(raw, secrets);
        Ok(serde_json::from_value(resolved)?)
    }

    /// Typed provider configs, in name order
    pub fn providers(&self) -> ConfigResult<Vec<ProviderConfig>> {
        self.mcp_servers
            .iter()
            .map(|(name, entry)| entry.clone().into_provider(name))
            .collect()
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Resolve the config file location
///
/// Order: explicit path, `TOOLBRIDGE_CONFIG`, `./server_config.json`,
/// `<config dir>/toolbridge/server_config.json`.
pub fn resolve_config_path(explicit: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(local);
    }

    let user = user_config_path();
    if user.exists() {
        return Ok(user);
    }

    Err(ConfigError::NotFound(local))
}

/// `<config dir>/toolbridge/server_config.json`
pub fn user_config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
    config_dir.join("toolbridge").join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemorySecretSource;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "mcpServers": {
            "gdrive": {
                "command": "npx",
                "args": ["-y", "gdrive-mcp"],
                "env": { "TOKEN": "<GDRIVE_TOKEN>" }
            },
            "calendar": { "command": "calendar-mcp" },
            "remote": { "url": "http://localhost:9000/mcp" }
        }
    }"#;

    #[test]
    fn test_parse_json_with_placeholders() {
        let secrets = MemorySecretSource::new().with("GDRIVE_TOKEN", "secret");
        let file = ConfigFile::from_json_str(SAMPLE, &secrets).unwrap();
        let providers = file.providers().unwrap();

        let names: Vec<_> = providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["calendar", "gdrive", "remote"]);

        match &providers[1].transport {
            ProviderTransport::Stdio { command, args, env } => {
                assert_eq!(command, "npx");
                assert_eq!(args, &vec!["-y".to_string(), "gdrive-mcp".to_string()]);
                assert_eq!(env.as_ref().unwrap()["TOKEN"], "secret");
            }
            other => panic!("expected stdio transport, got {:?}", other),
        }
        assert!(matches!(providers[2].transport, ProviderTransport::Http { .. }));
        assert_eq!(file.engine, EngineSettings::default());
    }

    #[test]
    fn test_missing_servers_table_is_an_error() {
        let secrets = MemorySecretSource::new();
        let result = ConfigFile::from_json_str(r#"{"servers": {}}"#, &secrets);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_entry_without_command_or_url() {
        let secrets = MemorySecretSource::new();
        let file = ConfigFile::from_json_str(r#"{"mcpServers": {"broken": {"args": []}}}"#, &secrets)
            .unwrap();
        let err = file.providers().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("servers.yaml");
        fs::write(
            &path,
            "mcpServers:\n  files:\n    command: files-mcp\n    args: [\"--root\", \"/tmp\"]\nengine:\n  model: gpt-4o-mini\n  maxSteps: 2\n",
        )
        .unwrap();

        let file = ConfigFile::load(&path, &MemorySecretSource::new()).unwrap();
        assert_eq!(file.engine.model, "gpt-4o-mini");
        assert_eq!(file.engine.max_steps, 2);
        assert_eq!(file.providers().unwrap()[0].target(), "files-mcp --root /tmp");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ConfigFile::load(dir.path().join("nope.json"), &MemorySecretSource::new());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/etc/toolbridge.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/toolbridge.json"));
    }
}
