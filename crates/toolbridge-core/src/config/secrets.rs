//! Placeholder substitution for provider configuration
//!
//! Any string value in the configuration document that is exactly of the
//! form `<VAR>` is replaced by the value of `VAR` from a [`SecretSource`].
//! Missing values become `<VAR_NOT_SET>` so the provider still launches and
//! fails visibly on its own terms.

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::traits::SecretSource;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(.+)>$").expect("placeholder pattern is valid"));

/// Secret source that reads environment variables
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretSource;

impl EnvSecretSource {
    pub fn new() -> Self {
        Self
    }
}

impl SecretSource for EnvSecretSource {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// In-memory secret source for testing
#[derive(Debug, Default, Clone)]
pub struct MemorySecretSource {
    values: HashMap<String, String>,
}

impl MemorySecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SecretSource for MemorySecretSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Recursively replace `<VAR>` placeholders in a configuration document
pub fn substitute_placeholders(value: Value, secrets: &dyn SecretSource) -> Value {
    match value {
        Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, substitute_placeholders(v, secrets)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| substitute_placeholders(v, secrets))
                .collect(),
        ),
        Value::String(s) => {
            let key = PLACEHOLDER.captures(&s).map(|caps| caps[1].to_string());
            match key {
                Some(key) => {
                    let resolved = secrets
                        .get(&key)
                        .unwrap_or_else(|| format!("<{}_NOT_SET>", key));
                    Value::String(resolved)
                }
                None => Value::String(s),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitutes_nested_placeholders() {
        let secrets = MemorySecretSource::new().with("GDRIVE_TOKEN", "tok-123");
        let doc = json!({
            "mcpServers": {
                "gdrive": {
                    "command": "npx",
                    "args": ["server", "<GDRIVE_TOKEN>"],
                    "env": { "TOKEN": "<GDRIVE_TOKEN>", "PLAIN": "value" }
                }
            }
        });

        let out = substitute_placeholders(doc, &secrets);
        let server = &out["mcpServers"]["gdrive"];
        assert_eq!(server["args"][1], "tok-123");
        assert_eq!(server["env"]["TOKEN"], "tok-123");
        assert_eq!(server["env"]["PLAIN"], "value");
    }

    #[test]
    fn test_missing_placeholder_is_marked() {
        let secrets = MemorySecretSource::new();
        let out = substitute_placeholders(json!("<API_KEY>"), &secrets);
        assert_eq!(out, json!("<API_KEY_NOT_SET>"));
    }

    #[test]
    fn test_partial_placeholder_left_alone() {
        let secrets = MemorySecretSource::new().with("X", "y");
        let out = substitute_placeholders(json!("prefix <X>"), &secrets);
        assert_eq!(out, json!("prefix <X>"));
        assert_eq!(substitute_placeholders(json!(5), &secrets), json!(5));
    }

    #[test]
    fn test_env_source_reads_environment() {
        let source = EnvSecretSource::new();
        assert_eq!(source.name(), "env");
        assert!(source.get("TOOLBRIDGE_DEFINITELY_UNSET_VARIABLE").is_none());
    }
}
