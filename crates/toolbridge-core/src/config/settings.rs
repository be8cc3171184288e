//! Engine settings

use serde::{Deserialize, Serialize};

/// Default bound on model-query steps per turn
pub const DEFAULT_MAX_STEPS: usize = 4;

/// Default model identifier handed to the model client
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Tunables for the orchestration loop and model client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    /// Model identifier (e.g. "gemini-2.0-flash", "gpt-4o-mini")
    pub model: String,
    /// Optional system prompt sent with every model request
    pub system_prompt: Option<String>,
    /// Maximum model-query steps per turn
    pub max_steps: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl EngineSettings {
    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the step bound (at least one step always runs)
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.max_steps, 4);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert!(settings.system_prompt.is_none());
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let settings: EngineSettings = serde_json::from_str(r#"{"model": "gpt-4o-mini"}"#).unwrap();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn test_step_bound_floor() {
        assert_eq!(EngineSettings::default().with_max_steps(0).max_steps, 1);
    }
}
