//! Tool registry
//!
//! A read-only catalog built once from the operations every live provider
//! advertised. Lookups are by tool name; each descriptor remembers which
//! provider owns it so calls can be routed back.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::logging::Logger;
use crate::types::{FunctionSchema, ToolDescriptor};
use crate::{log_info, log_warn};

use super::error::{RegistryError, RegistryResult};

/// Schema keys that model backends reject in function declarations
const STRIPPED_SCHEMA_KEYS: &[&str] = &["$schema", "$id", "additionalProperties", "examples"];

/// A tool name advertised by more than one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCollision {
    pub name: String,
    /// Provider whose descriptor is kept
    pub kept: String,
    /// Provider whose descriptor is shadowed
    pub shadowed: String,
}

/// Name-addressable catalog of tool descriptors
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    by_name: HashMap<String, usize>,
    collisions: Vec<NameCollision>,
}

impl ToolRegistry {
    /// Build the catalog from descriptors in provider order
    ///
    /// When two providers advertise the same name the first one wins and
    /// the collision is logged.
    pub fn build(descriptors: Vec<ToolDescriptor>, logger: Arc<dyn Logger>) -> Self {
        let mut tools = Vec::with_capacity(descriptors.len());
        let mut by_name = HashMap::with_capacity(descriptors.len());
        let mut collisions = Vec::new();

        for descriptor in descriptors {
            if let Some(&index) = by_name.get(&descriptor.name) {
                let kept: &ToolDescriptor = &tools[index];
                log_warn!(
                    logger,
                    "[ToolRegistry] Tool '{}' from '{}' shadowed by '{}'",
                    descriptor.name, descriptor.provider, kept.provider
                );
                collisions.push(NameCollision {
                    name: descriptor.name,
                    kept: kept.provider.clone(),
                    shadowed: descriptor.provider,
                });
                continue;
            }
            by_name.insert(descriptor.name.clone(), tools.len());
            tools.push(descriptor);
        }

        log_info!(
            logger,
            "[ToolRegistry] Registered {} tools from {} providers",
            tools.len(),
            tools
                .iter()
                .map(|t| t.provider.as_str())
                .collect::<BTreeSet<_>>()
                .len()
        );

        Self {
            tools,
            by_name,
            collisions,
        }
    }

    /// An empty catalog
    pub fn empty() -> Self {
        Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
            collisions: Vec::new(),
        }
    }

    /// Every registered descriptor, in registration order
    pub fn all_descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Look up a tool by name
    pub fn resolve(&self, name: &str) -> RegistryResult<&ToolDescriptor> {
        self.by_name
            .get(name)
            .map(|&index| &self.tools[index])
            .ok_or_else(|| RegistryError::not_found(name))
    }

    /// Function declarations for the model
    ///
    /// Descriptors missing a description or an input schema are left out.
    pub fn function_schemas(&self) -> Vec<FunctionSchema> {
        self.tools
            .iter()
            .filter_map(|tool| {
                let description = tool.description.as_ref()?;
                let schema = tool.input_schema.as_ref()?;
                Some(FunctionSchema {
                    name: tool.name.clone(),
                    description: description.clone(),
                    parameters: clean_schema(schema.clone()),
                })
            })
            .collect()
    }

    /// Names shadowed during `build`
    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }

    /// Distinct owning providers, sorted
    pub fn providers(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|t| t.provider.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Recursively strip schema keys model backends refuse
pub fn clean_schema(schema: Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| !STRIPPED_SCHEMA_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key, clean_schema(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(clean_schema).collect()),
        other => other,
    }
}
