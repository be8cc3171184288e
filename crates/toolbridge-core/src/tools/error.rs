//! Registry error types

use thiserror::Error;

/// Errors raised by tool lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No live provider advertises the requested operation
    #[error("Tool not found: {name}")]
    NotFound { name: String },
}

impl RegistryError {
    /// Create a not-found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
