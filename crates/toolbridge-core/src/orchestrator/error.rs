//! Orchestrator error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ModelError;

/// Request-level failures of a conversation turn
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    /// The model backend failed; the turn is abandoned
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Unexpected failure inside the turn
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrchestratorError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Error body returned to the caller of a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub detail: String,
}

impl From<OrchestratorError> for ErrorPayload {
    fn from(err: OrchestratorError) -> Self {
        Self {
            detail: err.to_string(),
        }
    }
}
