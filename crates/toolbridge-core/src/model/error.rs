//! Model client error types

use thiserror::Error;

/// Errors raised by a model backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The backend request failed
    #[error("{client} request failed: {message}")]
    Request { client: String, message: String },

    /// A scripted client ran out of replies
    #[error("{client} has no more scripted replies")]
    Exhausted { client: String },
}

impl ModelError {
    /// Create a request error
    pub fn request(client: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            client: client.into(),
            message: message.into(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
