//! Core types shared by the engine
//!
//! This module contains the conversation and tool types used across
//! sessions, the registry, model clients and the orchestration loop.

mod message;
mod tool;

pub use message::{Content, Message, MessageRole};
pub(crate) use message::scalar_text;
pub use tool::{FunctionSchema, ToolCall, ToolDescriptor, ToolExecutionResult};
