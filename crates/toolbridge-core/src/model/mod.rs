//! Model client abstractions
//!
//! The orchestration loop talks to a language model only through the
//! [`ModelClient`] trait:
//!
//! - `GenaiModelClient`: any backend the genai crate supports
//! - `ScriptedModelClient`: deterministic playback for tests

mod error;
mod genai_client;
mod scripted;
mod traits;

pub use error::{ModelError, ModelResult};
pub use genai_client::{to_genai_messages, to_genai_tools, GenaiModelClient};
pub use scripted::{RecordedRequest, ScriptedModelClient, ScriptedStep};
pub use traits::{parse_parts, ModelClient, ParsedReply, RawReply, ReplyPart};
