//! Conversation orchestration
//!
//! Runs the bounded model/tool loop for each user query and exposes the
//! request boundary (`QueryRequest` in, `QueryResponse` or `ErrorPayload`
//! out).

mod error;
mod links;
mod request;
mod turn;

pub use error::{ErrorPayload, OrchestratorError, OrchestratorResult};
pub use links::{clickable, rewrite_share_link, CallHook, DriveShareLink, HookOutput};
pub use request::{QueryRequest, QueryResponse};
pub use turn::{invocation_note, Orchestrator};
