//! Provider session management

mod manager;

pub use manager::{InitReport, ProviderFailure, SessionManager, SessionState, ShutdownReport};
