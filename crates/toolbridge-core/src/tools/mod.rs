//! Tool catalog
//!
//! ```text
//! ┌───────────────────┐   list_operations()   ┌──────────────────┐
//! │  SessionManager   │ ────────────────────► │   ToolRegistry   │
//! │  (one channel per │                       │  name → provider │
//! │   live provider)  │ ◄──────────────────── │  function schemas│
//! └───────────────────┘   dispatch(provider)  └──────────────────┘
//! ```

mod error;
mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{clean_schema, NameCollision, ToolRegistry};
