//! Logging abstractions

mod traits;
mod noop;
mod memory;
mod tracing_logger;

pub use traits::Logger;
pub use noop::NoOpLogger;
pub use memory::MemoryLogger;
pub use tracing_logger::{init_tracing, TracingLogger, LOG_ENV_VAR};
