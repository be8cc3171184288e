//! Logger that forwards to `tracing`

use tracing_subscriber::EnvFilter;

use super::traits::Logger;

/// Environment variable holding the log filter directive
pub const LOG_ENV_VAR: &str = "TOOLBRIDGE_LOG";

/// A logger that emits `tracing` events under the `toolbridge` target
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    component: Option<String>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self { component: None }
    }

    /// Attach a component name recorded as a structured field on every event
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: Some(component.into()),
        }
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        match &self.component {
            Some(c) => tracing::debug!(target: "toolbridge", component = %c, "{}", message),
            None => tracing::debug!(target: "toolbridge", "{}", message),
        }
    }

    fn info(&self, message: &str) {
        match &self.component {
            Some(c) => tracing::info!(target: "toolbridge", component = %c, "{}", message),
            None => tracing::info!(target: "toolbridge", "{}", message),
        }
    }

    fn warn(&self, message: &str) {
        match &self.component {
            Some(c) => tracing::warn!(target: "toolbridge", component = %c, "{}", message),
            None => tracing::warn!(target: "toolbridge", "{}", message),
        }
    }

    fn error(&self, message: &str) {
        match &self.component {
            Some(c) => tracing::error!(target: "toolbridge", component = %c, "{}", message),
            None => tracing::error!(target: "toolbridge", "{}", message),
        }
    }
}

/// Install a global fmt subscriber filtered by `TOOLBRIDGE_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_logger_logs() {
        // Without a subscriber installed these are dropped; just make sure nothing panics
        let logger = TracingLogger::with_component("test");
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
