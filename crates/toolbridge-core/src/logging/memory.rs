//! In-memory logger that records every line

use parking_lot::Mutex;

use super::traits::Logger;

/// A logger that keeps `LEVEL: message` lines in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Whether any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.contains(needle))
    }

    fn push(&self, level: &str, message: &str) {
        self.lines.lock().push(format!("{}: {}", level, message));
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push("DEBUG", message);
    }

    fn info(&self, message: &str) {
        self.push("INFO", message);
    }

    fn warn(&self, message: &str) {
        self.push("WARN", message);
    }

    fn error(&self, message: &str) {
        self.push("ERROR", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_records() {
        let logger = MemoryLogger::new();
        logger.info("hello");
        logger.warn("careful");

        assert_eq!(logger.lines(), vec!["INFO: hello", "WARN: careful"]);
        assert!(logger.contains("careful"));
        assert!(!logger.contains("missing"));
    }
}
