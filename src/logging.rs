use std::sync::{Arc, Mutex};

use tracing::Level;

/// Logging capability handed to every pipeline component.
///
/// Components never reach for a global logger; the binary wires in a
/// [`TracingLogger`] and tests wire in a [`RecordingLogger`].
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// A logger for one component, sharing this logger's sink.
    fn scoped(&self, component: &'static str) -> Arc<dyn Logger>;
}

/// Forwards to `tracing` events, tagged with the component that emitted them.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("forage")
    }
}

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(component = self.component, "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(component = self.component, "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(component = self.component, "{message}");
    }

    fn scoped(&self, component: &'static str) -> Arc<dyn Logger> {
        Arc::new(TracingLogger::new(component))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}

    fn scoped(&self, _component: &'static str) -> Arc<dyn Logger> {
        Arc::new(NoopLogger)
    }
}

/// One recorded log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub component: &'static str,
    pub message: String,
}

/// Keeps every entry in memory so tests can assert on what was reported.
/// Scoped loggers append to the same list.
#[derive(Debug, Clone)]
pub struct RecordingLogger {
    component: &'static str,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Default for RecordingLogger {
    fn default() -> Self {
        Self {
            component: "forage",
            entries: Arc::default(),
        }
    }
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages logged at `level`, in the order they were emitted.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message)
            .collect()
    }

    /// Messages emitted by `component`, at any level.
    pub fn messages_from(&self, component: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.component == component)
            .map(|entry| entry.message)
            .collect()
    }

    fn record(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                component: self.component,
                message: message.to_string(),
            });
        }
    }
}

impl Logger for RecordingLogger {
    fn info(&self, message: &str) {
        self.record(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.record(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::ERROR, message);
    }

    fn scoped(&self, component: &'static str) -> Arc<dyn Logger> {
        Arc::new(RecordingLogger {
            component,
            entries: Arc::clone(&self.entries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_logger_keeps_order_and_level() {
        let logger = RecordingLogger::new();
        logger.info("first");
        logger.warn("second");
        logger.error("third");
        logger.info("fourth");

        assert_eq!(logger.entries().len(), 4);
        assert_eq!(logger.messages(Level::INFO), vec!["first", "fourth"]);
        assert_eq!(logger.messages(Level::WARN), vec!["second"]);
        assert_eq!(logger.messages(Level::ERROR), vec!["third"]);
    }

    #[test]
    fn test_scoped_loggers_share_entries_and_keep_their_tag() {
        let logger = RecordingLogger::new();
        let fetcher = logger.scoped("fetcher");
        let parser = logger.scoped("parser");

        fetcher.error("status 404");
        parser.warn("no json");
        logger.info("done");

        let components: Vec<&str> = logger.entries().iter().map(|e| e.component).collect();
        assert_eq!(components, vec!["fetcher", "parser", "forage"]);
        assert_eq!(logger.messages_from("fetcher"), vec!["status 404"]);
        assert_eq!(logger.messages_from("parser"), vec!["no json"]);
    }

    #[test]
    fn test_noop_logger_is_silent() {
        let logger = NoopLogger;
        logger.info("ignored");
        logger.error("ignored");
    }
}
