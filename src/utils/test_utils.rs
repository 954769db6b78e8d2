use std::sync::Mutex;

use crate::core::log::{LogLevel, LogSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub detail: Option<String>,
}

/// Records every entry so tests can assert on what was logged.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.level == level)
            .count()
    }

    /// True when any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|entry| entry.message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: LogLevel, message: &str, detail: Option<&str>) {
        self.entries.lock().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
            detail: detail.map(str::to_string),
        });
    }
}
