use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        })
    }
}

/// Where the client writes human-readable progress and failure lines.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, detail: Option<&str>);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, None);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message, None);
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        self.log(LogLevel::Error, message, detail);
    }
}

/// Forwards every line to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str, detail: Option<&str>) {
        match (level, detail) {
            (LogLevel::Info, None) => tracing::info!(target: "aireports", "{message}"),
            (LogLevel::Info, Some(detail)) => {
                tracing::info!(target: "aireports", detail, "{message}")
            }
            (LogLevel::Warning, None) => tracing::warn!(target: "aireports", "{message}"),
            (LogLevel::Warning, Some(detail)) => {
                tracing::warn!(target: "aireports", detail, "{message}")
            }
            (LogLevel::Error, None) => tracing::error!(target: "aireports", "{message}"),
            (LogLevel::Error, Some(detail)) => {
                tracing::error!(target: "aireports", detail, "{message}")
            }
        }
    }
}
