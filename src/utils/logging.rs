//! File-backed log sink used by the `--log` flag.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

use crate::core::log::{LogLevel, LogSink};

/// Appends `"<timestamp> [LEVEL] message"` lines to a file, with any detail
/// indented underneath. Optionally forwards every entry to another sink.
pub struct FileLogSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    inner: Option<Arc<dyn LogSink>>,
}

impl FileLogSink {
    /// Open `path` for appending, creating it if needed.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::with_capacity(64 * 1024, file)),
            inner: None,
        })
    }

    pub fn with_inner(mut self, inner: Arc<dyn LogSink>) -> Self {
        self.inner = Some(inner);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entry(&self, level: LogLevel, message: &str, detail: Option<&str>) -> std::io::Result<()> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        writeln!(writer, "{timestamp} [{level}] {message}")?;
        if let Some(detail) = detail {
            for line in detail.lines() {
                writeln!(writer, "    {line}")?;
            }
        }
        writer.flush()
    }
}

impl LogSink for FileLogSink {
    fn log(&self, level: LogLevel, message: &str, detail: Option<&str>) {
        // A log sink has nowhere to report its own failures
        let _ = self.write_entry(level, message, detail);
        if let Some(inner) = &self.inner {
            inner.log(level, message, detail);
        }
    }
}
