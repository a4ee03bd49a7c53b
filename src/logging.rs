//! Persistent event log for proxied requests.
//!
//! Events are kept in a bounded in-memory ring and appended to a JSONL file so
//! the `/logs` endpoint can show recent history across restarts. Diagnostics
//! for operators still go through `tracing`; this log records what happened
//! to individual requests (model resolution, dropped tool parts, upstream
//! failures).
//!
//! The file is rewritten from the ring whenever it is opened and whenever it
//! grows past twice the ring capacity, so it never holds much more than the
//! ring does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::Result;

const MAX_LOG_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            request_id: None,
            message: message.into(),
            context: None,
        }
    }

    pub fn for_request(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_context(mut self, ctx: serde_json::Value) -> Self {
        self.context = Some(ctx);
        self
    }
}

struct EventLog {
    file_path: PathBuf,
    entries: VecDeque<LogEntry>,
    writer: BufWriter<File>,
    lines_in_file: usize,
}

impl EventLog {
    fn open(file_path: &Path) -> Result<Self> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut entries = VecDeque::with_capacity(MAX_LOG_ENTRIES);

        if file_path.exists() {
            let reader = BufReader::new(File::open(file_path)?);
            for line in reader.lines().map_while(std::result::Result::ok) {
                if let Ok(entry) = serde_json::from_str::<LogEntry>(&line) {
                    if entries.len() >= MAX_LOG_ENTRIES {
                        entries.pop_front();
                    }
                    entries.push_back(entry);
                }
            }
        }

        let writer = write_snapshot(file_path, &entries)?;

        Ok(Self {
            file_path: file_path.to_path_buf(),
            lines_in_file: entries.len(),
            entries,
            writer,
        })
    }

    fn append(&mut self, entry: LogEntry) {
        if let Ok(json) = serde_json::to_string(&entry) {
            let _ = writeln!(self.writer, "{json}");
            let _ = self.writer.flush();
            self.lines_in_file += 1;
        }
        if self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);

        if self.lines_in_file > 2 * MAX_LOG_ENTRIES {
            if let Err(e) = self.compact() {
                tracing::warn!(path = %self.file_path.display(), error = %e, "Failed to compact event log");
            }
        }
    }

    /// Rewrite the file so it holds exactly the entries in the ring.
    fn compact(&mut self) -> Result<()> {
        self.writer = write_snapshot(&self.file_path, &self.entries)?;
        self.lines_in_file = self.entries.len();
        Ok(())
    }

    fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }
}

/// Truncate `path`, write `entries` to it, and return an appending writer.
fn write_snapshot(path: &Path, entries: &VecDeque<LogEntry>) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);
    for entry in entries {
        writeln!(writer, "{}", serde_json::to_string(entry)?)?;
    }
    writer.flush()?;

    let file = OpenOptions::new().append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// Cloneable handle to the process-wide event log.
#[derive(Clone)]
pub struct SharedLogger(Arc<Mutex<EventLog>>);

impl SharedLogger {
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self(Arc::new(Mutex::new(EventLog::open(
            file_path.as_ref(),
        )?))))
    }

    pub fn log(&self, entry: LogEntry) {
        if let Ok(mut log) = self.0.lock() {
            log.append(entry);
        }
    }

    pub fn info(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    pub fn warn(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    pub fn error(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }

    pub fn debug(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Debug, component, message));
    }

    /// Most recent entries first.
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.0.lock().map(|l| l.recent(limit)).unwrap_or_default()
    }
}
