//! Logger capability.
//!
//! The renamer reports what it is doing through a `Logger`. The CLI uses
//! `StatusLogger` for live stderr output and `MemoryLogger` to return a
//! transcript alongside its JSON response.

use std::cell::RefCell;

use chrono::Local;
use serde::Serialize;

pub trait Logger {
    fn write_info(&self, message: &str);
    fn write_warning(&self, message: &str);
    fn write_warning_with(&self, message: &str, detail: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Timestamped status lines on stderr.
///
/// Follows `log_status!`: nothing is printed unless stderr is a terminal,
/// so JSON consumers piping stdout/stderr get clean streams. `forced()`
/// prints regardless.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusLogger {
    force: bool,
}

impl StatusLogger {
    pub fn new() -> Self {
        Self { force: false }
    }

    pub fn forced() -> Self {
        Self { force: true }
    }

    fn emit(&self, level: LogLevel, message: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        if self.force {
            eprintln!("[{}] [{}] {}", stamp, level.as_str(), message);
        } else {
            crate::log_status!("renamer", "{} [{}] {}", stamp, level.as_str(), message);
        }
    }
}

impl Logger for StatusLogger {
    fn write_info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    fn write_warning(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    fn write_warning_with(&self, message: &str, detail: &str) {
        self.emit(LogLevel::Warn, &format!("{} {}", message, detail));
    }
}

/// Collects log entries in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: RefCell<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages_at(LogLevel::Warn)
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages_at(LogLevel::Info)
    }

    fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str, detail: Option<&str>) {
        self.entries.borrow_mut().push(LogEntry {
            level,
            message: message.to_string(),
            detail: detail.map(str::to_string),
        });
    }
}

impl Logger for MemoryLogger {
    fn write_info(&self, message: &str) {
        self.push(LogLevel::Info, message, None);
    }

    fn write_warning(&self, message: &str) {
        self.push(LogLevel::Warn, message, None);
    }

    fn write_warning_with(&self, message: &str, detail: &str) {
        self.push(LogLevel::Warn, message, Some(detail));
    }
}

/// Fans every call out to two loggers.
pub struct TeeLogger<'a> {
    first: &'a dyn Logger,
    second: &'a dyn Logger,
}

impl<'a> TeeLogger<'a> {
    pub fn new(first: &'a dyn Logger, second: &'a dyn Logger) -> Self {
        Self { first, second }
    }
}

impl Logger for TeeLogger<'_> {
    fn write_info(&self, message: &str) {
        self.first.write_info(message);
        self.second.write_info(message);
    }

    fn write_warning(&self, message: &str) {
        self.first.write_warning(message);
        self.second.write_warning(message);
    }

    fn write_warning_with(&self, message: &str, detail: &str) {
        self.first.write_warning_with(message, detail);
        self.second.write_warning_with(message, detail);
    }
}
