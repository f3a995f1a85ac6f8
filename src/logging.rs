use chrono::{DateTime, Local};
use std::path::PathBuf;

use crate::common::files::append_line;
use crate::common::paths::Paths;
use crate::ui::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Format one log line: `[2026-10-17 14:25:01] [INFO] message`
pub fn format_entry(timestamp: DateTime<Local>, level: LogLevel, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        level.tag(),
        message
    )
}

/// Append-only action and error logs.
///
/// Every entry goes to its file and to the matching standard stream.
#[derive(Debug, Clone)]
pub struct ActionLog {
    actions: PathBuf,
    errors: PathBuf,
}

impl ActionLog {
    pub fn new(paths: &Paths) -> Self {
        Self {
            actions: paths.actions_log(),
            errors: paths.errors_log(),
        }
    }

    pub fn info(&self, code: &str, message: &str) {
        self.record(LogLevel::Info, code, message);
    }

    pub fn error(&self, code: &str, message: &str) {
        self.record(LogLevel::Error, code, message);
    }

    fn record(&self, level: LogLevel, code: &str, message: &str) {
        let now = Local::now();
        let line = format_entry(now, level, message);
        let target = match level {
            LogLevel::Info => &self.actions,
            LogLevel::Error => &self.errors,
        };

        if let Err(err) = append_line(target, &line) {
            emit(
                Level::Warn,
                "log.write_failed",
                &format!("Failed to write log entry to {}: {err:#}", target.display()),
                None,
            );
        }

        let ui_level = match level {
            LogLevel::Info => Level::Info,
            LogLevel::Error => Level::Error,
        };
        let data = serde_json::json!({
            "timestamp": now.to_rfc3339(),
            "level": level.tag(),
            "message": message,
        });
        emit(ui_level, code, &line, Some(data));
    }
}
