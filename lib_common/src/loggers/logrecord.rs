use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::utils::misc::utils::current_datetime_rfc9557;

/// Numeric log levels, lowest to highest severity.
pub mod level {
    /// Very chatty diagnostics.
    pub const SILLY: i64 = 0;
    /// Execution flow tracing.
    pub const TRACE: i64 = 1;
    /// Internal details useful while debugging.
    pub const DEBUG: i64 = 2;
    /// Normal progress.
    pub const INFO: i64 = 3;
    /// Unusual but recoverable.
    pub const WARN: i64 = 4;
    /// An operation failed.
    pub const ERROR: i64 = 5;
    /// The process cannot do its job.
    pub const FATAL: i64 = 6;

    /// Every level, highest first.
    pub const ALL: [i64; 7] = [FATAL, ERROR, WARN, INFO, DEBUG, TRACE, SILLY];

    /// Short upper-case name used in console and file output.
    pub fn name(level: i64) -> &'static str {
        match level {
            6 => "FATAL",
            5 => "ERROR",
            4 => "WARN",
            3 => "INFO",
            2 => "DEBUG",
            1 => "TRACE",
            _ => "SILLY",
        }
    }
}

/// # Logrecord
///
/// One log entry as written by `LoggerLocal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logrecord {
    /// RFC 9557 formatted UTC timestamp.
    pub rfc9557: String,
    /// Severity, see [`level`].
    pub loglevel: i64,
    /// Name of the emitting application.
    pub app: String,
    /// The message text.
    pub message: String,
    /// Structured extras; an empty array when none were given.
    pub tags: Value,
}

impl Logrecord {
    /// Builds a record stamped with the current time.
    pub fn new(app: &str, loglevel: i64, message: &str, extras: Option<Value>) -> Self {
        Self {
            rfc9557: current_datetime_rfc9557(),
            loglevel,
            app: app.to_string(),
            message: message.to_string(),
            tags: extras.unwrap_or_else(|| serde_json::json!([])),
        }
    }

    /// `true` when structured extras were attached.
    pub fn has_tags(&self) -> bool {
        self.tags != serde_json::json!([])
    }

    /// Single-line file representation: `ts [app] LEVEL message {extras}`.
    pub fn to_file_line(&self) -> String {
        let mut line = format!(
            "{} [{}] {} {}",
            self.rfc9557,
            self.app,
            level::name(self.loglevel),
            self.message
        );
        if self.has_tags() {
            if let Ok(tags) = serde_json::to_string(&self.tags) {
                line.push(' ');
                line.push_str(&tags);
            }
        }
        line
    }
}
