use super::logrecord::{level, Logrecord};
use chrono::Local;
use colored::*;
use glob::glob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Directory used when no `log_dir` is configured: `<data_local_dir>/fgi/logs`,
/// or `./logs` on platforms without one.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("fgi").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
/// # Logger Local Options
///
/// Controls which levels reach the terminal and which reach the log file.
pub struct LoggerLocalOptions {
    /// Levels printed to stderr. `None` disables terminal output.
    pub use_tty: Option<Vec<i64>>,
    /// Levels appended to the log file. `None` disables file output.
    pub use_file: Option<Vec<i64>>,
    /// Where log files go. Defaults to [`default_log_dir`].
    pub log_dir: Option<PathBuf>,
}

impl LoggerLocalOptions {
    /// Terminal at `Info` and above, file at every level.
    pub fn tty_and_file(log_dir: Option<PathBuf>) -> Self {
        Self {
            use_tty: Some(vec![level::FATAL, level::ERROR, level::WARN, level::INFO]),
            use_file: Some(level::ALL.to_vec()),
            log_dir,
        }
    }

    /// File only, for processes whose stdout and stderr belong to someone else.
    pub fn file_only(log_dir: Option<PathBuf>) -> Self {
        Self {
            use_tty: None,
            use_file: Some(level::ALL.to_vec()),
            log_dir,
        }
    }
}

/// # Logger Local
///
/// Leveled logger writing colored lines to stderr and plain lines to a
/// timestamped file. Each new logger removes older files of the same app.
pub struct LoggerLocal {
    app_name: String,
    options: LoggerLocalOptions,
    /// Serializes appends so concurrent tasks never interleave lines.
    file_mutex: Mutex<()>,
    current_log_file: Option<PathBuf>,
}

impl LoggerLocal {
    /// Keeps only the newest `<app_name>-*.log` in `log_dir`. File names embed
    /// a sortable timestamp, so the lexicographic maximum is the newest.
    fn rotate_logs(app_name: &str, log_dir: &Path) {
        let pattern = format!("{}/{}-*.log", log_dir.display(), app_name);
        let entries = match glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Invalid log rotation pattern {}: {}", pattern, e);
                return;
            }
        };

        let mut log_files: Vec<PathBuf> = entries.flatten().collect();
        log_files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

        for old_file in log_files.iter().skip(1) {
            if let Err(e) = std::fs::remove_file(old_file) {
                eprintln!("Error deleting old log file {}: {}", old_file.display(), e);
            }
        }
    }

    /// Creates a logger for `app_name`.
    ///
    /// With file output enabled the log directory is created, older files are
    /// rotated away and a new `<app_name>-YYYYmmdd_HHMMSS.log` path is chosen.
    /// Directory failures are reported on stderr and file output is skipped.
    pub fn new(app_name: String, options: Option<LoggerLocalOptions>) -> Self {
        let options = options.unwrap_or_else(|| LoggerLocalOptions::tty_and_file(None));

        let mut logger = Self {
            app_name,
            options,
            file_mutex: Mutex::new(()),
            current_log_file: None,
        };

        if logger.options.use_file.is_some() {
            let log_base_dir = logger
                .options
                .log_dir
                .clone()
                .unwrap_or_else(default_log_dir);

            match std::fs::create_dir_all(&log_base_dir) {
                Ok(()) => {
                    LoggerLocal::rotate_logs(&logger.app_name, &log_base_dir);
                    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
                    let filename = format!("{}-{}.log", logger.app_name, timestamp);
                    logger.current_log_file = Some(log_base_dir.join(filename));
                }
                Err(e) => {
                    eprintln!("Error creating log directory {}: {}", log_base_dir.display(), e);
                }
            }
        }

        logger
    }

    /// Path of the file this logger appends to, if any.
    pub fn current_log_file(&self) -> Option<&Path> {
        self.current_log_file.as_deref()
    }

    /// Name given at construction.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Logs `log_message` at `log_level` to every sink enabled for that level.
    pub async fn log(&self, log_level: i64, log_message: &str, log_extras: Option<Value>) {
        let record = Logrecord::new(&self.app_name, log_level, log_message, log_extras);

        if let Some(tty_levels) = &self.options.use_tty {
            if tty_levels.contains(&log_level) {
                self.write_tty(&record);
            }
        }

        if let Some(file_levels) = &self.options.use_file {
            if file_levels.contains(&log_level) {
                self.write_file(&record).await;
            }
        }
    }

    fn write_tty(&self, record: &Logrecord) {
        let ts = record.rfc9557.as_str().truecolor(128, 128, 128);
        let app = format!("[{}]", record.app).truecolor(128, 128, 128);
        let message = record.message.as_str();
        let colored_message = match record.loglevel {
            6 => message.bright_white().on_bright_red(),
            5 => message.bright_red(),
            4 => message.bright_yellow(),
            3 => message.bright_green(),
            2 => message.bright_white(),
            1 => message.bright_cyan(),
            _ => message.blue(),
        };

        eprintln!("{}{} {}", ts, app, colored_message);
        if record.has_tags() {
            if let Ok(tags) = serde_json::to_string(&record.tags) {
                eprintln!("{}{} {}", ts, app, tags.truecolor(128, 128, 128));
            }
        }
    }

    async fn write_file(&self, record: &Logrecord) {
        let Some(path) = &self.current_log_file else {
            return;
        };
        let _guard = self.file_mutex.lock().await;
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", record.to_file_line()));
        if let Err(e) = result {
            eprintln!("Error writing log file {}: {}", path.display(), e);
        }
    }

    /// Level 0.
    pub async fn silly(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(level::SILLY, log_message, log_extras).await;
    }

    /// Level 1, execution flow.
    pub async fn trace(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(level::TRACE, log_message, log_extras).await;
    }

    /// Level 2, internal details.
    pub async fn debug(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(level::DEBUG, log_message, log_extras).await;
    }

    /// Level 3, normal progress.
    pub async fn info(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(level::INFO, log_message, log_extras).await;
    }

    /// Level 4, unusual but recoverable.
    pub async fn warn(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(level::WARN, log_message, log_extras).await;
    }

    /// Level 5, a failed operation.
    pub async fn error(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(level::ERROR, log_message, log_extras).await;
    }

    /// Level 6.
    pub async fn fatal(&self, log_message: &str, log_extras: Option<Value>) {
        self.log(level::FATAL, log_message, log_extras).await;
    }
}
