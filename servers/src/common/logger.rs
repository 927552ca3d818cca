use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Where server logs go besides the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    /// For processes whose stdout carries a protocol.
    None,
}

pub fn parse_level(log_level: &str) -> log::LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "warn" => log::LevelFilter::Warn,
        "error" | "fatal" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    }
}

/// Installs the global `log` backend: a `<prefix>_<timestamp>.log` file in
/// `log_dir` plus the chosen console. Older files with the same prefix are
/// removed first.
pub fn setup_logging(log_dir: &Path, log_level: &str, prefix: &str, console: Console) -> Result<PathBuf> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    cleanup_old_logs(log_dir, prefix)?;

    let log_file_name = format!("{}_{}.log", prefix, chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let log_path = log_dir.join(log_file_name);

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(parse_level(log_level))
        .chain(fern::log_file(&log_path)?);

    if console == Console::Stdout {
        dispatch = dispatch.chain(std::io::stdout());
    }

    dispatch.apply()?;
    Ok(log_path)
}

/// Keeps only the newest `<prefix>_*.log` in `log_dir`.
pub fn cleanup_old_logs(log_dir: &Path, prefix: &str) -> Result<()> {
    let head = format!("{}_", prefix);
    let mut entries: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(|res| res.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "log"))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&head))
        })
        .collect();

    // Timestamped names sort chronologically; newest first.
    entries.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    for entry in entries.iter().skip(1) {
        if let Err(e) = fs::remove_file(entry) {
            eprintln!("Failed to delete old log file {:?}: {}", entry, e);
        }
    }

    Ok(())
}
