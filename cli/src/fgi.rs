//! # fgi
//!
//! Terminal client for the CNN Fear & Greed Index. Fetches one snapshot per
//! invocation (or one per interval in watch mode) and renders it as colored
//! text or JSON.

mod render;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use lib_common::loggers::{LoggerLocal, LoggerLocalOptions};
use lib_common::markets::cnn::{ApiCallCnn, CnnOptions, CompositeIndex, FearAndGreed};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// CLI arguments for fgi.
#[derive(Parser)]
#[clap(
    name = "fgi",
    version = "1.0.0",
    about = "CNN Fear & Greed Index in the terminal.",
    long_about = "Fetches the CNN Fear & Greed Index and its seven sub-indicators. \
                  Runs the dashboard view when no command is given."
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    /// Override the upstream base URL.
    #[clap(long, env = "FGI_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds.
    #[clap(long, env = "FGI_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,

    /// Directory for the log file.
    #[clap(long, env = "FGI_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq)]
enum Command {
    /// Gauge, period comparison and indicator table.
    Dashboard,
    /// Current score and rating on one line.
    Score,
    /// Trading signal derived from the score.
    Signal,
    /// A gauge panel for each sub-indicator.
    Indicators,
    /// Recent daily scores, newest first.
    History {
        /// Number of days to show.
        #[clap(long, short = 'l', default_value_t = 10)]
        limit: usize,
    },
    /// Snapshot summary as pretty JSON.
    Json,
    /// Redraw a compact view every interval until Ctrl+C.
    Watch {
        /// Seconds between refreshes.
        #[clap(long, short = 'i', default_value_t = 60)]
        interval: u64,
    },
}

impl Cli {
    fn client(&self) -> Result<FearAndGreed> {
        let logger = Arc::new(LoggerLocal::new(
            "fgi".to_string(),
            Some(LoggerLocalOptions::file_only(self.log_dir.clone())),
        ));
        let mut options = CnnOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            ..CnnOptions::default()
        };
        if let Some(endpoint) = &self.endpoint {
            options.base_url = endpoint.clone();
        }
        let api_call = ApiCallCnn::with_options(options, logger.clone())
            .context("Invalid Fear & Greed endpoint")?;
        Ok(FearAndGreed::new(Arc::new(api_call), logger))
    }
}

fn render_once(command: Command, index: &CompositeIndex) -> Result<String> {
    Ok(match command {
        Command::Dashboard | Command::Watch { .. } => render::dashboard(index, &Local::now()),
        Command::Score => render::score_line(index),
        Command::Signal => render::signal_panel(index),
        Command::Indicators => render::indicator_panels(index),
        Command::History { limit } => render::history_table(index, limit),
        Command::Json => render::json_summary(index)?,
    })
}

async fn watch(fgi: &FearAndGreed, interval: u64) {
    println!("{} - Press Ctrl+C to exit\n", "Watch mode".cyan().bold());
    let period = Duration::from_secs(interval.max(1));

    loop {
        match fgi.fetch_latest().await {
            Ok(index) => {
                print!("\x1B[2J\x1B[H");
                println!("{}", render::watch_frame(&index, interval, &Local::now()));
            }
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }

        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}", "Stopped watching.".yellow());
                return;
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Command::Dashboard);
    let fgi = cli.client()?;

    if let Command::Watch { interval } = command {
        watch(&fgi, interval).await;
        return Ok(());
    }

    let index = fgi
        .fetch_latest()
        .await
        .context("Failed to fetch the Fear & Greed Index")?;
    println!("{}", render_once(command, &index)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
