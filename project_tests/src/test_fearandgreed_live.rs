//! # Fear & Greed Live Data Test
//!
//! Fetches the production CNN endpoint through lib_common and prints the
//! complete text report. Pass `--date YYYY-MM-DD` for a historical snapshot.

use chrono::NaiveDate;
use clap::Parser;
use lib_common::loggers::{LoggerLocal, LoggerLocalOptions};
use lib_common::markets::cnn::report::complete_report;
use lib_common::markets::cnn::{ApiCallCnn, FearAndGreed};
use std::sync::Arc;

#[derive(Parser)]
#[clap(name = "test_fearandgreed_live", about = "Live CNN Fear & Greed fetch.")]
struct Args {
    /// Snapshot date instead of the latest document.
    #[clap(long)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // // Statement: Console and file logging so failures are visible immediately
    let logger = Arc::new(LoggerLocal::new(
        "fgi_live_test".to_string(),
        Some(LoggerLocalOptions::tty_and_file(None)),
    ));
    let api_call = Arc::new(ApiCallCnn::new(Arc::clone(&logger))?);
    let provider = FearAndGreed::new(api_call, logger);

    println!("[*] Requesting live data from CNN...");

    let result = match args.date {
        Some(date) => provider.fetch_at_date(date).await,
        None => provider.fetch_latest().await,
    };

    match result {
        Ok(index) => {
            println!("\n[SUCCESS] Data received:");
            println!("-----------------------------------------------");
            println!("{}", complete_report(&index));
            println!("-----------------------------------------------");
            println!("[INFO] Historical points: {}", index.historical.len());
            println!("[INFO] Signal: {}", index.signal().label());
        }
        Err(e) => {
            eprintln!("\n[ERROR] Fear & Greed retrieval failed:");
            eprintln!(">>> {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
