//! ariva CLI: closing-price lookups against ariva.de.
//!
//! Commands:
//! - `latest`: most recent closing price
//! - `price`: closing price on a given day
//! - `series`: closing prices over a date range
//!
//! Credentials are read from `ARIVA_USERNAME` / `ARIVA_PASSWORD` unless the
//! config file names other variables.

mod output;

use anyhow::{Context, Result};
use ariva_core::{ArivaSource, PricePoint, PriceSource, SourceConfig};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ariva", about = "ariva CLI: closing prices from ariva.de")]
struct Cli {
    /// Path to a TOML config file. Defaults to the public ariva.de endpoints.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Log requests and session handling to stderr.
    #[arg(long, short, default_value_t = false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Most recent closing price.
    Latest {
        /// Ticker as SYMBOL_ID:MARKET_ID (e.g., 108506260:131).
        ticker: String,
    },
    /// Closing price on a specific day.
    Price {
        /// Ticker as SYMBOL_ID:MARKET_ID.
        ticker: String,

        /// Day to look up (YYYY-MM-DD).
        #[arg(long)]
        date: String,
    },
    /// Closing prices over a date range, both ends inclusive.
    Series {
        /// Ticker as SYMBOL_ID:MARKET_ID.
        ticker: String,

        /// Start date (YYYY-MM-DD). Defaults to one year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => SourceConfig::from_file(path)?,
        None => SourceConfig::default(),
    };
    let source = ArivaSource::new(&config).context("failed to set up HTTP client")?;

    let points = match cli.command {
        Commands::Latest { ticker } => source.get_latest_price(&ticker)?.map(|p| vec![p]),
        Commands::Price { ticker, date } => source
            .get_historical_price(&ticker, midnight(parse_date(&date)?))?
            .map(|p| vec![p]),
        Commands::Series { ticker, start, end } => {
            let (start, end) = series_window(start.as_deref(), end.as_deref())?;
            source.get_prices_series(&ticker, midnight(start), midnight(end))?
        }
    };

    report(points, cli.format)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn report(points: Option<Vec<PricePoint>>, format: OutputFormat) -> Result<()> {
    match points {
        Some(points) => print!("{}", output::render(&points, format)?),
        None => eprintln!("no data available"),
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date {s:?}"))
}

fn series_window(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let end_date = end
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| Utc::now().date_naive());
    let start_date = start
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| end_date - chrono::Duration::days(365));
    Ok((start_date, end_date))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
