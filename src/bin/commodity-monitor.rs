//! commodity-monitor CLI - price analytics over a DuckDB price database

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commodity_monitor::config::DEFAULT_TREND_MONTHS;
use commodity_monitor::CommodityMonitor;
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "commodity-monitor")]
#[command(about = "Commodity price trends, volatility and forecasts")]
struct Cli {
    /// DuckDB database file (defaults to the platform data directory)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Directory of <table>.ndjson[.gz] files to import before querying
    #[arg(long, value_name = "DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Reference date for month windows (format: YYYY-MM-DD, defaults to today)
    #[arg(long)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Average price per month over a trailing window
    Trend {
        commodity_id: i64,

        /// Number of calendar months to look back
        #[arg(long, default_value_t = DEFAULT_TREND_MONTHS)]
        months: u32,
    },
    /// Average price per city, highest first
    Cities { commodity_id: i64 },
    /// Volatility rating for every commodity
    Volatility,
    /// This month's average against last month's
    Inflation { commodity_id: i64 },
    /// Three-month moving average forecast for next month
    Forecast { commodity_id: i64 },
    /// Raw price observations, newest first
    History { commodity_id: i64 },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    // A snapshot on its own is loaded into a throwaway in-memory database.
    let mut builder = CommodityMonitor::builder();
    match (&cli.database, &cli.snapshot_dir) {
        (Some(path), _) => builder = builder.database(path),
        (None, None) => builder = builder.default_database(),
        (None, Some(_)) => {}
    }
    if let Some(dir) = &cli.snapshot_dir {
        builder = builder.snapshot_dir(dir);
    }
    let monitor = builder.build().context("failed to open price database")?;
    info!(%monitor, %today, "monitor ready");

    let analytics = monitor.analytics();
    match cli.command {
        Commands::Trend {
            commodity_id,
            months,
        } => print_json(&analytics.monthly_trend(commodity_id, months, today)?),
        Commands::Cities { commodity_id } => {
            print_json(&analytics.city_comparison(commodity_id)?)
        }
        Commands::Volatility => print_json(&analytics.volatility()?),
        Commands::Inflation { commodity_id } => {
            print_json(&analytics.inflation_trend(commodity_id, today)?)
        }
        Commands::Forecast { commodity_id } => {
            print_json(&analytics.moving_average_forecast(commodity_id, today)?)
        }
        Commands::History { commodity_id } => {
            print_json(&monitor.observations().for_commodity(commodity_id)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
