//! CLI entry point for the air-quality ETL.
//!
//! `current` stores today's readings for every configured location;
//! `backfill` fills in the preceding days from the history endpoints.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use air_quality_etl::config::{DatabaseConfig, google_api_key_from_env, load_locations};
use air_quality_etl::driver::{RunConfig, RunDriver, RunMode, RunSummary};
use air_quality_etl::fetch::BasicClient;
use air_quality_etl::fetch::auth::UrlParam;
use air_quality_etl::infra::google::client::GoogleAirQualityClient;
use air_quality_etl::infra::open_meteo::client::OpenMeteoClient;
use air_quality_etl::store::{InMemoryStore, PgStore};
use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "air_quality_etl")]
#[command(about = "Collect daily air quality and weather readings into PostgreSQL", long_about = None)]
struct Cli {
    /// JSON file listing the locations to track (falls back to $LOCATIONS_FILE,
    /// then the built-in list)
    #[arg(long, global = true, value_name = "FILE")]
    locations: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and store today's readings for every location
    Current {
        /// Keep readings in memory and log them instead of writing to the database
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Fetch and store readings for the days before today
    Backfill {
        /// Number of past days to fill, ending yesterday
        #[arg(short = 'n', long, default_value_t = 28, value_parser = clap::value_parser!(u32).range(1..))]
        days: u32,

        /// Pause between units of work, in milliseconds
        #[arg(long, default_value_t = 1000)]
        pause_ms: u64,

        /// Keep readings in memory and log them instead of writing to the database
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    let (mode, dry_run) = match cli.command {
        Commands::Current { dry_run } => (RunMode::Current, dry_run),
        Commands::Backfill {
            days,
            pause_ms,
            dry_run,
        } => (
            RunMode::Backfill {
                days,
                pause: Duration::from_millis(pause_ms),
            },
            dry_run,
        ),
    };

    // Configuration problems stop the run before any request is sent.
    let locations_path = cli
        .locations
        .or_else(|| std::env::var_os("LOCATIONS_FILE").map(PathBuf::from));
    let locations = load_locations(locations_path.as_deref())?;
    let api_key = google_api_key_from_env()?;
    let database = if dry_run {
        None
    } else {
        Some(DatabaseConfig::from_env()?)
    };

    let air_quality = GoogleAirQualityClient::new(UrlParam::key(BasicClient::new(), api_key));
    let weather = OpenMeteoClient::new(BasicClient::new());
    let config = RunConfig { locations, mode };
    let today = Local::now().date_naive();

    info!(
        mode = ?config.mode,
        locations = config.locations.len(),
        dry_run,
        "Starting ETL process"
    );

    let summary: RunSummary = match database {
        None => {
            let driver = RunDriver::new(air_quality, weather, InMemoryStore::new(), config);
            let summary = driver.run(today).await;
            for (location_id, reading) in driver.store().readings() {
                info!(
                    location_id,
                    reading = %serde_json::to_string(&reading)?,
                    "Dry-run reading"
                );
            }
            summary
        }
        Some(database) => {
            let store = match PgStore::connect(&database).await {
                Ok(store) => store,
                Err(e) => {
                    error!(error = %format!("{e:#}"), "Halting run: database connection failed");
                    return Err(e);
                }
            };
            RunDriver::new(air_quality, weather, store, config)
                .run(today)
                .await
        }
    };

    info!(
        stored = summary.stored,
        skipped = summary.skipped,
        failed = summary.failed,
        "ETL process finished"
    );
    Ok(())
}

/// Colored stderr output plus a JSON daily-rolling log file.
///
/// The returned guard must be held for the life of the process so buffered
/// file output is flushed.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/air_quality_etl.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("air_quality_etl.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}
