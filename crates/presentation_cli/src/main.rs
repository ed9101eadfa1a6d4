//! KNMI CLI
//!
//! Fetches weather data for the configured location and prints it as JSON.

#![allow(clippy::print_stdout)]

mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use integration_knmi::{KnmiClient, WeatherClient};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::Overrides;

/// KNMI CLI
#[derive(Parser)]
#[command(name = "knmi-cli")]
#[command(author, version, about = "KNMI weather data via Meteoserver", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Meteoserver API key (overrides the configuration file)
    #[arg(long, env = "KNMI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Latitude of the location
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Longitude of the location
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current conditions
    Current,

    /// Show the hourly forecast for the next 24 hours
    Hourly,

    /// Show the forecast aggregated per day
    Daily {
        /// Leave out the last (possibly incomplete) day
        #[arg(long)]
        drop_trailing_day: bool,
    },

    /// Show the forecast payload as returned by the provider
    Raw,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(
            cli.verbose,
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let loaded = settings::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let overrides = Overrides {
        api_key: cli.api_key,
        latitude: cli.latitude,
        longitude: cli.longitude,
        drop_trailing_day: matches!(
            cli.command,
            Commands::Daily {
                drop_trailing_day: true
            }
        ),
    };
    let client = KnmiClient::new(overrides.apply(loaded))?;
    debug!(config = ?client.config(), "Client configured");

    let start = Instant::now();

    let output = match cli.command {
        Commands::Current => serde_json::to_value(client.current().await?)?,
        Commands::Hourly => serde_json::to_value(client.hourly().await?)?,
        Commands::Daily { .. } => serde_json::to_value(client.daily().await?)?,
        Commands::Raw => client.raw_forecast().await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    info!(
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Execution time"
    );

    Ok(())
}
