//! Stormyglass CLI
//!
//! Fetches marine point forecasts from Stormglass, caches them on disk and
//! optionally averages the per-source readings.

#![allow(clippy::print_stdout)]

mod forecast;

use std::path::PathBuf;

use application::ApplicationError;
use clap::{Args, Parser, Subcommand};
use infrastructure::{AppConfig, adapters::load_gazetteer, init_logging};

use crate::forecast::ForecastArgs;

/// Stormyglass CLI
#[derive(Debug, Parser)]
#[command(name = "stormyglass")]
#[command(author, version, about = "Stormglass marine forecast fetcher", long_about = None)]
struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./stormyglass.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a point forecast
    ///
    /// Example: stormyglass forecast --latitude 57.72 --longitude 10.58 --params waveHeight --average
    Forecast(ForecastArgs),

    /// Look up cities in the gazetteer
    ///
    /// Example: stormyglass city --search skagen
    City(CityArgs),

    /// Print the effective configuration as TOML (API key masked)
    Config,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct CityArgs {
    /// City id
    #[arg(long)]
    id: Option<u64>,

    /// Case-insensitive substring of any city name
    #[arg(long)]
    search: Option<String>,
}

/// Placeholder shown instead of a configured API key
const MASKED_KEY: &str = "********";

/// Render the configuration with the API key masked
fn render_config(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut masked = config.clone();
    if masked.stormglass.api_key.is_some() {
        masked.stormglass.api_key = Some(MASKED_KEY.to_string());
    }
    toml::to_string_pretty(&masked)
}

fn run_city(args: &CityArgs, config: &AppConfig) -> Result<serde_json::Value, ApplicationError> {
    let gazetteer = load_gazetteer(&config.gazetteer.path)?;

    let value = match args.id {
        Some(id) => serde_json::to_value(gazetteer.find_by_id(id)?),
        None => serde_json::to_value(gazetteer.search(args.search.as_deref().unwrap_or_default())?),
    };
    value.map_err(|e| ApplicationError::Internal(format!("Failed to encode cities: {e}")))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Forecast(args) => {
            forecast::run(&args, &config).await?;
        },

        Commands::City(args) => {
            let cities = run_city(&args, &config)?;
            println!("{}", serde_json::to_string_pretty(&cities)?);
        },

        Commands::Config => {
            print!("{}", render_config(&config)?);
        },
    }

    Ok(())
}
