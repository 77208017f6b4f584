//! `forecast` subcommand

use std::path::{Path, PathBuf};
use std::sync::Arc;

use application::{
    ApplicationError, FetchOptions, ForecastOutcome, ForecastRequest, ForecastService,
    RequestCanonicalizer,
};
use clap::Args;
use domain::GeoPoint;
use infrastructure::{AppConfig, FileCache, StormglassAdapter, adapters::load_gazetteer};
use tracing::info;

/// Arguments of the `forecast` subcommand
#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Stormglass API key (overrides `stormglass.api_key`)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["city_id", "test"])]
    pub latitude: Option<String>,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["city_id", "test"])]
    pub longitude: Option<String>,

    /// Resolve coordinates from a gazetteer city id
    #[arg(long, conflicts_with = "test")]
    pub city_id: Option<u64>,

    /// Comma-separated sources (empty: all)
    #[arg(short, long, default_value = "")]
    pub source: String,

    /// Comma-separated parameters (empty: all)
    #[arg(short, long, default_value = "")]
    pub params: String,

    /// Start of the time range (e.g. "2024-01-15 06:00", "tomorrow", "@1705276800")
    #[arg(long)]
    pub date_from: Option<String>,

    /// End of the time range
    #[arg(long)]
    pub date_to: Option<String>,

    /// Ignore cached entries and fetch again
    #[arg(long)]
    pub refresh: bool,

    /// Serve from cache only
    #[arg(long)]
    pub offline: bool,

    /// Average readings across sources
    #[arg(short, long)]
    pub average: bool,

    /// Use the configured default location
    #[arg(long)]
    pub test: bool,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Output file name, relative to `--dir`
    #[arg(short, long, default_value = "output.json")]
    pub output: PathBuf,

    /// Also print the result to stdout
    #[arg(short, long)]
    pub echo: bool,
}

impl ForecastArgs {
    /// Pipeline switches selected on the command line
    pub const fn options(&self) -> FetchOptions {
        FetchOptions {
            refresh: self.refresh,
            offline: self.offline,
            average: self.average,
        }
    }

    /// Where the result is written
    pub fn output_path(&self) -> PathBuf {
        self.dir.join(&self.output)
    }

    /// Raw request fragments, with coordinates taken from `point` when given
    pub fn to_request(&self, point: Option<GeoPoint>) -> ForecastRequest {
        let mut request = match point {
            Some(point) => ForecastRequest::at(point.latitude(), point.longitude()),
            None => ForecastRequest {
                latitude: self.latitude.clone().unwrap_or_default(),
                longitude: self.longitude.clone().unwrap_or_default(),
                ..ForecastRequest::default()
            },
        };
        request.sources.clone_from(&self.source);
        request.params.clone_from(&self.params);
        request.date_from = self.date_from.clone().unwrap_or_default();
        request.date_to = self.date_to.clone().unwrap_or_default();
        request
    }
}

/// Coordinates implied by `--test` or `--city-id`, if any
fn resolve_point(args: &ForecastArgs, config: &AppConfig) -> Result<Option<GeoPoint>, ApplicationError> {
    if args.test {
        let location = config.stormglass.default_location;
        return location.to_geo_point().map(Some).ok_or_else(|| {
            ApplicationError::Configuration(format!(
                "Invalid default location ({}, {})",
                location.latitude, location.longitude
            ))
        });
    }

    match args.city_id {
        Some(id) => {
            let gazetteer = load_gazetteer(&config.gazetteer.path)?;
            let city = gazetteer.find_by_id(id)?;
            info!(id, name = %city.name, "Resolved city");
            Ok(Some(city.geo))
        },
        None => Ok(None),
    }
}

async fn write_output(path: &Path, outcome: &ForecastOutcome) -> anyhow::Result<String> {
    let mut text = serde_json::to_string_pretty(&outcome.payload)?;
    text.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &text).await?;
    Ok(text)
}

/// Run the `forecast` subcommand
pub async fn run(args: &ForecastArgs, config: &AppConfig) -> anyhow::Result<()> {
    let timezone = config.timezone().map_err(ApplicationError::Configuration)?;
    let canonicalizer =
        RequestCanonicalizer::new(&config.stormglass.sources, &config.stormglass.params, timezone);

    let point = resolve_point(args, config)?;
    let query = canonicalizer.canonicalize(&args.to_request(point))?;

    let api_key = config.stormglass.resolve_api_key(args.key.as_deref());
    if api_key.is_none() && !args.offline {
        return Err(ApplicationError::Configuration(
            "No Stormglass API key: pass --key or set stormglass.api_key".into(),
        )
        .into());
    }

    let adapter = StormglassAdapter::with_config(config.stormglass.to_client_config(api_key))?;
    let cache = FileCache::from_config(&config.cache);
    let service = ForecastService::new(Arc::new(adapter), Arc::new(cache));

    let outcome = service.fetch(&query, args.options()).await?;

    let path = args.output_path();
    let text = write_output(&path, &outcome).await?;
    info!(
        key = %outcome.key,
        from_cache = outcome.from_cache,
        path = %path.display(),
        "Forecast written"
    );

    if args.echo {
        print!("{text}");
    }
    Ok(())
}
