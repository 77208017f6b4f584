//! Application configuration
//!
//! Split into focused sub-modules:
//! - `stormglass`: API endpoint, credential, timeouts, allow-lists
//! - `cache`: cache directory and TTL
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `STORMYGLASS_*` environment variables (nested keys use `__`,
//! e.g. `STORMYGLASS_CACHE__TTL_SECS=600`).

mod cache;
mod stormglass;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::telemetry::LoggingConfig;

pub use cache::CacheConfig;
pub use stormglass::{DEFAULT_PARAMS, DEFAULT_SOURCES, GeoLocationConfig, StormglassAppConfig};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "stormyglass.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "STORMYGLASS";

/// Gazetteer dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerConfig {
    /// Path to the tab-separated city dataset (default: `cities.txt`)
    #[serde(default = "default_gazetteer_path")]
    pub path: PathBuf,
}

fn default_gazetteer_path() -> PathBuf {
    PathBuf::from("cities.txt")
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            path: default_gazetteer_path(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Stormglass API configuration
    #[serde(default)]
    pub stormglass: StormglassAppConfig,

    /// File cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// City dataset configuration
    #[serde(default)]
    pub gazetteer: GazetteerConfig,

    /// IANA timezone for naive date expressions (default: `UTC`)
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stormglass: StormglassAppConfig::default(),
            cache: CacheConfig::default(),
            gazetteer: GazetteerConfig::default(),
            timezone: default_timezone(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and an optional file
    ///
    /// With `path = None` the default file is used if it exists. An explicit
    /// path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the
    /// wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("timezone", default_timezone())?
            // Load from file if exists
            .add_source(file)
            // Override with environment variables (e.g., STORMYGLASS_STORMGLASS__API_KEY)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("stormglass.sources")
                    .with_list_parse_key("stormglass.params")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(
            cache_dir = %config.cache.directory.display(),
            ttl_secs = config.cache.ttl_secs,
            timezone = %config.timezone,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse the configured timezone
    ///
    /// # Errors
    ///
    /// Returns a message naming the invalid zone.
    pub fn timezone(&self) -> Result<Tz, String> {
        Tz::from_str(self.timezone.trim())
            .map_err(|_| format!("Invalid timezone '{}'", self.timezone))
    }
}
