//! Stormglass API and request allow-list configuration

use domain::GeoPoint;
use integration_stormglass::StormglassConfig;
use serde::{Deserialize, Serialize};

/// Sources accepted by the point endpoint
pub const DEFAULT_SOURCES: &[&str] = &[
    "dwd", "fcoo", "fmi", "icon", "meteo", "meto", "noaa", "sg", "smhi", "yr",
];

/// Parameters accepted by the point endpoint
pub const DEFAULT_PARAMS: &[&str] = &[
    "airTemperature",
    "cloudCover",
    "currentDirection",
    "currentSpeed",
    "gust",
    "humidity",
    "iceCover",
    "precipitation",
    "pressure",
    "seaLevel",
    "secondarySwellDirection",
    "secondarySwellHeight",
    "secondarySwellPeriod",
    "snowDepth",
    "swellDirection",
    "swellHeight",
    "swellPeriod",
    "visibility",
    "waterTemperature",
    "waveDirection",
    "waveHeight",
    "wavePeriod",
    "windDirection",
    "windSpeed",
    "windWaveDirection",
    "windWaveHeight",
    "windWavePeriod",
];

/// Stormglass section of the application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormglassAppConfig {
    /// Point endpoint URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; the CLI `--key` flag takes precedence
    #[serde(default)]
    pub api_key: Option<String>,

    /// Connection timeout in seconds (default: 3)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Total request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Allowed source names
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Allowed parameter names
    #[serde(default = "default_params")]
    pub params: Vec<String>,

    /// Coordinates used in test mode
    #[serde(default)]
    pub default_location: GeoLocationConfig,
}

fn default_base_url() -> String {
    StormglassConfig::default().base_url
}

const fn default_connect_timeout() -> u64 {
    3
}

const fn default_timeout() -> u64 {
    30
}

fn default_sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(ToString::to_string).collect()
}

fn default_params() -> Vec<String> {
    DEFAULT_PARAMS.iter().map(ToString::to_string).collect()
}

impl Default for StormglassAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
            sources: default_sources(),
            params: default_params(),
            default_location: GeoLocationConfig::default(),
        }
    }
}

impl StormglassAppConfig {
    /// The API key to use, preferring `override_key` when it is non-blank
    #[must_use]
    pub fn resolve_api_key(&self, override_key: Option<&str>) -> Option<String> {
        [override_key, self.api_key.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|key| !key.is_empty())
            .map(str::to_string)
    }

    /// Client configuration with the resolved API key
    #[must_use]
    pub fn to_client_config(&self, api_key: Option<String>) -> StormglassConfig {
        StormglassConfig {
            base_url: self.base_url.clone(),
            api_key,
            connect_timeout_secs: self.connect_timeout_secs,
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Geographic location configuration (latitude/longitude pair)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocationConfig {
    /// Latitude (-90.0 to 90.0)
    pub latitude: f64,
    /// Longitude (-180.0 to 180.0)
    pub longitude: f64,
}

/// Skagen, Denmark
impl Default for GeoLocationConfig {
    fn default() -> Self {
        Self {
            latitude: 57.720_93,
            longitude: 10.583_94,
        }
    }
}

impl GeoLocationConfig {
    /// Convert to domain `GeoPoint` value object
    ///
    /// Returns `None` if coordinates are invalid.
    #[must_use]
    pub fn to_geo_point(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.latitude, self.longitude).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_client_defaults() {
        let config = StormglassAppConfig::default();
        let client = config.to_client_config(None);
        assert_eq!(client.base_url, StormglassConfig::default().base_url);
        assert_eq!(client.connect_timeout_secs, 3);
        assert_eq!(client.timeout_secs, 30);
    }

    #[test]
    fn override_key_wins() {
        let config = StormglassAppConfig {
            api_key: Some("from-config".into()),
            ..StormglassAppConfig::default()
        };
        assert_eq!(
            config.resolve_api_key(Some("from-cli")).as_deref(),
            Some("from-cli")
        );
        assert_eq!(config.resolve_api_key(None).as_deref(), Some("from-config"));
    }

    #[test]
    fn blank_key_is_absent() {
        let config = StormglassAppConfig {
            api_key: Some("   ".into()),
            ..StormglassAppConfig::default()
        };
        assert_eq!(config.resolve_api_key(None), None);
        assert_eq!(config.resolve_api_key(Some("")), None);
    }

    #[test]
    fn blank_override_falls_back_to_config() {
        let config = StormglassAppConfig {
            api_key: Some("from-config".into()),
            ..StormglassAppConfig::default()
        };
        assert_eq!(config.resolve_api_key(Some(" ")).as_deref(), Some("from-config"));
    }

    #[test]
    fn default_location_is_valid() {
        assert!(GeoLocationConfig::default().to_geo_point().is_some());
        let bad = GeoLocationConfig {
            latitude: 100.0,
            longitude: 0.0,
        };
        assert!(bad.to_geo_point().is_none());
    }

    #[test]
    fn allow_lists_are_sorted() {
        assert!(DEFAULT_SOURCES.windows(2).all(|w| w[0] < w[1]));
        assert!(DEFAULT_PARAMS.windows(2).all(|w| w[0] < w[1]));
    }
}
