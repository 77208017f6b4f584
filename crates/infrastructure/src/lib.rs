//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the file-backed
//! forecast cache and the Stormglass API adapter, plus configuration
//! loading, the gazetteer file loader and logging setup.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use cache::FileCache;
pub use config::{AppConfig, CacheConfig, GazetteerConfig, GeoLocationConfig, StormglassAppConfig};
pub use telemetry::{LogFormat, LoggingConfig, TelemetryError, init_logging};
