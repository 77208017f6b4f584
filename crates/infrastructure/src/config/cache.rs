//! Cache configuration with TTL settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// File cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one JSON file per cache key (default: `cache`)
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Seconds after the last write before an entry is stale (default: 1 hour)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

fn default_directory() -> PathBuf {
    PathBuf::from("cache")
}

const fn default_ttl() -> u64 {
    60 * 60 // 1 hour
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            ttl_secs: default_ttl(),
        }
    }
}

impl CacheConfig {
    /// TTL as a `Duration`
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
