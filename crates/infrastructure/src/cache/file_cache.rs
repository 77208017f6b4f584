//! File-backed forecast cache
//!
//! One pretty-printed JSON document per key at `<directory>/<key>.json`.
//! The file modification time is the only freshness signal.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use application::{
    error::ApplicationError,
    ports::{CacheEntry, ForecastCachePort},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::CacheKey;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use crate::config::CacheConfig;

/// File extension of cache entries
const EXTENSION: &str = "json";

/// Directory of JSON files with mtime-based expiry
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so readers see either the old or the new document.
/// There is no locking: concurrent writers of the same key race and the
/// last rename wins.
#[derive(Debug, Clone)]
pub struct FileCache {
    directory: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// Create a cache rooted at `directory`
    ///
    /// The directory is created on first write.
    pub fn new(directory: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            directory: directory.into(),
            ttl,
        }
    }

    /// Create a cache from configuration
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.directory.clone(), config.ttl())
    }

    /// Cache directory
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Configured time-to-live
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the file holding `key`
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.directory.join(format!("{}.{EXTENSION}", key.as_str()))
    }

    fn read_entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>, ApplicationError> {
        let path = self.path_for(key);

        let modified = match fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Cache file not found");
                return Ok(None);
            },
            Err(e) => {
                return Err(ApplicationError::Internal(format!(
                    "Failed to stat cache file {}: {e}",
                    path.display()
                )));
            },
        };

        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age > self.ttl {
            warn!(
                path = %path.display(),
                age_secs = age.as_secs(),
                ttl_secs = self.ttl.as_secs(),
                "Removing stale cache file"
            );
            remove_if_present(&path).map_err(|e| {
                ApplicationError::Internal(format!(
                    "Failed to remove stale cache file {}: {e}",
                    path.display()
                ))
            })?;
            return Ok(None);
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ApplicationError::Internal(format!(
                    "Failed to read cache file {}: {e}",
                    path.display()
                )));
            },
        };

        let payload: Value =
            serde_json::from_slice(&bytes).map_err(|e| ApplicationError::CacheReadCorruption {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), bytes = bytes.len(), "Cache hit");
        Ok(Some(CacheEntry {
            key: key.clone(),
            payload,
            stored_at: DateTime::<Utc>::from(modified),
        }))
    }

    fn write_entry(&self, key: &CacheKey, payload: &Value) -> Result<(), ApplicationError> {
        let path = self.path_for(key);
        let write_failure = |reason: String| ApplicationError::CacheWriteFailure {
            key: key.clone(),
            reason,
        };

        let mut bytes = serde_json::to_vec_pretty(payload).map_err(|e| write_failure(e.to_string()))?;
        bytes.push(b'\n');

        fs::create_dir_all(&self.directory).map_err(|e| {
            write_failure(format!(
                "cannot create directory {}: {e}",
                self.directory.display()
            ))
        })?;

        // The temp file is removed on drop if anything below fails
        let mut tmp =
            NamedTempFile::new_in(&self.directory).map_err(|e| write_failure(e.to_string()))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| write_failure(e.to_string()))?;
        tmp.persist(&path)
            .map_err(|e| write_failure(e.error.to_string()))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Cache file written");
        Ok(())
    }

    fn remove_entry(&self, key: &CacheKey) -> Result<(), ApplicationError> {
        let path = self.path_for(key);
        remove_if_present(&path).map_err(|e| {
            ApplicationError::Internal(format!(
                "Failed to remove cache file {}: {e}",
                path.display()
            ))
        })
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn join_error(e: &tokio::task::JoinError) -> ApplicationError {
    ApplicationError::Internal(format!("Task join error: {e}"))
}

#[async_trait]
impl ForecastCachePort for FileCache {
    #[instrument(skip(self, key), fields(key = %key), level = "debug")]
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, ApplicationError> {
        let cache = self.clone();
        let key = key.clone();
        tokio::task::spawn_blocking(move || cache.read_entry(&key))
            .await
            .map_err(|e| join_error(&e))?
    }

    #[instrument(skip(self, key, payload), fields(key = %key), level = "debug")]
    async fn put(&self, key: &CacheKey, payload: &Value) -> Result<(), ApplicationError> {
        let cache = self.clone();
        let key = key.clone();
        let payload = payload.clone();
        tokio::task::spawn_blocking(move || cache.write_entry(&key, &payload))
            .await
            .map_err(|e| join_error(&e))?
    }

    #[instrument(skip(self, key), fields(key = %key), level = "debug")]
    async fn invalidate(&self, key: &CacheKey) -> Result<(), ApplicationError> {
        let cache = self.clone();
        let key = key.clone();
        tokio::task::spawn_blocking(move || cache.remove_entry(&key))
            .await
            .map_err(|e| join_error(&e))?
    }
}
