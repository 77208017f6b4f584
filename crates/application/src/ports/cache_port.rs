//! Forecast cache port definition
//!
//! Defines the interface for persisting raw and averaged forecast payloads.
//! Entries are keyed by [`CacheKey`] and expire after a configured lifetime;
//! expiry is the adapter's concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::CacheKey;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use crate::error::ApplicationError;

/// A payload read back from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Key the payload was stored under
    pub key: CacheKey,
    /// The stored JSON document
    pub payload: Value,
    /// When the entry was last written
    pub stored_at: DateTime<Utc>,
}

/// Cache port for forecast payloads
///
/// Implementations must never return an expired entry and must make writes
/// atomic: a reader sees either the previous payload or the new one, never a
/// partial document.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ForecastCachePort: Send + Sync {
    /// Get the payload stored under `key`
    ///
    /// Returns `None` if nothing is stored or the entry has expired.
    /// Expired entries are removed as a side effect.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, ApplicationError>;

    /// Store `payload` under `key`, replacing any previous entry
    async fn put(&self, key: &CacheKey, payload: &Value) -> Result<(), ApplicationError>;

    /// Remove the entry stored under `key`, if any
    async fn invalidate(&self, key: &CacheKey) -> Result<(), ApplicationError>;
}
