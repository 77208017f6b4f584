//! Forecast pipeline
//!
//! canonical query → cache lookup → remote fetch on miss → cache store →
//! optional averaging (itself cached) → result.

use std::fmt;
use std::sync::Arc;

use domain::{CacheKey, ForecastQuery};
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::response::interpret_response;
use super::source_averager::SourceAverager;
use crate::cache_key::{averaged_cache_key, forecast_cache_key};
use crate::error::ApplicationError;
use crate::ports::{ForecastApiPort, ForecastCachePort};

/// Per-request switches for [`ForecastService::fetch`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Ignore cached entries and fetch again
    pub refresh: bool,
    /// Never touch the network; serve from cache or fail
    pub offline: bool,
    /// Return the source-averaged payload instead of the raw one
    pub average: bool,
}

/// Result of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    /// Cache key of the returned payload
    pub key: CacheKey,
    /// The raw or averaged payload
    pub payload: Value,
    /// Whether the payload was served from cache without any fetch
    pub from_cache: bool,
}

/// Orchestrates cache, remote API and averaging for one query at a time
pub struct ForecastService {
    api: Arc<dyn ForecastApiPort>,
    cache: Arc<dyn ForecastCachePort>,
    averager: SourceAverager,
}

impl fmt::Debug for ForecastService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastService")
            .field("averager", &self.averager)
            .finish_non_exhaustive()
    }
}

impl ForecastService {
    /// Create a new forecast service
    pub fn new(api: Arc<dyn ForecastApiPort>, cache: Arc<dyn ForecastCachePort>) -> Self {
        Self {
            api,
            cache,
            averager: SourceAverager::new(),
        }
    }

    /// Use a custom averager
    #[must_use]
    pub fn with_averager(mut self, averager: SourceAverager) -> Self {
        self.averager = averager;
        self
    }

    /// Run the pipeline for a canonical query
    ///
    /// In offline mode the cache is always consulted, even with `refresh`.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::Offline`] on a cache miss in offline mode
    /// - [`ApplicationError::Transport`] / [`ApplicationError::RemoteApi`] from the fetch
    /// - cache errors from the cache port
    /// - [`ApplicationError::MalformedRecord`] if averaging fails
    #[instrument(skip(self, query), fields(geo = %query.geo()))]
    pub async fn fetch(
        &self,
        query: &ForecastQuery,
        options: FetchOptions,
    ) -> Result<ForecastOutcome, ApplicationError> {
        let use_cache = !options.refresh || options.offline;

        if options.average && use_cache {
            let key = averaged_cache_key(query);
            if let Some(entry) = self.cache.get(&key).await? {
                debug!(key = %key, "Averaged forecast served from cache");
                return Ok(ForecastOutcome {
                    key,
                    payload: entry.payload,
                    from_cache: true,
                });
            }
        }

        let raw_key = forecast_cache_key(query);
        let (raw, raw_from_cache) = self.raw_payload(query, &raw_key, use_cache, options.offline).await?;

        if !options.average {
            return Ok(ForecastOutcome {
                key: raw_key,
                payload: raw,
                from_cache: raw_from_cache,
            });
        }

        let key = averaged_cache_key(query);
        let averaged = self.averager.average(&raw)?;
        self.cache.put(&key, &averaged).await?;
        debug!(key = %key, "Stored averaged forecast");

        Ok(ForecastOutcome {
            key,
            payload: averaged,
            from_cache: false,
        })
    }

    async fn raw_payload(
        &self,
        query: &ForecastQuery,
        key: &CacheKey,
        use_cache: bool,
        offline: bool,
    ) -> Result<(Value, bool), ApplicationError> {
        if use_cache {
            if let Some(entry) = self.cache.get(key).await? {
                debug!(key = %key, stored_at = %entry.stored_at, "Forecast served from cache");
                return Ok((entry.payload, true));
            }
            debug!(key = %key, "Forecast cache miss");
        }

        if offline {
            return Err(ApplicationError::Offline(key.clone()));
        }

        let pairs: Vec<(String, String)> = query
            .canonical_fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        info!(key = %key, "Fetching forecast from remote API");
        let body = self.api.fetch_point(&pairs).await?;
        let payload = interpret_response(&body)?;

        self.cache.put(key, &payload).await?;
        debug!(key = %key, bytes = body.len(), "Stored forecast");
        Ok((payload, false))
    }
}
