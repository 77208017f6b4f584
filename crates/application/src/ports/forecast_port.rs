//! Forecast API port
//!
//! The single network boundary of the pipeline.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the remote point-forecast endpoint
///
/// Implementations send the canonical query pairs and hand back the raw
/// response body. Interpreting the body (remote error maps, pruning) is done
/// by the caller so every adapter behaves the same way.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ForecastApiPort: Send + Sync {
    /// Request a point forecast
    ///
    /// `query` holds the canonical `(name, value)` pairs in sorted order.
    /// Network failures and timeouts map to [`ApplicationError::Transport`].
    async fn fetch_point(&self, query: &[(String, String)]) -> Result<Vec<u8>, ApplicationError>;
}
