//! Stormglass adapter - Implements ForecastApiPort using integration_stormglass

use application::error::ApplicationError;
use application::ports::ForecastApiPort;
use async_trait::async_trait;
use integration_stormglass::{
    PointForecastClient, StormglassClient, StormglassConfig, StormglassError,
};
use tracing::{debug, instrument};

/// Adapter for the Stormglass point endpoint
#[derive(Debug)]
pub struct StormglassAdapter {
    client: StormglassClient,
}

impl StormglassAdapter {
    /// Create with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn with_config(config: StormglassConfig) -> Result<Self, ApplicationError> {
        let client = StormglassClient::new(config).map_err(Self::map_error)?;
        Ok(Self { client })
    }

    /// Map integration error to application error
    fn map_error(err: StormglassError) -> ApplicationError {
        match err {
            StormglassError::MissingApiKey => {
                ApplicationError::Configuration("No Stormglass API key configured".into())
            },
            StormglassError::ConnectionFailed(_)
            | StormglassError::Timeout(_)
            | StormglassError::RequestFailed(_)
            | StormglassError::Unauthorized(_)
            | StormglassError::ServiceUnavailable(_)
            | StormglassError::RateLimitExceeded => ApplicationError::Transport(err.to_string()),
        }
    }
}

#[async_trait]
impl ForecastApiPort for StormglassAdapter {
    #[instrument(skip(self, query))]
    async fn fetch_point(&self, query: &[(String, String)]) -> Result<Vec<u8>, ApplicationError> {
        let body = self
            .client
            .point_request(query)
            .await
            .map_err(Self::map_error)?;
        debug!(bytes = body.len(), "Stormglass response received");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_configuration_error() {
        assert!(matches!(
            StormglassAdapter::map_error(StormglassError::MissingApiKey),
            ApplicationError::Configuration(_)
        ));
    }

    #[test]
    fn network_failures_are_transport_errors() {
        for err in [
            StormglassError::Timeout("slow".into()),
            StormglassError::ConnectionFailed("refused".into()),
            StormglassError::RateLimitExceeded,
        ] {
            let mapped = StormglassAdapter::map_error(err);
            assert!(mapped.is_retryable(), "{mapped}");
        }
    }

    #[test]
    fn adapter_builds_from_config() {
        assert!(StormglassAdapter::with_config(StormglassConfig::default()).is_ok());
    }
}
