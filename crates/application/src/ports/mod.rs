//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod cache_port;
mod forecast_port;

#[cfg(test)]
pub use cache_port::MockForecastCachePort;
pub use cache_port::{CacheEntry, ForecastCachePort};
#[cfg(test)]
pub use forecast_port::MockForecastApiPort;
pub use forecast_port::ForecastApiPort;
