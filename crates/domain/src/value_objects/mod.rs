//! Value Objects - Immutable, identity-less domain primitives

mod cache_key;
mod forecast_query;
mod geo_point;

pub use cache_key::CacheKey;
pub use forecast_query::{ForecastQuery, field};
pub use geo_point::{GeoPoint, InvalidCoordinate};
