//! Application services - Use case implementations

mod forecast_service;
mod forecast_value;
mod gazetteer;
mod request_canonicalizer;
mod response;
mod source_averager;

pub use forecast_service::{FetchOptions, ForecastOutcome, ForecastService};
pub use forecast_value::ForecastValue;
pub use gazetteer::{Gazetteer, parse_city_row};
pub use request_canonicalizer::{ForecastRequest, RequestCanonicalizer};
pub use response::{ERRORS_FIELD, interpret_response, prune_empty};
pub use source_averager::{DEFAULT_TIME_FIELD, HOURS_FIELD, SourceAverager};
