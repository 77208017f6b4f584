//! Application layer - Use cases and orchestration
//!
//! Contains the forecast pipeline, request canonicalisation, cross-source
//! averaging and the city gazetteer, together with the ports that the
//! infrastructure layer implements.

pub mod cache_key;
pub mod date_parser;
pub mod error;
pub mod ports;
pub mod services;

pub use cache_key::{averaged_cache_key, derive_cache_key, forecast_cache_key};
pub use date_parser::parse_date_expression;
pub use error::{ApplicationError, RemoteFieldError, ValidationErrors, ValidationIssue};
pub use ports::*;
pub use services::*;
