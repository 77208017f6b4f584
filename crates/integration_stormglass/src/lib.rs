//! Stormglass integration
//!
//! Client for the Stormglass point-forecast endpoint
//! (<https://docs.stormglass.io>). The client only moves bytes: it sends the
//! query with the API key attached and hands back the response body.
//! Interpreting the JSON is left to the caller.

pub mod client;

pub use client::{PointForecastClient, StormglassClient, StormglassConfig, StormglassError};
