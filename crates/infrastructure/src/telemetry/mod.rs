//! Logging infrastructure
//!
//! Console logging via `tracing-subscriber`, as plain text or JSON lines.

mod logging;

pub use logging::{LogFormat, LoggingConfig, TelemetryError, filter_from_verbosity, init_logging};
