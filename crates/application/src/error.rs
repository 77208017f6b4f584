//! Application-level errors

use std::fmt;

use domain::{CacheKey, DomainError};
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// Every variant terminates the current request only; none is fatal to the
/// process.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// One or more request fragments failed validation
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Network failure, timeout or undecodable response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Per-parameter errors reported by the forecast API
    #[error("Forecast API error: {}", join_remote(.0))]
    RemoteApi(Vec<RemoteFieldError>),

    /// Cache entry could not be written
    #[error("Failed to write cache entry {key}: {reason}")]
    CacheWriteFailure { key: CacheKey, reason: String },

    /// Cache entry exists but does not contain valid JSON
    #[error("Cache entry {key} is corrupt: {reason}")]
    CacheReadCorruption { key: CacheKey, reason: String },

    /// An hourly record cannot be averaged
    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: String, reason: String },

    /// No city with the given id
    #[error("City not found: {0}")]
    CityNotFound(u64),

    /// Search text matched no city
    #[error("No city matches '{0}'")]
    NoCityMatch(String),

    /// Network access is disabled and nothing is cached for the request
    #[error("Offline mode: no cached data for {0}")]
    Offline(CacheKey),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable by the caller
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this error was caused by caller input
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// A single error reported by the forecast API for one request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFieldError {
    /// Name of the offending request parameter
    pub param: String,
    /// Message returned by the remote service
    pub message: String,
}

impl fmt::Display for RemoteFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.param, self.message)
    }
}

fn join_remote(errors: &[RemoteFieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single validation problem in a forecast request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    /// Latitude or longitude missing, unparsable or out of range
    #[error("You must specify a value for {field} ({range}), got '{value}'")]
    InvalidCoordinate {
        field: &'static str,
        range: &'static str,
        value: String,
    },

    /// Source not in the configured allow-list
    #[error("Unknown source specified: '{token}'. Must be at least one of ({})", .allowed.join(", "))]
    UnknownSource { token: String, allowed: Vec<String> },

    /// Param not in the configured allow-list
    #[error("Unknown param specified: '{token}'. Must be at least one of ({})", .allowed.join(", "))]
    UnknownParam { token: String, allowed: Vec<String> },

    /// Date expression could not be parsed
    #[error("Unable to parse {field}: '{input}'")]
    InvalidDateExpression { field: &'static str, input: String },
}

/// All validation problems found in one request, reported together
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Invalid request: {}", join_issues(.issues))]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Recorded issues in the order they were found
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Whether no issue was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// `Ok(value)` if nothing was recorded, otherwise `Err(self)`
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
