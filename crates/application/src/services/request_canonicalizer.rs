//! Request canonicalisation
//!
//! Validates raw request fragments and turns them into a canonical
//! [`ForecastQuery`]. All problems found are reported together.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use domain::{DomainError, ForecastQuery, GeoPoint};
use tracing::{debug, instrument};

use crate::date_parser::parse_date_expression;
use crate::error::{ApplicationError, ValidationErrors, ValidationIssue};

/// Raw, unvalidated request fragments as supplied by a caller
///
/// Empty strings mean "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastRequest {
    /// Latitude in decimal degrees
    pub latitude: String,
    /// Longitude in decimal degrees
    pub longitude: String,
    /// Comma-separated source list
    pub sources: String,
    /// Comma-separated parameter list
    pub params: String,
    /// Start of the time range, free-form
    pub date_from: String,
    /// End of the time range, free-form
    pub date_to: String,
}

impl ForecastRequest {
    /// Create a request for a point given as numbers
    #[must_use]
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            ..Self::default()
        }
    }
}

/// Validates requests against the configured source and param allow-lists
#[derive(Debug, Clone)]
pub struct RequestCanonicalizer {
    allowed_sources: BTreeSet<String>,
    allowed_params: BTreeSet<String>,
    timezone: Tz,
}

impl RequestCanonicalizer {
    /// Create a canonicalizer
    ///
    /// Source names are case-insensitive and stored lowercase; param names
    /// are case-sensitive. An empty allow-list accepts any token.
    #[must_use]
    pub fn new<S, P>(sources: S, params: P, timezone: Tz) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            allowed_sources: sources
                .into_iter()
                .filter_map(|s| normalize_token(s.as_ref()).map(|s| s.to_lowercase()))
                .collect(),
            allowed_params: params
                .into_iter()
                .filter_map(|p| normalize_token(p.as_ref()).map(str::to_string))
                .collect(),
            timezone,
        }
    }

    /// Timezone used for naive date expressions
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Canonicalise a request, resolving relative dates against the current time
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Validation`] listing every invalid fragment.
    pub fn canonicalize(&self, request: &ForecastRequest) -> Result<ForecastQuery, ApplicationError> {
        self.canonicalize_at(request, Utc::now())
    }

    /// Canonicalise a request, resolving relative dates against `now`
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Validation`] listing every invalid fragment.
    #[instrument(skip(self, request, now))]
    pub fn canonicalize_at(
        &self,
        request: &ForecastRequest,
        now: DateTime<Utc>,
    ) -> Result<ForecastQuery, ApplicationError> {
        let mut errors = ValidationErrors::new();

        let latitude = parse_coordinate(
            &request.latitude,
            "latitude",
            "-90 to 90",
            GeoPoint::is_valid_latitude,
            &mut errors,
        );
        let longitude = parse_coordinate(
            &request.longitude,
            "longitude",
            "-180 to 180",
            GeoPoint::is_valid_longitude,
            &mut errors,
        );

        let sources = split_tokens(&request.sources.to_lowercase());
        for token in sources.difference(&self.allowed_sources) {
            if !self.allowed_sources.is_empty() {
                errors.push(ValidationIssue::UnknownSource {
                    token: token.clone(),
                    allowed: self.allowed_sources.iter().cloned().collect(),
                });
            }
        }

        let params = split_tokens(&request.params);
        for token in params.difference(&self.allowed_params) {
            if !self.allowed_params.is_empty() {
                errors.push(ValidationIssue::UnknownParam {
                    token: token.clone(),
                    allowed: self.allowed_params.iter().cloned().collect(),
                });
            }
        }

        let time_from = self.parse_date(&request.date_from, "date-from", now, &mut errors);
        let time_to = self.parse_date(&request.date_to, "date-to", now, &mut errors);

        let (latitude, longitude) = errors.into_result((latitude, longitude))?;
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Err(ApplicationError::Internal(
                "coordinates missing after validation".to_string(),
            ));
        };
        let geo = GeoPoint::new(latitude, longitude).map_err(DomainError::from)?;

        let query = ForecastQuery::new(geo)
            .with_sources(sources)
            .with_params(params)
            .with_time_range(time_from, time_to);
        debug!(fields = ?query.canonical_fields(), "Canonicalised forecast request");
        Ok(query)
    }

    fn parse_date(
        &self,
        input: &str,
        field: &'static str,
        now: DateTime<Utc>,
        errors: &mut ValidationErrors,
    ) -> Option<DateTime<Utc>> {
        if input.trim().is_empty() {
            return None;
        }
        let parsed = parse_date_expression(input, self.timezone, now);
        if parsed.is_none() {
            errors.push(ValidationIssue::InvalidDateExpression {
                field,
                input: input.to_string(),
            });
        }
        parsed
    }
}

fn parse_coordinate(
    input: &str,
    field: &'static str,
    range: &'static str,
    is_valid: fn(f64) -> bool,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    let value = input.trim().parse::<f64>().ok().filter(|v| is_valid(*v));
    if value.is_none() {
        errors.push(ValidationIssue::InvalidCoordinate {
            field,
            range,
            value: input.to_string(),
        });
    }
    value
}

/// Split a comma-separated list into a sorted, de-duplicated set
fn split_tokens(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .filter_map(normalize_token)
        .map(str::to_string)
        .collect()
}

fn normalize_token(token: &str) -> Option<&str> {
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
