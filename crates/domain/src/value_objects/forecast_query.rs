//! Canonical forecast query value object

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Canonical field names as sent to the forecast API
pub mod field {
    /// Latitude
    pub const LATITUDE: &str = "lat";
    /// Longitude
    pub const LONGITUDE: &str = "lng";
    /// Comma-separated source list
    pub const SOURCE: &str = "source";
    /// Comma-separated parameter list
    pub const PARAMS: &str = "params";
    /// Start of the time range (Unix seconds)
    pub const START: &str = "start";
    /// End of the time range (Unix seconds)
    pub const END: &str = "end";
}

/// A point forecast request in canonical form
///
/// Sources and params are held in sorted, de-duplicated sets so that two
/// semantically identical queries compare (and hash) identically. An empty
/// set means "all".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    geo: GeoPoint,
    sources: BTreeSet<String>,
    params: BTreeSet<String>,
    time_from: Option<DateTime<Utc>>,
    time_to: Option<DateTime<Utc>>,
}

impl ForecastQuery {
    /// Create a query for a point with no source/param/time restriction
    #[must_use]
    pub const fn new(geo: GeoPoint) -> Self {
        Self {
            geo,
            sources: BTreeSet::new(),
            params: BTreeSet::new(),
            time_from: None,
            time_to: None,
        }
    }

    /// Restrict the query to the given sources
    #[must_use]
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the query to the given params
    #[must_use]
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Set the time range; either bound may be open
    #[must_use]
    pub fn with_time_range(
        mut self,
        time_from: Option<DateTime<Utc>>,
        time_to: Option<DateTime<Utc>>,
    ) -> Self {
        self.time_from = time_from;
        self.time_to = time_to;
        self
    }

    /// The requested point
    #[must_use]
    pub const fn geo(&self) -> &GeoPoint {
        &self.geo
    }

    /// Requested sources (empty = all)
    #[must_use]
    pub const fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    /// Requested params (empty = all)
    #[must_use]
    pub const fn params(&self) -> &BTreeSet<String> {
        &self.params
    }

    /// Start of the time range
    #[must_use]
    pub const fn time_from(&self) -> Option<DateTime<Utc>> {
        self.time_from
    }

    /// End of the time range
    #[must_use]
    pub const fn time_to(&self) -> Option<DateTime<Utc>> {
        self.time_to
    }

    /// The canonical `(name, value)` pairs of this query, sorted by name
    ///
    /// Empty sets and open time bounds are omitted, matching what is sent to
    /// the forecast API. Coordinates use the shortest round-trip decimal form
    /// and timestamps are Unix seconds, so the output is stable across runs.
    #[must_use]
    pub fn canonical_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            (field::LATITUDE, self.geo.latitude().to_string()),
            (field::LONGITUDE, self.geo.longitude().to_string()),
        ];

        if !self.sources.is_empty() {
            fields.push((field::SOURCE, join(&self.sources)));
        }
        if !self.params.is_empty() {
            fields.push((field::PARAMS, join(&self.params)));
        }
        if let Some(from) = self.time_from {
            fields.push((field::START, from.timestamp().to_string()));
        }
        if let Some(to) = self.time_to {
            fields.push((field::END, to.timestamp().to_string()));
        }

        fields.sort_by(|a, b| a.0.cmp(b.0));
        fields
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn skagen() -> GeoPoint {
        GeoPoint::new(57.72, 10.58).expect("valid")
    }

    #[test]
    fn sets_are_sorted_and_deduplicated() {
        let query = ForecastQuery::new(skagen()).with_sources(["sg", "noaa", "sg"]);
        let sources: Vec<_> = query.sources().iter().cloned().collect();
        assert_eq!(sources, vec!["noaa", "sg"]);
    }

    #[test]
    fn ordering_of_input_does_not_matter() {
        let a = ForecastQuery::new(skagen()).with_params(["b", "a", "a"]);
        let b = ForecastQuery::new(skagen()).with_params(["a", "b"]);
        assert_eq!(a, b);
        assert_eq!(a.canonical_fields(), b.canonical_fields());
    }

    #[test]
    fn canonical_fields_omit_empty_values() {
        let fields = ForecastQuery::new(skagen()).canonical_fields();
        assert_eq!(
            fields,
            vec![("lat", "57.72".to_string()), ("lng", "10.58".to_string())]
        );
    }

    #[test]
    fn canonical_fields_are_sorted_by_name() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        let to = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).single();
        let fields = ForecastQuery::new(skagen())
            .with_sources(["sg"])
            .with_params(["waveHeight", "airTemperature"])
            .with_time_range(from, to)
            .canonical_fields();

        let names: Vec<_> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["end", "lat", "lng", "params", "source", "start"]);
        assert_eq!(fields[3].1, "airTemperature,waveHeight");
        assert_eq!(fields[5].1, "1704067200");
    }
}
