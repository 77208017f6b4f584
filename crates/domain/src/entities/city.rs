//! City entity from the gazetteer dataset

use serde::{Deserialize, Serialize};

use crate::value_objects::GeoPoint;

/// A populated place loaded from the gazetteer
///
/// Immutable once loaded; the gazetteer owns every instance for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Unique, positive dataset id
    pub id: u64,

    /// Name as used locally (may contain non-ASCII characters)
    pub name: String,

    /// ASCII transliteration of the name
    pub ascii_name: String,

    /// Alternate names in dataset order
    pub alternate_names: Vec<String>,

    /// ISO-3166 two-letter country code
    pub country_code: String,

    /// First-level administrative division code
    pub admin_state: String,

    /// Location of the city
    pub geo: GeoPoint,

    /// Elevation in metres
    pub elevation: i32,

    /// Population, if known
    pub population: Option<u64>,

    /// IANA timezone id (e.g. "Europe/Copenhagen")
    pub timezone: String,
}

impl City {
    /// Whether `needle` (already lower-cased) occurs in the name, the ASCII
    /// name, or any alternate name, ignoring case
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.ascii_name.to_lowercase().contains(needle)
            || self
                .alternate_names
                .iter()
                .any(|alt| alt.to_lowercase().contains(needle))
    }
}
